use super::*;
use crate::config::{HEADER_DATETIME, HEADER_TRACE};
use crate::session::tests::{MemoryStorage, user};
use crate::session::{Role, Tier};
use serde::Deserialize;
use serde_json::json;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

// =========================================================
// Shared Mock Transport
// =========================================================

/// Scripted transport: pops canned responses and records every request.
#[derive(Clone, Default)]
pub struct MockTransport {
    pub sent: Rc<RefCell<Vec<HttpRequest>>>,
    replies: Rc<RefCell<VecDeque<ClientResult<HttpResponse>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: serde_json::Value) -> &Self {
        self.replies.borrow_mut().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub fn reply_raw(&self, status: u16, body: &str) -> &Self {
        self.replies.borrow_mut().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.replies
            .borrow_mut()
            .push_back(Err(ClientError::network(message)));
        self
    }

    pub fn last(&self) -> HttpRequest {
        self.sent.borrow().last().cloned().expect("no request sent")
    }
}

#[async_trait::async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse> {
        self.sent.borrow_mut().push(req);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::network("no scripted reply")))
    }
}

pub fn ok_envelope(payload: serde_json::Value) -> serde_json::Value {
    json!({
        "responseStatus": { "responseCode": "200", "responseMessage": "OK" },
        "response": payload
    })
}

pub fn client(
    transport: &MockTransport,
    storage: &MemoryStorage,
) -> ApiClient<MockTransport, MemoryStorage> {
    let config = ClientConfig::default().with_base_url("https://api.test");
    let session = SessionStore::new(storage.clone(), config.session_key.clone());
    ApiClient::new(transport.clone(), config, session)
}

#[derive(Debug, Deserialize, PartialEq)]
struct Balance {
    credits: u32,
}

// =========================================================
// Header construction
// =========================================================

#[test]
fn anonymous_request_has_trace_headers_and_json_type() {
    let transport = MockTransport::new();
    let client = client(&transport, &MemoryStorage::new());

    let req = client.build_request("/marketplace/listings", RequestOptions::get());

    assert_eq!(req.url, "https://api.test/marketplace/listings");
    assert!(req.header(HEADER_TRACE).is_some());
    let stamp = req.header(HEADER_DATETIME).unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert!(req.header("Authorization").is_none());
}

#[test]
fn trace_id_is_unique_per_call() {
    let transport = MockTransport::new();
    let client = client(&transport, &MemoryStorage::new());
    let a = client.build_request("/a", RequestOptions::get());
    let b = client.build_request("/a", RequestOptions::get());
    assert_ne!(a.header(HEADER_TRACE), b.header(HEADER_TRACE));
}

#[test]
fn session_token_is_sent_as_bearer() {
    let transport = MockTransport::new();
    let storage = MemoryStorage::new();
    let client = client(&transport, &storage);
    client.session().login(user(Role::EvOwner), "abc.def", true);

    let req = client.build_request("/wallet", RequestOptions::get());
    assert_eq!(req.header("Authorization"), Some("Bearer abc.def"));
}

#[test]
fn multipart_leaves_content_type_to_runtime() {
    let transport = MockTransport::new();
    let client = client(&transport, &MemoryStorage::new());
    let form = MultipartForm::new()
        .text("documentType", "PASSPORT")
        .file("file", "id.png", "image/png", vec![1, 2, 3]);

    let req = client.build_request(
        "/kyc",
        RequestOptions::post()
            .header("Content-Type", "multipart/form-data")
            .body(RequestBody::Multipart(form)),
    );
    assert!(req.header("Content-Type").is_none());
}

#[test]
fn caller_headers_cannot_replace_trace_headers() {
    let transport = MockTransport::new();
    let client = client(&transport, &MemoryStorage::new());
    let req = client.build_request(
        "/x",
        RequestOptions::get()
            .header(HEADER_TRACE, "fixed")
            .header("Accept-Language", "en"),
    );
    assert_ne!(req.header(HEADER_TRACE), Some("fixed"));
    assert_eq!(req.header("Accept-Language"), Some("en"));
}

#[test]
fn query_is_percent_encoded() {
    let transport = MockTransport::new();
    let client = client(&transport, &MemoryStorage::new());
    let req = client.build_request(
        "/search?sort=asc",
        RequestOptions::get().query("q", "solar farm & co").query("page", 0),
    );
    assert_eq!(
        req.url,
        "https://api.test/search?sort=asc&q=solar%20farm%20%26%20co&page=0"
    );
}

// =========================================================
// Response handling
// =========================================================

#[tokio::test]
async fn success_envelope_resolves_payload() {
    let transport = MockTransport::new();
    transport.reply(200, ok_envelope(json!({ "credits": 40 })));
    let client = client(&transport, &MemoryStorage::new());

    let balance: Balance = client.request("/wallet", RequestOptions::get()).await.unwrap();
    assert_eq!(balance, Balance { credits: 40 });
}

#[tokio::test]
async fn response_data_key_with_legacy_code_resolves() {
    let transport = MockTransport::new();
    transport.reply(
        200,
        json!({
            "responseStatus": { "responseCode": "00000000", "responseMessage": "" },
            "responseData": { "credits": 5 }
        }),
    );
    let client = client(&transport, &MemoryStorage::new());
    let balance: Balance = client.request("/wallet", RequestOptions::get()).await.unwrap();
    assert_eq!(balance.credits, 5);
}

#[tokio::test]
async fn http_200_with_failing_code_rejects() {
    let transport = MockTransport::new();
    transport.reply(
        200,
        json!({
            "responseStatus": { "responseCode": "404", "responseMessage": "Project not found" },
            "response": null
        }),
    );
    let client = client(&transport, &MemoryStorage::new());

    let err = client
        .request::<Balance>("/projects/9", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Api {
            code: "404".into(),
            message: "Project not found".into()
        }
    );
}

#[tokio::test]
async fn http_500_rejects_with_status() {
    let transport = MockTransport::new();
    transport.reply_raw(500, "<html>upstream down</html>");
    let client = client(&transport, &MemoryStorage::new());

    let err = client
        .request::<Balance>("/wallet", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), status_text(500));
}

#[tokio::test]
async fn http_error_uses_envelope_message() {
    let transport = MockTransport::new();
    transport.reply(
        400,
        json!({ "responseStatus": { "responseCode": "400", "responseMessage": "OTP expired" } }),
    );
    let client = client(&transport, &MemoryStorage::new());

    let err = client
        .request::<()>("/auth/verify-otp", RequestOptions::post())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Http {
            status: 400,
            message: "OTP expired".into()
        }
    );
}

#[tokio::test]
async fn unauthorized_clears_session_without_leaking_token() {
    let transport = MockTransport::new();
    transport.reply_raw(401, "");
    let storage = MemoryStorage::new();
    let client = client(&transport, &storage);
    client
        .session()
        .login(user(Role::Company), "very-secret-token", true);

    let err = client
        .request::<Balance>("/wallet", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!err.to_string().contains("very-secret-token"));
    assert!(!format!("{:?}", err).contains("very-secret-token"));
    assert!(client.session().current_user().is_none());
    assert!(storage.raw(Tier::Durable, "carbonmart.session").is_none());
}

#[tokio::test]
async fn network_failure_propagates() {
    let transport = MockTransport::new();
    transport.fail("connection refused");
    let client = client(&transport, &MemoryStorage::new());

    let err = client
        .request::<Balance>("/wallet", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::network("connection refused"));
}

#[tokio::test]
async fn no_content_decodes_unit() {
    let transport = MockTransport::new();
    transport.reply_raw(204, "");
    let client = client(&transport, &MemoryStorage::new());
    let () = client
        .request("/notifications/1", RequestOptions::delete())
        .await
        .unwrap();
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let transport = MockTransport::new();
    transport.reply_raw(200, "not json");
    let client = client(&transport, &MemoryStorage::new());
    let err = client
        .request::<Balance>("/wallet", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[test]
fn encode_component_keeps_unreserved() {
    assert_eq!(encode_component("a-b_c.d~e"), "a-b_c.d~e");
    assert_eq!(encode_component("é/"), "%C3%A9%2F");
}

#[test]
fn decode_component_reverses_encoding() {
    assert_eq!(decode_component("%C3%A9%2F").as_deref(), Some("é/"));
    assert_eq!(decode_component("plain").as_deref(), Some("plain"));
    assert_eq!(decode_component("%zz"), None);
    assert_eq!(decode_component("%+1"), None);
    assert_eq!(decode_component("trail%2"), None);
    assert_eq!(decode_component("%FF"), None);
}

#[test]
fn token_never_leaves_the_api_origin() {
    let storage = MemoryStorage::new();
    let client = client(&MockTransport::new(), &storage);
    client
        .session()
        .login(user(Role::EvOwner), "secret-tok", true);

    let own = client.build_request("/wallet", RequestOptions::get());
    assert_eq!(own.header(HEADER_AUTHORIZATION), Some("Bearer secret-tok"));

    let foreign = client.build_request("https://evil.example/collect", RequestOptions::get());
    assert_eq!(foreign.url, "https://evil.example/collect");
    assert_eq!(foreign.header(HEADER_AUTHORIZATION), None);
    assert!(foreign.header(HEADER_TRACE).is_some());

    let lookalike = client.build_request("https://api.test.evil/x", RequestOptions::get());
    assert_eq!(lookalike.header(HEADER_AUTHORIZATION), None);

    // The session itself is untouched.
    assert!(client.session().is_authenticated());
}

// =========================================================
// Typed endpoints
// =========================================================

#[tokio::test]
async fn login_endpoint_then_session_carries_bearer() {
    use crate::protocol::{LoginRequest, Portal, WalletRequest};

    let transport = MockTransport::new();
    let storage = MemoryStorage::new();
    let client = client(&transport, &storage);

    transport.reply(
        200,
        ok_envelope(json!({
            "token": "jwt-abc",
            "user": { "id": 3, "email": "admin@example.com", "role": "Admin" }
        })),
    );
    let login = LoginRequest {
        email: "admin@example.com".into(),
        password: "pw".into(),
        portal: Portal::Admin,
    };
    let resp = client.call(&login).await.unwrap();
    let sent = transport.last();
    assert_eq!(sent.url, "https://api.test/admin/auth/login");
    assert_eq!(sent.method, HttpMethod::Post);
    assert!(sent.header(HEADER_AUTHORIZATION).is_none());

    client.session().login(resp.user, resp.token, false);

    transport.reply(200, ok_envelope(json!({ "balance": 5, "currency": "KES" })));
    let wallet = client.call(&WalletRequest).await.unwrap();
    assert_eq!(wallet.currency, "KES");
    let sent = transport.last();
    assert_eq!(sent.header(HEADER_AUTHORIZATION), Some("Bearer jwt-abc"));
    assert_eq!(sent.body, RequestBody::Empty);
}

#[tokio::test]
async fn paged_endpoint_sends_its_own_parameter_names() {
    use crate::pagination::PageRequest;
    use crate::protocol::{CvaReportsRequest, ListingsRequest};

    let transport = MockTransport::new();
    let client = client(&transport, &MemoryStorage::new());

    transport.reply(
        200,
        ok_envelope(json!({ "content": [{ "id": 1, "title": "Solar" }], "totalElements": 25 })),
    );
    let page = client
        .call(&ListingsRequest {
            page: PageRequest::new(1, 10),
            search: None,
        })
        .await
        .unwrap();
    assert_eq!(page.total, Some(25));
    assert_eq!(page.items[0].title, "Solar");
    assert_eq!(
        transport.last().url,
        "https://api.test/marketplace/listings?page=1&size=10"
    );

    transport.reply(200, ok_envelope(json!({ "list": [], "totalCount": 0 })));
    client
        .call(&CvaReportsRequest {
            page: PageRequest::new(0, 5),
        })
        .await
        .unwrap();
    assert_eq!(
        transport.last().url,
        "https://api.test/cva/reports?pageNo=0&pageSize=5"
    );
}

#[tokio::test]
async fn kyc_upload_goes_out_as_multipart() {
    use crate::protocol::KycSubmission;

    let transport = MockTransport::new();
    let storage = MemoryStorage::new();
    let client = client(&transport, &storage);
    client.session().login(user(Role::EvOwner), "t", true);

    transport.reply(200, ok_envelope(json!({ "id": 77 })));
    client
        .call(&KycSubmission {
            full_name: "Ada".into(),
            document_type: "PASSPORT".into(),
            document_number: "P-1".into(),
            file_name: "scan.pdf".into(),
            mime: "application/pdf".into(),
            document: vec![0x25, 0x50],
        })
        .await
        .unwrap();

    let sent = transport.last();
    assert!(sent.body.is_multipart());
    assert!(sent.header(HEADER_CONTENT_TYPE).is_none());
    assert_eq!(sent.header(HEADER_AUTHORIZATION), Some("Bearer t"));
}
