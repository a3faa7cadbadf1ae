use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::client::{HttpMethod, MultipartForm, RequestBody};
use crate::error::ClientResult;
use crate::pagination::{Page, PageParamStyle, PageRequest};
use crate::serde_helper::string_or_number;
use crate::session::{Role, User};

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize + Sized {
    /// The payload type carried by the success envelope.
    type Response: DeserializeOwned;
    /// The URL path, relative to the API base.
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// Path with parameters substituted.
    fn path(&self) -> String {
        Self::PATH.to_string()
    }

    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// GET and DELETE send no body; everything else sends itself as JSON.
    fn body(&self) -> ClientResult<RequestBody> {
        match Self::METHOD {
            HttpMethod::Get | HttpMethod::Delete => Ok(RequestBody::Empty),
            _ => RequestBody::json(self),
        }
    }
}

/// Endpoints whose payload is ignored.
pub type Ack = IgnoredAny;

fn with_id(pattern: &str, id: &str) -> String {
    pattern.replace(":id", &crate::client::encode_component(id))
}

// =========================================================
// Auth
// =========================================================

/// Which login surface a credential belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Portal {
    #[default]
    Public,
    Admin,
    Cva,
}

impl Portal {
    fn prefix(&self) -> &'static str {
        match self {
            Portal::Public => "",
            Portal::Admin => "/admin",
            Portal::Cva => "/cva",
        }
    }

    fn scoped(&self, path: &str) -> String {
        format!("{}{}", self.prefix(), path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub portal: Portal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    pub user: User,
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const PATH: &'static str = "/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        self.portal.scoped(Self::PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
}

impl ApiRequest for RegisterRequest {
    type Response = Ack;
    const PATH: &'static str = "/auth/register";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

impl ApiRequest for VerifyOtpRequest {
    type Response = Ack;
    const PATH: &'static str = "/auth/verify-otp";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

impl ApiRequest for ResendOtpRequest {
    type Response = Ack;
    const PATH: &'static str = "/auth/resend-otp";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    #[serde(skip)]
    pub portal: Portal,
}

impl ApiRequest for ForgotPasswordRequest {
    type Response = Ack;
    const PATH: &'static str = "/auth/forgot-password";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        self.portal.scoped(Self::PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    #[serde(skip)]
    pub portal: Portal,
}

impl ApiRequest for ChangePasswordRequest {
    type Response = Ack;
    const PATH: &'static str = "/auth/change-password";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        self.portal.scoped(Self::PATH)
    }
}

// =========================================================
// Profile & Wallet
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    #[default]
    NotSubmitted,
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub kyc_status: KycStatus,
}

#[derive(Debug, Serialize)]
pub struct ProfileRequest;

impl ApiRequest for ProfileRequest {
    type Response = UserProfile;
    const PATH: &'static str = "/users/me";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub credits: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub credit_balance: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub transactions: Vec<WalletTransaction>,
}

#[derive(Debug, Serialize)]
pub struct WalletRequest;

impl ApiRequest for WalletRequest {
    type Response = Wallet;
    const PATH: &'static str = "/wallet";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// =========================================================
// Marketplace
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    #[default]
    Active,
    SoldOut,
    Closed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub seller_name: String,
    #[serde(default)]
    pub price_per_credit: f64,
    #[serde(default, alias = "quantity")]
    pub available_credits: f64,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub description: Option<String>,
}

/// Marketplace listings, `?page=&size=`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListingsRequest {
    #[serde(skip)]
    pub page: PageRequest,
    #[serde(skip)]
    pub search: Option<String>,
}

impl ApiRequest for ListingsRequest {
    type Response = Page<Listing>;
    const PATH: &'static str = "/marketplace/listings";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn query(&self) -> Vec<(String, String)> {
        let mut query = self.page.to_query(PageParamStyle::PageSize);
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("q".to_string(), search.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingDetailRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for ListingDetailRequest {
    type Response = Listing;
    const PATH: &'static str = "/marketplace/listings/:id";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_id(Self::PATH, &self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub listing_id: String,
    pub quantity: f64,
}

impl ApiRequest for PurchaseRequest {
    type Response = Ack;
    const PATH: &'static str = "/marketplace/orders";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// KYC
// =========================================================

/// KYC submission, sent as multipart form data
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KycSubmission {
    pub full_name: String,
    pub document_type: String,
    pub document_number: String,
    #[serde(skip)]
    pub file_name: String,
    #[serde(skip)]
    pub mime: String,
    #[serde(skip)]
    pub document: Vec<u8>,
}

impl ApiRequest for KycSubmission {
    type Response = Ack;
    const PATH: &'static str = "/kyc";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn body(&self) -> ClientResult<RequestBody> {
        let form = MultipartForm::new()
            .text("fullName", &self.full_name)
            .text("documentType", &self.document_type)
            .text("documentNumber", &self.document_number)
            .file("document", &self.file_name, &self.mime, self.document.clone());
        Ok(RequestBody::Multipart(form))
    }
}

// =========================================================
// Company
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDashboard {
    #[serde(default)]
    pub total_projects: u64,
    #[serde(default)]
    pub active_projects: u64,
    #[serde(default)]
    pub credits_issued: f64,
    #[serde(default)]
    pub pending_reports: u64,
}

#[derive(Debug, Serialize)]
pub struct CompanyDashboardRequest;

impl ApiRequest for CompanyDashboardRequest {
    type Response = CompanyDashboard;
    const PATH: &'static str = "/company/dashboard";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Active,
    Suspended,
    Completed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub estimated_credits: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Company projects, `?pageNo=&pageSize=`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectsRequest {
    #[serde(skip)]
    pub page: PageRequest,
}

impl ApiRequest for ProjectsRequest {
    type Response = Page<Project>;
    const PATH: &'static str = "/company/projects";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn query(&self) -> Vec<(String, String)> {
        self.page.to_query(PageParamStyle::PageNoPageSize)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetailRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for ProjectDetailRequest {
    type Response = Project;
    const PATH: &'static str = "/company/projects/:id";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_id(Self::PATH, &self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    #[default]
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub emissions_reduced: f64,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewer_comment: Option<String>,
}

/// Company reports; the endpoint returns the whole list
#[derive(Debug, Serialize)]
pub struct CompanyReportsRequest;

impl ApiRequest for CompanyReportsRequest {
    type Response = Vec<Report>;
    const PATH: &'static str = "/company/reports";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Company credit requests, `?pageNo=&pageSize=`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreditRequestsRequest {
    #[serde(skip)]
    pub page: PageRequest,
}

impl ApiRequest for CreditRequestsRequest {
    type Response = Page<CreditRequest>;
    const PATH: &'static str = "/company/credit-requests";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn query(&self) -> Vec<(String, String)> {
        self.page.to_query(PageParamStyle::PageNoPageSize)
    }
}

// =========================================================
// Admin
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub pending_kyc: u64,
    #[serde(default)]
    pub active_listings: u64,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboardRequest;

impl ApiRequest for AdminDashboardRequest {
    type Response = AdminDashboard;
    const PATH: &'static str = "/admin/dashboard";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub role: Role,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Admin user directory, `?page=&size=`
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminUsersRequest {
    #[serde(skip)]
    pub page: PageRequest,
}

impl ApiRequest for AdminUsersRequest {
    type Response = Page<AccountSummary>;
    const PATH: &'static str = "/admin/users";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn query(&self) -> Vec<(String, String)> {
        self.page.to_query(PageParamStyle::PageSize)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycApplication {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub status: KycStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Admin KYC queue, `?page=&size=`
#[derive(Debug, Clone, Default, Serialize)]
pub struct KycQueueRequest {
    #[serde(skip)]
    pub page: PageRequest,
}

impl ApiRequest for KycQueueRequest {
    type Response = Page<KycApplication>;
    const PATH: &'static str = "/admin/kyc";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn query(&self) -> Vec<(String, String)> {
        self.page.to_query(PageParamStyle::PageSize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct KycDecisionRequest {
    #[serde(skip)]
    pub id: String,
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApiRequest for KycDecisionRequest {
    type Response = Ack;
    const PATH: &'static str = "/admin/kyc/:id/decision";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        with_id(Self::PATH, &self.id)
    }
}

// =========================================================
// CVA
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvaDashboard {
    #[serde(default)]
    pub pending_reports: u64,
    #[serde(default)]
    pub reviewed_reports: u64,
    #[serde(default)]
    pub credits_issued: f64,
}

#[derive(Debug, Serialize)]
pub struct CvaDashboardRequest;

impl ApiRequest for CvaDashboardRequest {
    type Response = CvaDashboard;
    const PATH: &'static str = "/cva/dashboard";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// Reports awaiting verification, `?pageNo=&pageSize=`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CvaReportsRequest {
    #[serde(skip)]
    pub page: PageRequest,
}

impl ApiRequest for CvaReportsRequest {
    type Response = Page<Report>;
    const PATH: &'static str = "/cva/reports";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn query(&self) -> Vec<(String, String)> {
        self.page.to_query(PageParamStyle::PageNoPageSize)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CvaReportDetailRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for CvaReportDetailRequest {
    type Response = Report;
    const PATH: &'static str = "/cva/reports/:id";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        with_id(Self::PATH, &self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewReportRequest {
    #[serde(skip)]
    pub id: String,
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ApiRequest for ReviewReportRequest {
    type Response = Ack;
    const PATH: &'static str = "/cva/reports/:id/review";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        with_id(Self::PATH, &self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditIssuance {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub report_id: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
}

/// Issued credit batches, `?pageNo=&pageSize=`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreditIssuancesRequest {
    #[serde(skip)]
    pub page: PageRequest,
}

impl ApiRequest for CreditIssuancesRequest {
    type Response = Page<CreditIssuance>;
    const PATH: &'static str = "/cva/credits";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn query(&self) -> Vec<(String, String)> {
        self.page.to_query(PageParamStyle::PageNoPageSize)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreditsRequest {
    pub report_id: String,
    pub quantity: f64,
}

impl ApiRequest for IssueCreditsRequest {
    type Response = CreditIssuance;
    const PATH: &'static str = "/cva/credits";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FormPart;
    use serde_json::json;

    #[test]
    fn login_paths_follow_portal() {
        let mut req = LoginRequest {
            email: "a@b.io".into(),
            password: "pw".into(),
            portal: Portal::Public,
        };
        assert_eq!(req.path(), "/auth/login");
        req.portal = Portal::Admin;
        assert_eq!(req.path(), "/admin/auth/login");
        req.portal = Portal::Cva;
        assert_eq!(req.path(), "/cva/auth/login");

        let RequestBody::Json(body) = req.body().unwrap() else {
            panic!("login should send JSON");
        };
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value, json!({ "email": "a@b.io", "password": "pw" }));
    }

    #[test]
    fn get_requests_have_no_body() {
        assert_eq!(WalletRequest.body().unwrap(), RequestBody::Empty);
        let detail = ListingDetailRequest { id: "a/b".into() };
        assert_eq!(detail.body().unwrap(), RequestBody::Empty);
        assert_eq!(detail.path(), "/marketplace/listings/a%2Fb");
    }

    #[test]
    fn each_endpoint_keeps_its_page_convention() {
        let page = PageRequest::new(2, 5);
        let listings = ListingsRequest {
            page,
            search: Some("  solar ".into()),
        };
        assert_eq!(
            listings.query(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("size".to_string(), "5".to_string()),
                ("q".to_string(), "solar".to_string()),
            ]
        );
        assert_eq!(
            ProjectsRequest { page }.query()[0],
            ("pageNo".to_string(), "2".to_string())
        );
        assert_eq!(
            AdminUsersRequest { page }.query()[1],
            ("size".to_string(), "5".to_string())
        );
        assert_eq!(
            CvaReportsRequest { page }.query()[1],
            ("pageSize".to_string(), "5".to_string())
        );
    }

    #[test]
    fn kyc_is_multipart() {
        let req = KycSubmission {
            full_name: "Ada".into(),
            document_type: "PASSPORT".into(),
            document_number: "X1".into(),
            file_name: "id.png".into(),
            mime: "image/png".into(),
            document: vec![1, 2, 3],
        };
        let RequestBody::Multipart(form) = req.body().unwrap() else {
            panic!("kyc should be multipart");
        };
        assert_eq!(form.parts.len(), 4);
        assert!(matches!(
            &form.parts[3],
            FormPart::File { name, bytes, .. } if name == "document" && bytes.len() == 3
        ));
    }

    #[test]
    fn decision_paths_and_bodies() {
        let req = ReviewReportRequest {
            id: "42".into(),
            decision: Decision::Rejected,
            comment: None,
        };
        assert_eq!(req.path(), "/cva/reports/42/review");
        assert_eq!(
            req.body().unwrap(),
            RequestBody::Json(r#"{"decision":"REJECTED"}"#.into())
        );
    }

    #[test]
    fn models_tolerate_unknown_status_and_numeric_ids() {
        let listing: Listing = serde_json::from_value(json!({
            "id": 9,
            "title": "Mangrove restoration",
            "pricePerCredit": 12.5,
            "quantity": 100,
            "status": "ON_HOLD"
        }))
        .unwrap();
        assert_eq!(listing.id, "9");
        assert_eq!(listing.available_credits, 100.0);
        assert_eq!(listing.status, ListingStatus::Unknown);

        let login: LoginResponse = serde_json::from_value(json!({
            "accessToken": "jwt",
            "user": { "id": "u1", "email": "c@d.io", "role": "COMPANY" }
        }))
        .unwrap();
        assert_eq!(login.token, "jwt");
        assert_eq!(login.user.role, Role::Company);
    }

    #[test]
    fn ack_accepts_any_payload() {
        let _: Ack = serde_json::from_value(serde_json::Value::Null).unwrap();
        let _: Ack = serde_json::from_value(json!({ "id": 1 })).unwrap();
    }
}
