//! 认证请求层
//!
//! 所有出站请求统一经过 `ApiClient`：
//! 注入追踪头和时间戳 -> 附加 Bearer 令牌 -> 发送 -> 解析信封 -> 转换为类型化错误。
//!
//! 具体 HTTP 实现通过 `HttpTransport` 注入（浏览器用 fetch，测试用脚本化的 mock），
//! 从而与运行环境解耦。

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::{ClientConfig, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};
use crate::envelope::{Envelope, decode_payload};
use crate::error::{ClientError, ClientResult};
use crate::protocol::ApiRequest;
use crate::session::{KeyValueStore, SessionStore};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// multipart 表单中的一项
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// multipart 表单（文件/证件上传）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }
}

/// 请求体
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(String),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> ClientResult<Self> {
        serde_json::to_string(value)
            .map(RequestBody::Json)
            .map_err(|e| ClientError::decode(format!("failed to encode request body: {}", e)))
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

/// 通用 HTTP 请求结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 传输接口
///
/// (?Send) 是因为浏览器环境下 JsFuture 不是 Send 的。
/// 请求未得到响应时返回 `ClientError::Network`。
#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, req: HttpRequest) -> ClientResult<HttpResponse>;
}

// =========================================================
// 请求选项
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub query: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: RequestBody::Empty,
            query: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn post() -> Self {
        Self::new(HttpMethod::Post)
    }

    pub fn put() -> Self {
        Self::new(HttpMethod::Put)
    }

    pub fn delete() -> Self {
        Self::new(HttpMethod::Delete)
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn queries(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn json<T: Serialize>(self, value: &T) -> ClientResult<Self> {
        Ok(self.body(RequestBody::json(value)?))
    }
}

// =========================================================
// URL 编码
// =========================================================

/// 按 RFC 3986 对查询参数做百分号编码（保留 unreserved 字符）
pub fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// `encode_component` 的逆操作；转义不完整或结果不是 UTF-8 时返回 `None`
pub fn decode_component(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn append_query(url: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let encoded = query
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, encoded)
}

/// 通用状态文本兜底
pub fn status_text(status: u16) -> String {
    let text = match status {
        400 => "Bad request",
        401 => "Your session has expired. Please sign in again.",
        403 => "You do not have permission to perform this action",
        404 => "The requested resource was not found",
        409 => "The request conflicts with existing data",
        413 => "The uploaded file is too large",
        422 => "The submitted data is invalid",
        429 => "Too many requests. Please slow down.",
        500..=599 => "The server encountered an error",
        _ => return format!("Request failed with status {}", status),
    };
    text.to_string()
}

// =========================================================
// 认证客户端
// =========================================================

/// 认证请求客户端
///
/// 克隆共享配置和会话存储。
#[derive(Clone)]
pub struct ApiClient<T, S> {
    transport: T,
    config: Arc<ClientConfig>,
    session: SessionStore<S>,
}

impl<T: HttpTransport, S: KeyValueStore> ApiClient<T, S> {
    pub fn new(transport: T, config: ClientConfig, session: SessionStore<S>) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// 构造带全部约定头的请求（不发送）
    pub fn build_request(&self, path: &str, options: RequestOptions) -> HttpRequest {
        let RequestOptions {
            method,
            headers: extra,
            body,
            query,
        } = options;

        let trace_id = Uuid::new_v4().to_string();
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let mut headers: Vec<(String, String)> = Vec::with_capacity(extra.len() + 4);
        headers.push((self.config.trace_header.clone(), trace_id));
        headers.push((self.config.datetime_header.clone(), timestamp));

        let url = self.config.url(path);
        // 令牌只发往配置的 API 源
        let session = if self.config.is_api_url(&url) {
            self.session.current_user()
        } else {
            debug!("[Api] {} is outside the API base, sending without credentials", url);
            None
        };
        if let Some(session) = session {
            headers.push((
                HEADER_AUTHORIZATION.to_string(),
                session.token.authorization_value(),
            ));
        }

        // multipart 的 Content-Type 由运行时设置 boundary
        if !body.is_multipart() {
            headers.push((
                HEADER_CONTENT_TYPE.to_string(),
                "application/json".to_string(),
            ));
        }

        for (key, value) in extra {
            let reserved = key.eq_ignore_ascii_case(&self.config.trace_header)
                || key.eq_ignore_ascii_case(&self.config.datetime_header);
            if reserved {
                continue;
            }
            if body.is_multipart() && key.eq_ignore_ascii_case(HEADER_CONTENT_TYPE) {
                continue;
            }
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
            headers.push((key, value));
        }

        HttpRequest {
            url: append_query(&url, &query),
            method,
            headers,
            body,
        }
    }

    /// 发送请求并解码信封载荷
    pub async fn request<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<R> {
        let req = self.build_request(path, options);
        let method = req.method;
        let trace = req
            .header(&self.config.trace_header)
            .unwrap_or_default()
            .to_string();

        debug!("[Api] {} {} trace={}", method.as_str(), path, trace);

        let resp = self.transport.send(req).await.inspect_err(|e| {
            warn!("[Api] {} {} trace={} failed: {}", method.as_str(), path, trace, e)
        })?;

        let result = self.interpret(resp);
        match &result {
            Ok(_) => debug!("[Api] {} {} trace={} ok", method.as_str(), path, trace),
            Err(e) => warn!("[Api] {} {} trace={} {}", method.as_str(), path, trace, e),
        }
        result
    }

    /// 调用类型化端点
    pub async fn call<A: ApiRequest>(&self, req: &A) -> ClientResult<A::Response> {
        let options = RequestOptions::new(A::METHOD)
            .queries(req.query())
            .body(req.body()?);
        self.request(&req.path(), options).await
    }

    fn interpret<R: DeserializeOwned>(&self, resp: HttpResponse) -> ClientResult<R> {
        if !resp.ok() {
            let message = Envelope::parse(&resp.body)
                .ok()
                .and_then(|env| env.message().map(str::to_string))
                .unwrap_or_else(|| status_text(resp.status));

            if resp.status == 401 && self.config.logout_on_unauthorized {
                self.session.logout();
            }

            return Err(ClientError::Http {
                status: resp.status,
                message,
            });
        }

        if resp.status == 204 || resp.body.trim().is_empty() {
            return decode_payload(serde_json::Value::Null);
        }

        Envelope::parse(&resp.body)?.into_result(&self.config.success_codes)
    }
}

#[cfg(test)]
pub mod tests;
