//! 错误类型模块
//!
//! 客户端所有失败都归入 `ClientError`，页面层统一通过 `user_message()`
//! 转为用户可见的提示。没有任何错误会导致应用不可用。

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// 通用兜底提示
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

// =========================================================
// 字段级校验错误
// =========================================================

/// 表单字段错误集合（字段名 -> 第一条错误信息）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录字段错误，同一字段只保留第一条
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// 用户修改字段后清除其错误
    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 合并另一组错误（已有字段不覆盖）
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }

    /// 空集合视为通过
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端错误分类
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// 请求未到达服务器或未收到响应
    #[error("network error: {0}")]
    Network(String),

    /// 非 2xx 状态码
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx 但信封中的 responseCode 不在成功集合内
    #[error("API error [{code}]: {message}")]
    Api { code: String, message: String },

    /// 客户端表单校验失败，从不发送到服务器
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// 2xx 但响应体无法解析
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// HTTP 状态码（仅 `Http` 变体有）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// 用于 toast 的提示文本：优先使用服务器消息，否则使用通用兜底
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Unable to reach the server. Check your connection and retry.".to_string()
            }
            Self::Http { message, .. } | Self::Api { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            Self::Validation(errors) => errors
                .iter()
                .next()
                .map(|(_, message)| message.to_string())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

// =========================================================
// 存储错误
// =========================================================

/// 浏览器存储错误（隐私模式、配额不足等）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage write rejected: {0}")]
    WriteRejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_text() {
        let err = ClientError::Http {
            status: 400,
            message: "Email already registered".into(),
        };
        assert_eq!(err.user_message(), "Email already registered");

        let blank = ClientError::Api {
            code: "E1".into(),
            message: "   ".into(),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.insert("email", "Email is required");
        errors.insert("email", "Email is invalid");
        errors.insert("password", "Password is required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(
            errors.to_string(),
            "email: Email is required; password: Password is required"
        );
    }

    #[test]
    fn validation_message_uses_first_field() {
        let mut errors = FieldErrors::new();
        errors.insert("otp", "Enter the 6-digit code");
        let err = ClientError::from(errors);
        assert_eq!(err.user_message(), "Enter the 6-digit code");
        assert_eq!(err.status(), None);
    }
}
