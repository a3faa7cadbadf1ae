//! 响应信封解析
//!
//! 服务器的每个响应都包装为：
//!
//! ```json
//! { "responseStatus": { "responseCode": "...", "responseMessage": "..." },
//!   "response" | "responseData": <payload> }
//! ```
//!
//! 载荷读取优先级固定为：`response` -> `responseData` -> `null`。
//! 只在这里处理一次，调用方不再自行探测字段。

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// 已观测到的成功代码（不同端点不一致）
pub const DEFAULT_SUCCESS_CODES: [&str; 3] = ["200", "SUCCESS", "00000000"];

// =========================================================
// 成功代码集合
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessCodes(BTreeSet<String>);

impl SuccessCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(Into::into).collect())
    }

    /// 解析逗号分隔的列表，忽略空项
    pub fn parse_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty()),
        )
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SuccessCodes {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_CODES)
    }
}

// =========================================================
// 信封结构
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStatus {
    pub response_code: String,
    #[serde(default)]
    pub response_message: String,
}

/// 未类型化的信封，载荷保持为 `Value` 直到调用方指定类型
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub response_status: Option<ResponseStatus>,
    response: Option<Value>,
    response_data: Option<Value>,
}

impl Envelope {
    pub fn parse(body: &str) -> ClientResult<Self> {
        serde_json::from_str(body).map_err(|e| ClientError::decode(e.to_string()))
    }

    /// 非空的 responseMessage
    pub fn message(&self) -> Option<&str> {
        self.response_status
            .as_ref()
            .map(|s| s.response_message.trim())
            .filter(|m| !m.is_empty())
    }

    pub fn code(&self) -> Option<&str> {
        self.response_status
            .as_ref()
            .map(|s| s.response_code.as_str())
    }

    /// 按固定优先级取出载荷
    fn into_payload(self) -> Value {
        self.response
            .or(self.response_data)
            .unwrap_or(Value::Null)
    }

    /// 校验 responseCode 后解码载荷
    pub fn into_result<T: DeserializeOwned>(self, success: &SuccessCodes) -> ClientResult<T> {
        let status = match &self.response_status {
            Some(status) => status.clone(),
            None => return Err(ClientError::decode("response envelope has no responseStatus")),
        };

        if !success.contains(&status.response_code) {
            return Err(ClientError::Api {
                code: status.response_code,
                message: status.response_message,
            });
        }

        decode_payload(self.into_payload())
    }
}

/// 将载荷解码为目标类型
pub fn decode_payload<T: DeserializeOwned>(payload: Value) -> ClientResult<T> {
    serde_json::from_value(payload).map_err(|e| ClientError::decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Wallet {
        balance: u64,
    }

    fn envelope(value: Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn all_observed_success_codes_are_accepted() {
        let codes = SuccessCodes::default();
        for code in ["200", "SUCCESS", "00000000"] {
            let env = envelope(json!({
                "responseStatus": { "responseCode": code, "responseMessage": "ok" },
                "response": { "balance": 12 }
            }));
            let wallet: Wallet = env.into_result(&codes).unwrap();
            assert_eq!(wallet, Wallet { balance: 12 });
        }
    }

    #[test]
    fn response_takes_priority_over_response_data() {
        let env = envelope(json!({
            "responseStatus": { "responseCode": "200" },
            "response": { "balance": 1 },
            "responseData": { "balance": 2 }
        }));
        let wallet: Wallet = env.into_result(&SuccessCodes::default()).unwrap();
        assert_eq!(wallet.balance, 1);
    }

    #[test]
    fn null_response_falls_back_to_response_data() {
        let env = envelope(json!({
            "responseStatus": { "responseCode": "00000000" },
            "response": null,
            "responseData": { "balance": 7 }
        }));
        let wallet: Wallet = env.into_result(&SuccessCodes::default()).unwrap();
        assert_eq!(wallet.balance, 7);
    }

    #[test]
    fn missing_payload_decodes_unit_and_option() {
        let codes = SuccessCodes::default();
        let body = json!({ "responseStatus": { "responseCode": "SUCCESS" } });
        let () = envelope(body.clone()).into_result(&codes).unwrap();
        let none: Option<Wallet> = envelope(body).into_result(&codes).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn failing_code_is_api_error() {
        let env = envelope(json!({
            "responseStatus": { "responseCode": "404", "responseMessage": "Listing not found" },
            "response": null
        }));
        let err = env.into_result::<Wallet>(&SuccessCodes::default()).unwrap_err();
        assert_eq!(
            err,
            ClientError::Api {
                code: "404".into(),
                message: "Listing not found".into()
            }
        );
    }

    #[test]
    fn missing_status_is_rejected() {
        let env = envelope(json!({ "response": { "balance": 3 } }));
        let err = env.into_result::<Wallet>(&SuccessCodes::default()).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn message_ignores_blank_text() {
        let env = envelope(json!({
            "responseStatus": { "responseCode": "500", "responseMessage": "  " }
        }));
        assert_eq!(env.message(), None);
        assert_eq!(env.code(), Some("500"));
    }
}
