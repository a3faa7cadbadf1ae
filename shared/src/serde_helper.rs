//! serde 辅助函数

use serde::{Deserialize, Deserializer};

/// 接受 JSON 字符串或数字，统一为 `String`
///
/// 不同端点返回的用户 id 类型不一致（`"42"` 或 `42`）。
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
    }

    #[test]
    fn accepts_both_shapes() {
        let a: Holder = serde_json::from_value(json!({ "id": "u-1" })).unwrap();
        let b: Holder = serde_json::from_value(json!({ "id": 42 })).unwrap();
        assert_eq!(a.id, "u-1");
        assert_eq!(b.id, "42");
        assert!(serde_json::from_value::<Holder>(json!({ "id": null })).is_err());
    }
}
