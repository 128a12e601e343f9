//! Response Envelope
//!
//! Every backend response is `{ code, info?, message?, data }`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

pub const SUCCESS_CODE: &str = "0000";

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Value,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// `code` as text, whether the server sent a string or a number
    pub fn code_str(&self) -> String {
        match &self.code {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code_str() == SUCCESS_CODE
    }

    /// Unwrap `data` on success, or turn the envelope into a business error
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.is_success() {
            let code = self.code_str();
            tracing::warn!(
                code = %code,
                info = ?self.info,
                message = ?self.message,
                "business failure"
            );
            return Err(ApiError::business(code, self.info.as_deref(), self.message.as_deref()));
        }
        serde_json::from_value(self.data).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageList;
    use serde_json::json;

    fn envelope(value: Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_business_failure_uses_info_verbatim() {
        let err = envelope(json!({ "code": "4001", "info": "Duplicate code" }))
            .into_result::<()>()
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate code");
        assert_eq!(
            err,
            ApiError::Business {
                code: "4001".into(),
                message: "Duplicate code".into()
            }
        );
    }

    #[test]
    fn test_numeric_code_is_compared_as_text() {
        let err = envelope(json!({ "code": 500 })).into_result::<()>().unwrap_err();
        assert_eq!(err.to_string(), "请求失败，错误码: 500");
    }

    #[test]
    fn test_null_data_decodes_into_unit_and_option() {
        envelope(json!({ "code": "0000", "data": null }))
            .into_result::<()>()
            .unwrap();
        let missing: Option<i64> = envelope(json!({ "code": "0000" })).into_result().unwrap();
        assert_eq!(missing, None);
        let list: PageList<crate::models::Part> =
            envelope(json!({ "code": "0000", "data": null })).into_result().unwrap();
        assert!(list.0.is_empty());
    }

    #[test]
    fn test_wrong_data_shape_is_decode_error() {
        let err = envelope(json!({ "code": "0000", "data": "oops" }))
            .into_result::<i64>()
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
