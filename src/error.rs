//! Error Types
//!
//! `ApiError` covers everything that can go wrong talking to the backend;
//! `EditorError` adds the local checks made before a request is sent.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network unreachable, CORS, aborted request
    #[error("网络请求失败: {0}")]
    Transport(String),

    /// Non-2xx HTTP status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Envelope code other than the success code
    #[error("{message}")]
    Business { code: String, message: String },

    /// Body was not the expected JSON shape
    #[error("响应解析失败: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a business failure, preferring `info`, then `message`,
    /// then a fallback that embeds the raw code.
    pub fn business(code: impl Into<String>, info: Option<&str>, message: Option<&str>) -> Self {
        let code = code.into();
        let message = info
            .filter(|s| !s.is_empty())
            .or(message.filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("请求失败，错误码: {}", code));
        ApiError::Business { code, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// Rejected locally, nothing was sent
    #[error("{0}")]
    Validation(String),

    /// The local tree no longer holds this node
    #[error("节点 {0} 不在当前树中")]
    NotFound(i64),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl EditorError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EditorError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_prefers_info() {
        let err = ApiError::business("4001", Some("Duplicate code"), Some("ignored"));
        assert_eq!(err.to_string(), "Duplicate code");
    }

    #[test]
    fn test_business_falls_back_to_message_then_code() {
        let err = ApiError::business("4002", Some(""), Some("bad input"));
        assert_eq!(err.to_string(), "bad input");

        let err = ApiError::business("5000", None, None);
        assert_eq!(err.to_string(), "请求失败，错误码: 5000");
    }

    #[test]
    fn test_editor_error_wraps_api_error_transparently() {
        let err: EditorError = ApiError::business("4001", Some("Duplicate code"), None).into();
        assert_eq!(err.to_string(), "Duplicate code");
        assert!(!err.is_validation());
    }
}
