//! User Feedback
//!
//! Toast notifications and the outcome of confirm/prompt dialogs.

use crate::editor::Reconciled;
use crate::error::{ApiError, EditorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            ToastLevel::Success => "toast toast-success",
            ToastLevel::Info => "toast toast-info",
            ToastLevel::Warning => "toast toast-warning",
            ToastLevel::Error => "toast toast-error",
        }
    }

    /// Milliseconds before the toast hides itself
    pub fn lifetime_ms(self) -> u32 {
        match self {
            ToastLevel::Error => 5000,
            _ => 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u32,
    pub level: ToastLevel,
    pub text: String,
}

/// Result of a confirm or prompt dialog. Cancelling is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation<T> {
    Confirmed(T),
    Cancelled,
}

impl<T> Confirmation<T> {
    pub fn confirmed(self) -> Option<T> {
        match self {
            Confirmation::Confirmed(value) => Some(value),
            Confirmation::Cancelled => None,
        }
    }
}

/// Toast for a failed action: local validation warns, everything else errors
pub fn failure_toast(action: &str, err: &EditorError) -> (ToastLevel, String) {
    match err {
        EditorError::Validation(msg) => (ToastLevel::Warning, msg.clone()),
        EditorError::NotFound(_) => (ToastLevel::Warning, format!("{}失败: {}，已重新加载", action, err)),
        EditorError::Api(api) => api_failure_toast(action, api),
    }
}

pub fn api_failure_toast(action: &str, err: &ApiError) -> (ToastLevel, String) {
    (ToastLevel::Error, format!("{}失败: {}", action, err))
}

/// Extra warning when a change went through but the tree could not be reloaded
pub fn reconcile_toast(reconciled: &Reconciled) -> Option<(ToastLevel, String)> {
    match reconciled {
        Reconciled::Fresh => None,
        Reconciled::Stale(msg) => Some((ToastLevel::Warning, format!("刷新数据失败: {}", msg))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_a_warning_with_bare_message() {
        let (level, text) = failure_toast("移动节点", &EditorError::Validation("无法移动到该位置".into()));
        assert_eq!(level, ToastLevel::Warning);
        assert_eq!(text, "无法移动到该位置");
    }

    #[test]
    fn test_api_failure_is_prefixed_error() {
        let err = EditorError::Api(ApiError::business("4001", Some("Duplicate code"), None));
        let (level, text) = failure_toast("添加节点", &err);
        assert_eq!(level, ToastLevel::Error);
        assert_eq!(text, "添加节点失败: Duplicate code");
    }

    #[test]
    fn test_cancel_is_not_a_value() {
        assert_eq!(Confirmation::<String>::Cancelled.confirmed(), None);
        assert_eq!(Confirmation::Confirmed(3).confirmed(), Some(3));
    }

    #[test]
    fn test_stale_reconcile_warns() {
        assert!(reconcile_toast(&Reconciled::Fresh).is_none());
        let (level, _) = reconcile_toast(&Reconciled::Stale("HTTP error! status: 502".into())).unwrap();
        assert_eq!(level, ToastLevel::Warning);
    }
}
