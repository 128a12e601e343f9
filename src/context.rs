//! Application Context
//!
//! Shared services provided via Leptos Context API.

use futures::channel::oneshot;
use leptos::prelude::*;
use rolling_logger::LogBuffer;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::error::{ApiError, EditorError};
use crate::feedback::{api_failure_toast, failure_toast, Confirmation, ToastLevel};
use crate::freshness::RequestTracker;
use crate::store::{store_push_toast, AppStore};

/// A confirm or prompt dialog waiting for the user
#[derive(Clone, Debug, PartialEq)]
pub struct PendingDialog {
    pub title: String,
    pub message: String,
    /// `Some(initial)` turns the confirm into a text prompt
    pub input: Option<String>,
    pub danger: bool,
}

type DialogReply = oneshot::Sender<Confirmation<String>>;

/// App-wide services provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    config: StoredValue<AppConfig>,
    tracker: StoredValue<RequestTracker>,
    logs: StoredValue<LogBuffer>,
    store: AppStore,
    /// Dialog currently shown - read
    pub dialog: ReadSignal<Option<PendingDialog>>,
    /// Dialog currently shown - write
    set_dialog: WriteSignal<Option<PendingDialog>>,
    reply: StoredValue<Option<DialogReply>>,
}

impl AppContext {
    pub fn new(config: AppConfig, logs: LogBuffer, store: AppStore) -> Self {
        let (dialog, set_dialog) = signal(None);
        Self {
            config: StoredValue::new(config),
            tracker: StoredValue::new(RequestTracker::new()),
            logs: StoredValue::new(logs),
            store,
            dialog,
            set_dialog,
            reply: StoredValue::new(None),
        }
    }

    /// A client bound to the configured backend
    pub fn api(&self) -> ApiClient {
        self.config.with_value(ApiClient::new)
    }

    pub fn operator(&self) -> String {
        self.config.with_value(|config| config.operator.clone())
    }

    pub fn tracker(&self) -> RequestTracker {
        self.tracker.get_value()
    }

    pub fn recent_logs(&self) -> Vec<String> {
        self.logs.with_value(LogBuffer::recent_lines)
    }

    // ========================
    // Notifications
    // ========================

    pub fn notify(&self, level: ToastLevel, text: impl Into<String>) {
        store_push_toast(&self.store, level, text.into());
    }

    pub fn success(&self, text: impl Into<String>) {
        self.notify(ToastLevel::Success, text);
    }

    pub fn warn(&self, text: impl Into<String>) {
        self.notify(ToastLevel::Warning, text);
    }

    pub fn api_failed(&self, action: &str, err: &ApiError) {
        tracing::error!(action, error = %err, "request failed");
        let (level, text) = api_failure_toast(action, err);
        self.notify(level, text);
    }

    pub fn editor_failed(&self, action: &str, err: &EditorError) {
        if err.is_validation() {
            tracing::debug!(action, error = %err, "rejected locally");
        } else {
            tracing::warn!(action, error = %err, "action failed");
        }
        let (level, text) = failure_toast(action, err);
        self.notify(level, text);
    }

    // ========================
    // Dialogs
    // ========================

    async fn ask(&self, dialog: PendingDialog) -> Confirmation<String> {
        let (tx, rx) = oneshot::channel();
        // A dialog still open is cancelled by the new one
        if let Some(previous) = self.reply.try_update_value(|slot| slot.replace(tx)).flatten() {
            let _ = previous.send(Confirmation::Cancelled);
        }
        self.set_dialog.set(Some(dialog));
        rx.await.unwrap_or(Confirmation::Cancelled)
    }

    /// Yes/no question
    pub async fn confirm(&self, title: &str, message: impl Into<String>) -> Confirmation<()> {
        let dialog = PendingDialog {
            title: title.to_string(),
            message: message.into(),
            input: None,
            danger: true,
        };
        match self.ask(dialog).await {
            Confirmation::Confirmed(_) => Confirmation::Confirmed(()),
            Confirmation::Cancelled => Confirmation::Cancelled,
        }
    }

    /// Ask for a non-empty line of text
    pub async fn prompt(&self, title: &str, message: impl Into<String>, initial: &str) -> Confirmation<String> {
        let dialog = PendingDialog {
            title: title.to_string(),
            message: message.into(),
            input: Some(initial.to_string()),
            danger: false,
        };
        self.ask(dialog).await
    }

    /// Called by the dialog component when the user answers
    pub fn answer(&self, answer: Confirmation<String>) {
        self.set_dialog.set(None);
        if let Some(reply) = self.reply.try_update_value(Option::take).flatten() {
            let _ = reply.send(answer);
        }
    }
}
