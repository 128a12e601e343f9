//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::feedback::{Toast, ToastLevel};
use crate::models::ConfigCategory;

/// Console sections reachable from the side menu
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConsoleView {
    #[default]
    Dashboard,
    ConfigCategory,
    ConfigItem,
    Template,
    Instance,
    Usage,
    Part,
    WorkHour,
}

impl ConsoleView {
    pub const ALL: [ConsoleView; 8] = [
        ConsoleView::Dashboard,
        ConsoleView::ConfigCategory,
        ConsoleView::ConfigItem,
        ConsoleView::Template,
        ConsoleView::Instance,
        ConsoleView::Usage,
        ConsoleView::Part,
        ConsoleView::WorkHour,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConsoleView::Dashboard => "仪表盘",
            ConsoleView::ConfigCategory => "配置类别",
            ConsoleView::ConfigItem => "配置项",
            ConsoleView::Template => "结构模板",
            ConsoleView::Instance => "结构实例",
            ConsoleView::Usage => "用法管理",
            ConsoleView::Part => "备件管理",
            ConsoleView::WorkHour => "工时管理",
        }
    }
}

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Section shown in the main area
    pub active_view: ConsoleView,
    /// Visible notifications, oldest first
    pub toasts: Vec<Toast>,
    pub next_toast_id: u32,
    /// Config categories, shared by the config views and the combination picker
    pub categories: Vec<ConfigCategory>,
    /// Group node id the usage view should query when opened
    pub usage_group_filter: Option<i64>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Add a toast and return its id
pub fn store_push_toast(store: &AppStore, level: ToastLevel, text: String) -> u32 {
    let id = store.next_toast_id().get_untracked() + 1;
    store.next_toast_id().set(id);
    store.toasts().write().push(Toast { id, level, text });
    id
}

pub fn store_dismiss_toast(store: &AppStore, toast_id: u32) {
    store.toasts().write().retain(|toast| toast.id != toast_id);
}

pub fn store_set_categories(store: &AppStore, categories: Vec<ConfigCategory>) {
    store.categories().set(categories);
}

/// Open the usage view filtered to a group node
pub fn store_jump_to_usages(store: &AppStore, group_node_id: i64) {
    store.usage_group_filter().set(Some(group_node_id));
    store.active_view().set(ConsoleView::Usage);
}
