//! UI Components
//!
//! Console pages, dialogs and the shared widgets they use.

mod common;
mod compare_dialog;
mod config_view;
mod confirm_dialog;
mod dashboard;
mod delete_confirm_button;
mod instance_view;
mod log_panel;
mod node_tree;
mod part_view;
mod structure_detail;
mod template_view;
mod toast;
mod usage_dialog;
mod usage_view;
mod workhour_view;

pub use config_view::{ConfigCategoryView, ConfigItemView};
pub use confirm_dialog::ConfirmDialog;
pub use dashboard::DashboardView;
pub use delete_confirm_button::DeleteConfirmButton;
pub use instance_view::InstanceView;
pub use log_panel::LogPanel;
pub use part_view::PartView;
pub use template_view::TemplateView;
pub use toast::ToastHost;
pub use usage_view::UsageView;
pub use workhour_view::WorkHourView;
