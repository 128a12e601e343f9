//! Car Model Console App
//!
//! Main application component: side menu plus the active section.

use leptos::prelude::*;
use rolling_logger::LogBuffer;

use crate::components::{
    ConfirmDialog, ConfigCategoryView, ConfigItemView, DashboardView, InstanceView, LogPanel, PartView, TemplateView,
    ToastHost, UsageView, WorkHourView,
};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::store::{AppState, AppStateStoreFields, AppStore, ConsoleView};

#[component]
pub fn App(config: AppConfig, logs: LogBuffer) -> impl IntoView {
    let store = AppStore::new(AppState::default());
    provide_context(store);
    provide_context(AppContext::new(config, logs, store));

    let (show_logs, set_show_logs) = signal(false);

    view! {
        <div class="app-layout">
            <aside class="side-menu">
                <h2 class="brand">"整车配置管理"</h2>
                {ConsoleView::ALL.iter().map(|view| {
                    let view = *view;
                    let is_active = move || store.active_view().get() == view;
                    view! {
                        <button
                            class=move || if is_active() { "menu-item active" } else { "menu-item" }
                            on:click=move |_| store.active_view().set(view)
                        >
                            {view.label()}
                        </button>
                    }
                }).collect_view()}
                <button class="menu-item log-toggle" on:click=move |_| set_show_logs.update(|v| *v = !*v)>
                    "运行日志"
                </button>
            </aside>

            <main class="main-content">
                {move || match store.active_view().get() {
                    ConsoleView::Dashboard => view! { <DashboardView /> }.into_any(),
                    ConsoleView::ConfigCategory => view! { <ConfigCategoryView /> }.into_any(),
                    ConsoleView::ConfigItem => view! { <ConfigItemView /> }.into_any(),
                    ConsoleView::Template => view! { <TemplateView /> }.into_any(),
                    ConsoleView::Instance => view! { <InstanceView /> }.into_any(),
                    ConsoleView::Usage => view! { <UsageView /> }.into_any(),
                    ConsoleView::Part => view! { <PartView /> }.into_any(),
                    ConsoleView::WorkHour => view! { <WorkHourView /> }.into_any(),
                }}
            </main>

            <Show when=move || show_logs.get()>
                <LogPanel on_close=Callback::new(move |_| set_show_logs.set(false)) />
            </Show>

            <ToastHost />
            <ConfirmDialog />
        </div>
    }
}
