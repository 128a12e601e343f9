//! Log Panel Component
//!
//! Shows the most recent lines kept by the rolling logger.

use leptos::prelude::*;

use crate::context::AppContext;

#[component]
pub fn LogPanel(#[prop(into)] on_close: Callback<()>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let (lines, set_lines) = signal(ctx.recent_logs());

    view! {
        <div class="log-panel">
            <div class="log-panel-header">
                <span>"运行日志"</span>
                <button class="btn btn-small" on:click=move |_| set_lines.set(ctx.recent_logs())>"刷新"</button>
                <button class="btn btn-small" on:click=move |_| on_close.run(())>"关闭"</button>
            </div>
            <pre class="log-panel-body">
                {move || lines.get().join("\n")}
            </pre>
        </div>
    }
}
