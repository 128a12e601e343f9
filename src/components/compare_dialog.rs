//! Compare Dialog
//!
//! Pick two instances and view their trees side by side or as one column.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::compare::{load_comparison, ComparisonView, DiffLine, DiffSide};
use crate::components::common::parse_id;
use crate::context::AppContext;
use crate::freshness::BusyGuard;
use crate::models::InstanceSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CompareMode {
    SideBySide,
    Unified,
}

#[component]
pub fn CompareDialog(#[prop(into)] instances: Signal<Vec<InstanceSummary>>, on_close: Callback<()>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let left_id = RwSignal::new(None::<i64>);
    let right_id = RwSignal::new(None::<i64>);
    let mode = RwSignal::new(CompareMode::SideBySide);
    let only_differences = RwSignal::new(false);
    let comparison = RwSignal::new(None::<ComparisonView>);
    let loading = RwSignal::new(false);

    let run = move |_| {
        let (id1, id2) = (left_id.get_untracked(), right_id.get_untracked());
        if id1.is_none() || id2.is_none() {
            ctx.warn("请选择两个实例");
            return;
        }
        spawn_local(async move {
            let Some(_guard) = BusyGuard::try_acquire(loading) else { return };
            let token = ctx.tracker().issue("compare");
            let result = load_comparison(&ctx.api(), id1, id2).await;
            if !ctx.tracker().is_current(&token) {
                return;
            }
            match result {
                Ok(view) => comparison.set(view),
                Err(e) => ctx.api_failed("对比实例", &e),
            }
        });
    };

    let picker = move |label: &'static str, selected: RwSignal<Option<i64>>| {
        view! {
            <label class="form-field">
                <span class="form-label">{label}</span>
                <select on:change=move |ev| selected.set(parse_id(&event_target_value(&ev)))>
                    <option value="">"请选择实例"</option>
                    <For
                        each=move || instances.get()
                        key=|i| i.id
                        children=move |i: InstanceSummary| view! {
                            <option value=i.id.to_string()>
                                {format!(
                                    "{} ({})",
                                    i.instance_name.unwrap_or_default(),
                                    i.instance_version.unwrap_or_default(),
                                )}
                            </option>
                        }
                    />
                </select>
            </label>
        }
    };

    view! {
        <div class="modal-overlay">
            <div class="modal compare-modal">
                <div class="modal-header">
                    <h3>"实例对比"</h3>
                    <button class="btn btn-small" on:click=move |_| on_close.run(())>"关闭"</button>
                </div>
                <div class="compare-toolbar">
                    {picker("实例一", left_id)}
                    {picker("实例二", right_id)}
                    <button class="btn btn-primary" disabled=move || loading.get() on:click=run>"开始对比"</button>
                    <button
                        class=move || if mode.get() == CompareMode::SideBySide { "btn active" } else { "btn" }
                        on:click=move |_| mode.set(CompareMode::SideBySide)
                    >
                        "并排"
                    </button>
                    <button
                        class=move || if mode.get() == CompareMode::Unified { "btn active" } else { "btn" }
                        on:click=move |_| mode.set(CompareMode::Unified)
                    >
                        "统一"
                    </button>
                    <label class="checkbox">
                        <input
                            type="checkbox"
                            prop:checked=move || only_differences.get()
                            on:change=move |_| only_differences.update(|v| *v = !*v)
                        />
                        "仅显示差异"
                    </label>
                </div>

                {move || comparison.get().map(|cmp| {
                    let stats = cmp.stats();
                    let only = only_differences.get();
                    let body = match mode.get() {
                        CompareMode::SideBySide => view! {
                            <div class="diff-columns">
                                <DiffColumn
                                    title=cmp.left.name.clone().unwrap_or_default()
                                    lines=cmp.lines(DiffSide::Left, only)
                                />
                                <DiffColumn
                                    title=cmp.right.name.clone().unwrap_or_default()
                                    lines=cmp.lines(DiffSide::Right, only)
                                />
                            </div>
                        }.into_any(),
                        CompareMode::Unified => view! {
                            <DiffColumn
                                title=cmp.left.name.clone().unwrap_or_default()
                                lines=cmp.lines(DiffSide::Unified, only)
                            />
                        }.into_any(),
                    };
                    view! {
                        <div class="diff-stats">
                            <span class="diff-stat added">{format!("新增 {}", stats.added)}</span>
                            <span class="diff-stat removed">{format!("删除 {}", stats.removed)}</span>
                            <span class="diff-stat modified">{format!("修改 {}", stats.modified)}</span>
                        </div>
                        {body}
                    }
                })}
            </div>
        </div>
    }
}

#[component]
fn DiffColumn(title: String, lines: Vec<DiffLine>) -> impl IntoView {
    view! {
        <div class="diff-column">
            <div class="diff-column-title">{title}</div>
            {lines.into_iter().map(|line| view! {
                <div class=line.kind.css_class()>
                    <span class="diff-line-number">{line.line_number}</span>
                    <span class="diff-indicator">{line.indicator.to_string()}</span>
                    <pre class="diff-content">{line.content}</pre>
                </div>
            }).collect_view()}
        </div>
    }
}
