//! Usage View
//!
//! Usages under one group node, their combinations and related parts.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::usage::UsageStatusFilter;
use crate::combination::{CombinationList, UsageForm};
use crate::components::common::{parse_id, StatusBadge};
use crate::components::usage_dialog::UsageDialog;
use crate::components::DeleteConfirmButton;
use crate::context::AppContext;
use crate::models::{is_enabled, UsageDetail, UsagePart, UsageSummary};
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn UsageView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    // Jumping here from an instance tree pre-fills the group node
    let initial_group = store.usage_group_filter().get_untracked();
    let group_input = RwSignal::new(initial_group.map(|id| id.to_string()).unwrap_or_default());
    let status = RwSignal::new(UsageStatusFilter::default());
    let usages = RwSignal::new(Vec::<UsageSummary>::new());
    let selected = RwSignal::new(None::<UsageSummary>);
    let editing = RwSignal::new(None::<UsageForm>);

    let reload = move || {
        let Some(group_node_id) = parse_id(&group_input.get_untracked()) else {
            ctx.warn("请输入父组节点ID");
            return;
        };
        store.usage_group_filter().set(Some(group_node_id));
        let filter = status.get_untracked();
        spawn_local(async move {
            let token = ctx.tracker().issue("usages");
            let result = ctx.api().query_usages(group_node_id, filter).await;
            if !ctx.tracker().is_current(&token) {
                return;
            }
            match result {
                Ok(list) => usages.set(list),
                Err(e) => ctx.api_failed("查询用法", &e),
            }
        });
    };
    if initial_group.is_some() {
        reload();
    }

    let open_edit = move |usage: UsageSummary| {
        spawn_local(async move {
            match ctx.api().get_usage_detail(usage.id).await {
                Ok(detail) => editing.set(Some(UsageForm {
                    usage_id: Some(usage.id),
                    usage_name: usage.usage_name.clone(),
                    creator: ctx.operator(),
                    combinations: CombinationList::from_detail(&detail),
                    ..Default::default()
                })),
                Err(e) => ctx.api_failed("加载用法详情", &e),
            }
        });
    };

    let new_usage = move |_| {
        let mut form = UsageForm::new_create(&ctx.operator());
        form.parent_group_node_id = parse_id(&group_input.get_untracked());
        editing.set(Some(form));
    };

    let toggle_deleted = move |usage: UsageSummary| {
        let restore = !is_enabled(&usage.status);
        let action = if restore { "恢复" } else { "删除" };
        spawn_local(async move {
            let message = format!("确定要{}用法\"{}\"吗？", action, usage.usage_name);
            if ctx.confirm(&format!("{}用法", action), message).await.confirmed().is_none() {
                return;
            }
            let api = ctx.api();
            let result = if restore {
                api.restore_usage(usage.id).await
            } else {
                api.delete_usage(usage.id).await
            };
            match result {
                Ok(()) => {
                    ctx.success(format!("{}成功", action));
                    if selected.with_untracked(|s| s.as_ref().map(|s| s.id)) == Some(usage.id) {
                        selected.set(None);
                    }
                    reload();
                }
                Err(e) => ctx.api_failed(action, &e),
            }
        });
    };

    view! {
        <div class="page usage-page">
            <div class="page-header">
                <h2>"用法管理"</h2>
                <button class="btn btn-primary" on:click=new_usage>"新建用法"</button>
            </div>
            <div class="filter-bar">
                <label class="form-field">
                    <span class="form-label">"父组节点ID"</span>
                    <input
                        type="number"
                        prop:value=move || group_input.get()
                        on:input=move |ev| group_input.set(event_target_value(&ev))
                    />
                </label>
                <label class="form-field">
                    <span class="form-label">"状态"</span>
                    <select on:change=move |ev| status.set(UsageStatusFilter::parse(&event_target_value(&ev)))>
                        {[UsageStatusFilter::Enabled, UsageStatusFilter::All, UsageStatusFilter::Disabled]
                            .into_iter()
                            .map(|f| {
                                let label = match f {
                                    UsageStatusFilter::Enabled => "启用",
                                    UsageStatusFilter::All => "全部",
                                    UsageStatusFilter::Disabled => "已删除",
                                };
                                view! { <option value=f.as_str() selected=move || status.get() == f>{label}</option> }
                            })
                            .collect_view()}
                    </select>
                </label>
                <button class="btn" on:click=move |_| reload()>"查询"</button>
            </div>

            <div class="split-layout">
                <table class="data-table">
                    <thead>
                        <tr>
                            <th>"名称"</th>
                            <th>"爆炸图"</th>
                            <th>"状态"</th>
                            <th>"更新时间"</th>
                            <th>"操作"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || usages.get()
                            key=|u| (u.id, u.status.clone(), u.usage_name.clone(), u.updated_time.clone())
                            children=move |usage: UsageSummary| {
                                let id = usage.id;
                                let enabled = is_enabled(&usage.status);
                                let for_select = usage.clone();
                                let for_edit = usage.clone();
                                let for_toggle = usage.clone();
                                let image = usage.download_url.clone().or(usage.exploded_view_img.clone());
                                view! {
                                    <tr class=move || if selected.with(|s| s.as_ref().map(|s| s.id)) == Some(id) { "selected" } else { "" }>
                                        <td>{usage.usage_name.clone()}</td>
                                        <td>{image.map(|src| view! { <a href=src target="_blank">"查看"</a> })}</td>
                                        <td><StatusBadge status=usage.status.clone() /></td>
                                        <td>{usage.updated_time.clone()}</td>
                                        <td class="row-actions">
                                            <button class="btn btn-small" on:click=move |_| selected.set(Some(for_select.clone()))>"详情"</button>
                                            <button class="btn btn-small" on:click=move |_| open_edit(for_edit.clone())>"编辑"</button>
                                            <button
                                                class=if enabled { "btn btn-small btn-danger" } else { "btn btn-small" }
                                                on:click=move |_| toggle_deleted(for_toggle.clone())
                                            >
                                                {if enabled { "删除" } else { "恢复" }}
                                            </button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>

                {move || selected.get().map(|usage| view! { <UsageDetailPanel usage=usage /> })}
            </div>

            {move || editing.get().map(|form| view! {
                <UsageDialog
                    form=form
                    on_done=Callback::new(move |saved: bool| {
                        editing.set(None);
                        if saved {
                            reload();
                        }
                    })
                />
            })}
        </div>
    }
}

#[component]
fn UsageDetailPanel(usage: UsageSummary) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let usage_id = usage.id;
    let detail = RwSignal::new(None::<UsageDetail>);
    let parts = RwSignal::new(Vec::<UsagePart>::new());

    let load = move || {
        spawn_local(async move {
            let token = ctx.tracker().issue("usage-detail");
            let api = ctx.api();
            let (detail_result, parts_result) =
                futures::join!(api.get_usage_detail(usage_id), api.list_usage_parts(usage_id));
            if !ctx.tracker().is_current(&token) {
                return;
            }
            match detail_result {
                Ok(d) => detail.set(Some(d)),
                Err(e) => ctx.api_failed("加载用法详情", &e),
            }
            match parts_result {
                Ok(list) => parts.set(list),
                Err(e) => ctx.api_failed("加载关联备件", &e),
            }
        });
    };
    load();

    let delete_combination = move |combination_id: i64| {
        spawn_local(async move {
            match ctx.api().delete_combination(combination_id).await {
                Ok(()) => {
                    ctx.success("删除组合成功");
                    load();
                }
                Err(e) => ctx.api_failed("删除组合", &e),
            }
        });
    };

    let unbind_part = move |part_id: i64| {
        spawn_local(async move {
            match ctx.api().unbind_usage_part(usage_id, part_id).await {
                Ok(()) => {
                    ctx.success("解绑成功");
                    load();
                }
                Err(e) => ctx.api_failed("解绑备件", &e),
            }
        });
    };

    let clear_parts = move |_| {
        spawn_local(async move {
            if ctx
                .confirm("清空关联备件", "确定要清空该用法的所有关联备件吗？")
                .await
                .confirmed()
                .is_none()
            {
                return;
            }
            match ctx.api().clear_usage_parts(usage_id).await {
                Ok(()) => {
                    ctx.success("清空成功");
                    load();
                }
                Err(e) => ctx.api_failed("清空关联备件", &e),
            }
        });
    };

    view! {
        <div class="detail-panel">
            <h3>{usage.usage_name}</h3>

            <h4>"配置组合"</h4>
            {move || detail.get().map(|d| {
                if d.combinations.is_empty() {
                    return view! { <div class="empty">"暂无配置组合"</div> }.into_any();
                }
                d.combinations.into_iter().map(|c| {
                    let combination_id = c.id;
                    view! {
                        <div class="combination-card">
                            <div class="combination-header">
                                <span class="combination-order">{c.sort_order.map(|n| format!("#{}", n))}</span>
                                <span class="combination-name">{c.combination_name}</span>
                                <DeleteConfirmButton
                                    label="删除"
                                    on_confirm=Callback::new(move |_| delete_combination(combination_id))
                                />
                            </div>
                            <div class="selected-items">
                                {c.config_items.iter().map(|item| view! {
                                    <span class="item-tag">{item.label()}</span>
                                }).collect_view()}
                            </div>
                        </div>
                    }
                }).collect_view().into_any()
            })}

            <div class="section-header">
                <h4>"关联备件"</h4>
                <button class="btn btn-small btn-danger" disabled=move || parts.with(Vec::is_empty) on:click=clear_parts>
                    "清空"
                </button>
            </div>
            <ul class="part-list">
                <For
                    each=move || parts.get()
                    key=|p| p.part_id
                    children=move |part: UsagePart| {
                        let part_id = part.part_id;
                        view! {
                            <li>
                                <span class="part-code">{part.part_code}</span>
                                <span class="part-name">{part.part_name}</span>
                                <span class="part-count">{part.count.map(|n| format!("x{}", n))}</span>
                                <DeleteConfirmButton
                                    label="解绑"
                                    on_confirm=Callback::new(move |_| unbind_part(part_id))
                                />
                            </li>
                        }
                    }
                />
            </ul>
        </div>
    }
}
