//! Part View
//!
//! Spare parts with a client-side filter, the edit form and a detail panel
//! listing bound work hours.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::part::PartForm;
use crate::components::common::{toggle_label, StatusBadge, TextField};
use crate::components::DeleteConfirmButton;
use crate::context::AppContext;
use crate::freshness::BusyGuard;
use crate::models::{Part, PartDetail, WorkHour, STATUS_DISABLED, STATUS_ENABLED};

#[component]
pub fn PartView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let parts = RwSignal::new(Vec::<Part>::new());
    let keyword = RwSignal::new(String::new());
    let status = RwSignal::new(String::new());
    let editing = RwSignal::new(None::<PartForm>);
    let detail_id = RwSignal::new(None::<i64>);

    let reload = move || {
        spawn_local(async move {
            let token = ctx.tracker().issue("parts");
            let result = ctx.api().list_parts().await;
            if !ctx.tracker().is_current(&token) {
                return;
            }
            match result {
                Ok(list) => parts.set(list),
                Err(e) => ctx.api_failed("加载备件", &e),
            }
        });
    };
    reload();

    let visible = move || {
        let keyword = keyword.get();
        let status = status.get();
        parts.with(|all| all.iter().filter(|p| p.matches(&keyword, &status)).cloned().collect::<Vec<_>>())
    };

    let toggle_status = move |part: Part| {
        let (action, enable) = toggle_label(&part.status);
        spawn_local(async move {
            match ctx.api().set_part_enabled(part.id, enable).await {
                Ok(()) => {
                    ctx.success(format!("{}成功", action));
                    reload();
                }
                Err(e) => ctx.api_failed(action, &e),
            }
        });
    };

    let remove = move |part: Part| {
        spawn_local(async move {
            let message = format!("确定要删除备件\"{}\"吗？", part.part_name);
            if ctx.confirm("删除备件", message).await.confirmed().is_none() {
                return;
            }
            match ctx.api().delete_part(part.id).await {
                Ok(()) => {
                    ctx.success("删除成功");
                    if detail_id.get_untracked() == Some(part.id) {
                        detail_id.set(None);
                    }
                    reload();
                }
                Err(e) => ctx.api_failed("删除备件", &e),
            }
        });
    };

    view! {
        <div class="page part-page">
            <div class="page-header">
                <h2>"备件管理"</h2>
                <button class="btn btn-primary" on:click=move |_| editing.set(Some(PartForm::default()))>"新建备件"</button>
            </div>
            <div class="filter-bar">
                <TextField label="编码/名称" value=keyword />
                <label class="form-field">
                    <span class="form-label">"状态"</span>
                    <select on:change=move |ev| status.set(event_target_value(&ev))>
                        <option value="">"全部"</option>
                        <option value=STATUS_ENABLED>"启用"</option>
                        <option value=STATUS_DISABLED>"禁用"</option>
                    </select>
                </label>
            </div>
            <div class="split-layout">
                <table class="data-table">
                    <thead>
                        <tr>
                            <th>"编码"</th>
                            <th>"名称"</th>
                            <th>"状态"</th>
                            <th>"备注"</th>
                            <th>"操作"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=visible
                            key=|p| (p.id, p.status.clone(), p.part_name.clone(), p.remark.clone())
                            children=move |part: Part| {
                                let id = part.id;
                                let (toggle_text, _) = toggle_label(&part.status);
                                let for_edit = part.clone();
                                let for_toggle = part.clone();
                                let for_delete = part.clone();
                                view! {
                                    <tr class=move || if detail_id.get() == Some(id) { "selected" } else { "" }>
                                        <td>{part.part_code.clone()}</td>
                                        <td>{part.part_name.clone()}</td>
                                        <td><StatusBadge status=part.status.clone() /></td>
                                        <td>{part.remark.clone()}</td>
                                        <td class="row-actions">
                                            <button class="btn btn-small" on:click=move |_| detail_id.set(Some(id))>"详情"</button>
                                            <button class="btn btn-small" on:click=move |_| editing.set(Some(PartForm {
                                                id: Some(for_edit.id),
                                                part_code: for_edit.part_code.clone(),
                                                part_name: for_edit.part_name.clone(),
                                                remark: for_edit.remark.clone().unwrap_or_default(),
                                            }))>"编辑"</button>
                                            <button class="btn btn-small" on:click=move |_| toggle_status(for_toggle.clone())>{toggle_text}</button>
                                            <button class="btn btn-small btn-danger" on:click=move |_| remove(for_delete.clone())>"删除"</button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>

                {move || detail_id.get().map(|id| view! { <PartDetailPanel part_id=id /> })}
            </div>

            {move || editing.get().map(|form| view! {
                <PartFormDialog
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
fn PartDetailPanel(part_id: i64) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let detail = RwSignal::new(None::<PartDetail>);

    let load = move || {
        spawn_local(async move {
            let token = ctx.tracker().issue("part-detail");
            let result = ctx.api().get_part_detail(part_id).await;
            if !ctx.tracker().is_current(&token) {
                return;
            }
            match result {
                Ok(d) => detail.set(Some(d)),
                Err(e) => ctx.api_failed("加载备件详情", &e),
            }
        });
    };
    load();

    let unbind = move |hour_id: i64| {
        spawn_local(async move {
            match ctx.api().unbind_hour(part_id, hour_id).await {
                Ok(()) => {
                    ctx.success("解绑成功");
                    load();
                }
                Err(e) => ctx.api_failed("解绑工时", &e),
            }
        });
    };

    let hour_row = move |hour: WorkHour, sub: bool| {
        let hour_id = hour.id;
        view! {
            <li class=if sub { "work-hour-row sub" } else { "work-hour-row" }>
                <span class="work-hour-code">{hour.code}</span>
                <span class="work-hour-desc">{hour.description}</span>
                <span class="work-hour-hours">{hour.standard_hours.map(|h| format!("{:.1}h", h))}</span>
                {(!sub).then(|| view! {
                    <DeleteConfirmButton label="解绑" on_confirm=Callback::new(move |_| unbind(hour_id)) />
                })}
            </li>
        }
    };

    view! {
        <div class="detail-panel">
            {move || match detail.get() {
                None => view! { <div class="loading">"加载中..."</div> }.into_any(),
                Some(d) => {
                    let name = d.part.as_ref().map(|p| format!("{} {}", p.part_code, p.part_name)).unwrap_or_default();
                    view! {
                        <h3>{name}</h3>
                        <h4>"关联工时"</h4>
                        {if d.work_hours.is_empty() {
                            view! { <div class="empty">"暂无关联工时"</div> }.into_any()
                        } else {
                            view! {
                                <ul class="work-hour-tree">
                                    {d.work_hours.into_iter().filter_map(|tree| {
                                        let main = tree.work_hour_vo?;
                                        Some(view! {
                                            {hour_row(main, false)}
                                            {tree.children.into_iter().map(|child| hour_row(child, true)).collect_view()}
                                        })
                                    }).collect_view()}
                                </ul>
                            }.into_any()
                        }}
                    }.into_any()
                }
            }}
        </div>
    }
}

#[component]
fn PartFormDialog(form: PartForm, on_done: Callback<bool>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let id = form.id;
    let code = RwSignal::new(form.part_code);
    let name = RwSignal::new(form.part_name);
    let remark = RwSignal::new(form.remark);
    let saving = RwSignal::new(false);

    let save = move |_| {
        let form = PartForm {
            id,
            part_code: code.get_untracked(),
            part_name: name.get_untracked(),
            remark: remark.get_untracked(),
        };
        if form.part_code.trim().is_empty() || form.part_name.trim().is_empty() {
            ctx.warn("请填写备件编码和名称");
            return;
        }
        spawn_local(async move {
            let Some(_guard) = BusyGuard::try_acquire(saving) else { return };
            match ctx.api().save_part(&form).await {
                Ok(()) => {
                    ctx.success(if id.is_some() { "更新成功" } else { "创建成功" });
                    on_done.run(true);
                }
                Err(e) => ctx.api_failed("保存备件", &e),
            }
        });
    };

    view! {
        <div class="modal-overlay">
            <div class="modal form-modal">
                <h3>{if id.is_some() { "编辑备件" } else { "新建备件" }}</h3>
                <TextField label="备件编码" value=code disabled=id.is_some() />
                <TextField label="备件名称" value=name />
                <TextField label="备注" value=remark />
                <div class="modal-actions">
                    <button class="btn" on:click=move |_| on_done.run(false)>"取消"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=save>"保存"</button>
                </div>
            </div>
        </div>
    }
}
