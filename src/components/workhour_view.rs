//! Work Hour View
//!
//! Main work hours with sub-lists loaded on first expand and cached per row.

use std::collections::{HashMap, HashSet};

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::workhour::WorkHourForm;
use crate::components::common::{toggle_label, StatusBadge, TextField};
use crate::context::AppContext;
use crate::freshness::BusyGuard;
use crate::models::WorkHour;

#[component]
pub fn WorkHourView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let mains = RwSignal::new(Vec::<WorkHour>::new());
    let subs = RwSignal::new(HashMap::<i64, Vec<WorkHour>>::new());
    let expanded = RwSignal::new(HashSet::<i64>::new());
    let editing = RwSignal::new(None::<WorkHourForm>);

    let reload_mains = move || {
        spawn_local(async move {
            let token = ctx.tracker().issue("work-hours");
            let result = ctx.api().query_main_work_hours().await;
            if !ctx.tracker().is_current(&token) {
                return;
            }
            match result {
                Ok(list) => mains.set(list),
                Err(e) => ctx.api_failed("加载工时", &e),
            }
        });
    };
    reload_mains();

    // Cached unless `force`
    let load_subs = move |parent_id: i64, force: bool| {
        if !force && subs.with_untracked(|cache| cache.contains_key(&parent_id)) {
            return;
        }
        spawn_local(async move {
            let token = ctx.tracker().issue(format!("work-hours:{}", parent_id));
            let result = ctx.api().query_sub_work_hours(parent_id).await;
            if !ctx.tracker().is_current(&token) {
                return;
            }
            match result {
                Ok(list) => subs.update(|cache| {
                    cache.insert(parent_id, list);
                }),
                Err(e) => ctx.api_failed("加载子工时", &e),
            }
        });
    };

    let after_change = move |parent_id: Option<i64>| match parent_id {
        Some(parent_id) => load_subs(parent_id, true),
        None => reload_mains(),
    };

    let toggle_expand = move |id: i64| {
        let open = expanded.try_update(|set| {
            if set.remove(&id) {
                false
            } else {
                set.insert(id);
                true
            }
        });
        if open == Some(true) {
            load_subs(id, false);
        }
    };

    let edit = move |hour: WorkHour| {
        spawn_local(async move {
            let fresh = match ctx.api().get_work_hour_detail(hour.id).await {
                Ok(Some(fresh)) => fresh,
                Ok(None) => hour,
                Err(e) => {
                    ctx.api_failed("加载工时详情", &e);
                    return;
                }
            };
            editing.set(Some(WorkHourForm::from_existing(&fresh)));
        });
    };

    let toggle_status = move |hour: WorkHour| {
        let (action, enable) = toggle_label(&hour.status);
        spawn_local(async move {
            match ctx.api().set_work_hour_enabled(hour.id, enable).await {
                Ok(()) => {
                    ctx.success(format!("{}成功", action));
                    after_change(hour.parent_id);
                }
                Err(e) => ctx.api_failed(action, &e),
            }
        });
    };

    let remove = move |hour: WorkHour| {
        spawn_local(async move {
            let message = format!("确定要删除工时\"{}\"吗？", hour.code);
            if ctx.confirm("删除工时", message).await.confirmed().is_none() {
                return;
            }
            match ctx.api().delete_work_hour(hour.id).await {
                Ok(()) => {
                    ctx.success("删除成功");
                    after_change(hour.parent_id);
                }
                Err(e) => ctx.api_failed("删除工时", &e),
            }
        });
    };

    let row = move |hour: WorkHour| {
        let id = hour.id;
        let is_sub = hour.parent_id.is_some();
        let (toggle_text, _) = toggle_label(&hour.status);
        let for_edit = hour.clone();
        let for_toggle = hour.clone();
        let for_delete = hour.clone();
        view! {
            <tr class=if is_sub { "sub-row" } else { "main-row" }>
                <td>
                    {(!is_sub).then(|| view! {
                        <button class="collapse-btn" on:click=move |_| toggle_expand(id)>
                            {move || if expanded.with(|set| set.contains(&id)) { "▼" } else { "▶" }}
                        </button>
                    })}
                    {hour.code.clone()}
                </td>
                <td>{hour.description.clone()}</td>
                <td>{hour.standard_hours}</td>
                <td>{hour.type_description.clone().or(hour.hour_type.clone())}</td>
                <td>{hour.step_order}</td>
                <td><StatusBadge status=hour.status.clone() /></td>
                <td class="row-actions">
                    {(!is_sub).then(|| view! {
                        <button class="btn btn-small" on:click=move |_| {
                            editing.set(Some(WorkHourForm::new_sub(id, &ctx.operator())));
                        }>"添加子工时"</button>
                    })}
                    <button class="btn btn-small" on:click=move |_| edit(for_edit.clone())>"编辑"</button>
                    <button class="btn btn-small" on:click=move |_| toggle_status(for_toggle.clone())>{toggle_text}</button>
                    <button class="btn btn-small btn-danger" on:click=move |_| remove(for_delete.clone())>"删除"</button>
                </td>
            </tr>
        }
    };

    view! {
        <div class="page work-hour-page">
            <div class="page-header">
                <h2>"工时管理"</h2>
                <button class="btn btn-primary" on:click=move |_| editing.set(Some(WorkHourForm::new_main(&ctx.operator())))>
                    "新建主工时"
                </button>
            </div>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"编码"</th>
                        <th>"描述"</th>
                        <th>"标准工时"</th>
                        <th>"类型"</th>
                        <th>"步骤"</th>
                        <th>"状态"</th>
                        <th>"操作"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || mains.get().into_iter().map(|main| {
                        let id = main.id;
                        let children = move || {
                            if !expanded.with(|set| set.contains(&id)) {
                                return None;
                            }
                            let list = subs.with(|cache| cache.get(&id).cloned())?;
                            Some(list.into_iter().map(row).collect_view())
                        };
                        view! {
                            {row(main)}
                            {children}
                        }
                    }).collect_view()}
                </tbody>
            </table>

            {move || editing.get().map(|form| {
                let parent_id = form.parent_id;
                view! {
                    <WorkHourFormDialog
                        form=form
                        on_done=Callback::new(move |saved: bool| {
                            editing.set(None);
                            if saved {
                                after_change(parent_id);
                            }
                        })
                    />
                }
            })}
        </div>
    }
}

#[component]
fn WorkHourFormDialog(form: WorkHourForm, on_done: Callback<bool>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let is_edit = form.id.is_some();
    let is_sub = form.is_sub();
    let code = RwSignal::new(form.code.clone());
    let description = RwSignal::new(form.description.clone());
    let hours = RwSignal::new(form.standard_hours.to_string());
    let step = RwSignal::new(form.step_order.map(|s| s.to_string()).unwrap_or_default());
    let base = StoredValue::new(form);
    let saving = RwSignal::new(false);

    let save = move |_| {
        let Ok(standard_hours) = hours.get_untracked().trim().parse::<f64>() else {
            ctx.warn("请输入有效的标准工时");
            return;
        };
        let mut form = base.get_value();
        form.code = code.get_untracked().trim().to_string();
        form.description = description.get_untracked();
        form.standard_hours = standard_hours;
        if is_sub {
            form.step_order = step.get_untracked().trim().parse().ok();
        }
        if form.code.is_empty() {
            ctx.warn("请输入工时编码");
            return;
        }
        spawn_local(async move {
            let Some(_guard) = BusyGuard::try_acquire(saving) else { return };
            match ctx.api().save_work_hour(&form).await {
                Ok(()) => {
                    ctx.success(if is_edit { "更新成功" } else { "创建成功" });
                    on_done.run(true);
                }
                Err(e) => ctx.api_failed("保存工时", &e),
            }
        });
    };

    let title = match (is_edit, is_sub) {
        (true, _) => "编辑工时",
        (false, true) => "新建子工时",
        (false, false) => "新建主工时",
    };

    view! {
        <div class="modal-overlay">
            <div class="modal form-modal">
                <h3>{title}</h3>
                <TextField label="工时编码" value=code disabled=is_edit />
                <TextField label="描述" value=description />
                <TextField label="标准工时" value=hours input_type="number" />
                <Show when=move || is_sub>
                    <TextField label="步骤顺序" value=step input_type="number" />
                </Show>
                <div class="modal-actions">
                    <button class="btn" on:click=move |_| on_done.run(false)>"取消"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=save>"保存"</button>
                </div>
            </div>
        </div>
    }
}
