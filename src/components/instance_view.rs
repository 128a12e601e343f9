//! Instance View
//!
//! Instance list, create/edit form, publishing, the detail dialog and the
//! comparison dialog.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::instance::{InstanceForm, InstanceQuery};
use crate::api::template::{none_if_blank, TemplateQuery};
use crate::components::common::{parse_id, toggle_label, StatusBadge, TextField};
use crate::components::compare_dialog::CompareDialog;
use crate::components::structure_detail::StructureDetailDialog;
use crate::context::AppContext;
use crate::freshness::BusyGuard;
use crate::models::{Domain, InstanceSummary, TemplateSummary, STATUS_DISABLED, STATUS_ENABLED};

/// Form state plus the instance being edited, if any
#[derive(Clone, Debug, Default, PartialEq)]
struct InstanceDraft {
    instance_id: Option<i64>,
    form: InstanceForm,
}

#[component]
pub fn InstanceView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let instances = RwSignal::new(Vec::<InstanceSummary>::new());
    let loading = RwSignal::new(false);
    let code_filter = RwSignal::new(String::new());
    let name_filter = RwSignal::new(String::new());
    let status_filter = RwSignal::new(String::new());
    let editing = RwSignal::new(None::<InstanceDraft>);
    let detail_id = RwSignal::new(None::<i64>);
    let comparing = RwSignal::new(false);

    let reload = move || {
        let filter = InstanceQuery {
            instance_code: none_if_blank(&code_filter.get_untracked()),
            name_keyword: none_if_blank(&name_filter.get_untracked()),
            status: none_if_blank(&status_filter.get_untracked()),
            ..Default::default()
        };
        spawn_local(async move {
            let token = ctx.tracker().issue("instances");
            loading.set(true);
            let result = ctx.api().query_instances(&filter).await;
            if !ctx.tracker().is_current(&token) {
                return;
            }
            loading.set(false);
            match result {
                Ok(list) => instances.set(list),
                Err(e) => ctx.api_failed("查询实例", &e),
            }
        });
    };
    reload();

    let toggle_status = move |instance: InstanceSummary| {
        let (action, enable) = toggle_label(&instance.status);
        spawn_local(async move {
            let name = instance.instance_name.clone().unwrap_or_default();
            if ctx
                .confirm(&format!("{}实例", action), format!("确定要{}实例\"{}\"吗？", action, name))
                .await
                .confirmed()
                .is_none()
            {
                return;
            }
            match ctx.api().set_instance_enabled(instance.id, enable).await {
                Ok(()) => {
                    ctx.success(format!("{}成功", action));
                    reload();
                }
                Err(e) => ctx.api_failed(action, &e),
            }
        });
    };

    let toggle_publish = move |instance: InstanceSummary| {
        let publish = !instance.is_published.unwrap_or(false);
        let action = if publish { "发布" } else { "取消发布" };
        spawn_local(async move {
            let name = instance.instance_name.clone().unwrap_or_default();
            if ctx
                .confirm(&format!("{}实例", action), format!("确定要{}实例\"{}\"吗？", action, name))
                .await
                .confirmed()
                .is_none()
            {
                return;
            }
            let api = ctx.api();
            let result = if publish {
                api.publish_instance(instance.id).await
            } else {
                api.unpublish_instance(instance.id).await
            };
            match result {
                Ok(()) => {
                    ctx.success(format!("{}成功", action));
                    reload();
                }
                Err(e) => ctx.api_failed(action, &e),
            }
        });
    };

    let new_version = move |instance: InstanceSummary| {
        spawn_local(async move {
            let current = instance.instance_version.clone().unwrap_or_default();
            let Some(version) = ctx
                .prompt("创建新版本", format!("当前版本: {}，请输入新版本号", current), "")
                .await
                .confirmed()
            else {
                return;
            };
            let desc = instance.instance_desc.clone();
            match ctx.api().create_instance_version(instance.id, &version, desc.as_deref()).await {
                Ok(()) => {
                    ctx.success("创建新版本成功");
                    reload();
                }
                Err(e) => ctx.api_failed("创建新版本", &e),
            }
        });
    };

    view! {
        <div class="page instance-page">
            <div class="page-header">
                <h2>"结构实例"</h2>
                <button class="btn" on:click=move |_| comparing.set(true)>"实例对比"</button>
                <button class="btn btn-primary" on:click=move |_| editing.set(Some(InstanceDraft::default()))>"新建实例"</button>
            </div>

            <div class="filter-bar">
                <TextField label="实例编码" value=code_filter />
                <TextField label="名称关键字" value=name_filter />
                <label class="form-field">
                    <span class="form-label">"状态"</span>
                    <select on:change=move |ev| status_filter.set(event_target_value(&ev))>
                        <option value="">"全部"</option>
                        <option value=STATUS_ENABLED>"启用"</option>
                        <option value=STATUS_DISABLED>"禁用"</option>
                    </select>
                </label>
                <button class="btn" on:click=move |_| reload()>"查询"</button>
            </div>

            <Show when=move || loading.get()>
                <div class="loading">"加载中..."</div>
            </Show>

            <table class="data-table">
                <thead>
                    <tr>
                        <th>"编码"</th>
                        <th>"名称"</th>
                        <th>"版本"</th>
                        <th>"状态"</th>
                        <th>"发布"</th>
                        <th>"生效时间"</th>
                        <th>"操作"</th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || instances.get()
                        key=|i| (i.id, i.status.clone(), i.is_published, i.instance_version.clone(), i.instance_name.clone())
                        children=move |instance: InstanceSummary| {
                            let id = instance.id;
                            let published = instance.is_published.unwrap_or(false);
                            let (toggle_text, _) = toggle_label(&instance.status);
                            let for_edit = instance.clone();
                            let for_toggle = instance.clone();
                            let for_publish = instance.clone();
                            let for_version = instance.clone();
                            view! {
                                <tr>
                                    <td>{instance.instance_code.clone()}</td>
                                    <td>{instance.instance_name.clone()}</td>
                                    <td>{instance.instance_version.clone()}</td>
                                    <td><StatusBadge status=instance.status.clone() /></td>
                                    <td>{if published { "已发布" } else { "未发布" }}</td>
                                    <td>{instance.effective_time.clone()}</td>
                                    <td class="row-actions">
                                        <button class="btn btn-small" on:click=move |_| detail_id.set(Some(id))>"结构"</button>
                                        <button class="btn btn-small" on:click=move |_| editing.set(Some(InstanceDraft {
                                            instance_id: Some(for_edit.id),
                                            form: InstanceForm {
                                                instance_code: for_edit.instance_code.clone().unwrap_or_default(),
                                                instance_name: for_edit.instance_name.clone().unwrap_or_default(),
                                                instance_desc: for_edit.instance_desc.clone().unwrap_or_default(),
                                                series_id: for_edit.series_id,
                                                model_id: for_edit.model_id,
                                                instance_version: for_edit.instance_version.clone().unwrap_or_default(),
                                            },
                                        }))>"编辑"</button>
                                        <button class="btn btn-small" on:click=move |_| new_version(for_version.clone())>"新版本"</button>
                                        <button class="btn btn-small" on:click=move |_| toggle_publish(for_publish.clone())>
                                            {if published { "取消发布" } else { "发布" }}
                                        </button>
                                        <button class="btn btn-small" on:click=move |_| toggle_status(for_toggle.clone())>{toggle_text}</button>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>

            {move || editing.get().map(|draft| view! {
                <InstanceFormDialog
                    draft=draft
                    on_done=Callback::new(move |saved: bool| {
                        editing.set(None);
                        if saved {
                            reload();
                        }
                    })
                />
            })}

            {move || detail_id.get().map(|id| view! {
                <StructureDetailDialog
                    domain=Domain::Instance
                    owner_id=id
                    on_close=Callback::new(move |_| detail_id.set(None))
                />
            })}

            <Show when=move || comparing.get()>
                <CompareDialog
                    instances=Signal::derive(move || instances.get())
                    on_close=Callback::new(move |_| comparing.set(false))
                />
            </Show>
        </div>
    }
}

#[component]
fn InstanceFormDialog(draft: InstanceDraft, on_done: Callback<bool>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let instance_id = draft.instance_id;
    let form = draft.form;
    let code = RwSignal::new(form.instance_code);
    let name = RwSignal::new(form.instance_name);
    let desc = RwSignal::new(form.instance_desc);
    let series = RwSignal::new(form.series_id.map(|id| id.to_string()).unwrap_or_default());
    let model = RwSignal::new(form.model_id.map(|id| id.to_string()).unwrap_or_default());
    let version = RwSignal::new(form.instance_version);
    let template_id = RwSignal::new(None::<i64>);
    let templates = RwSignal::new(Vec::<TemplateSummary>::new());
    let saving = RwSignal::new(false);

    // New instances are built from an enabled template
    if instance_id.is_none() {
        spawn_local(async move {
            let filter = TemplateQuery {
                status: Some(STATUS_ENABLED.to_string()),
                ..Default::default()
            };
            match ctx.api().query_templates(&filter).await {
                Ok(list) => templates.set(list),
                Err(e) => ctx.api_failed("加载模板", &e),
            }
        });
    }

    let save = move |_| {
        let form = InstanceForm {
            instance_code: code.get_untracked(),
            instance_name: name.get_untracked(),
            instance_desc: desc.get_untracked(),
            series_id: parse_id(&series.get_untracked()),
            model_id: parse_id(&model.get_untracked()),
            instance_version: version.get_untracked(),
        };
        if form.instance_code.trim().is_empty() || form.instance_name.trim().is_empty() {
            ctx.warn("请填写实例编码和名称");
            return;
        }
        let template = template_id.get_untracked();
        if instance_id.is_none() && template.is_none() {
            ctx.warn("请选择模板");
            return;
        }
        spawn_local(async move {
            let Some(_guard) = BusyGuard::try_acquire(saving) else { return };
            let api = ctx.api();
            let result = match (instance_id, template) {
                (Some(id), _) => api.update_instance(id, &form).await,
                (None, Some(template_id)) => api.create_instance(template_id, &form).await,
                (None, None) => return,
            };
            match result {
                Ok(()) => {
                    ctx.success(if instance_id.is_some() { "更新实例成功" } else { "创建实例成功" });
                    on_done.run(true);
                }
                Err(e) => ctx.api_failed("保存实例", &e),
            }
        });
    };

    view! {
        <div class="modal-overlay">
            <div class="modal form-modal">
                <h3>{if instance_id.is_some() { "编辑实例" } else { "新建实例" }}</h3>
                <Show when=move || instance_id.is_none()>
                    <label class="form-field">
                        <span class="form-label">"模板"</span>
                        <select on:change=move |ev| template_id.set(parse_id(&event_target_value(&ev)))>
                            <option value="">"请选择模板"</option>
                            <For
                                each=move || templates.get()
                                key=|t| t.id
                                children=move |t: TemplateSummary| view! {
                                    <option value=t.id.to_string()>
                                        {format!(
                                            "{} ({})",
                                            t.template_name.unwrap_or_default(),
                                            t.version.unwrap_or_default(),
                                        )}
                                    </option>
                                }
                            />
                        </select>
                    </label>
                </Show>
                <TextField label="实例编码" value=code disabled=instance_id.is_some() />
                <TextField label="实例名称" value=name />
                <TextField label="描述" value=desc />
                <TextField label="车系ID" value=series input_type="number" disabled=instance_id.is_some() />
                <TextField label="车型ID" value=model input_type="number" disabled=instance_id.is_some() />
                <TextField label="版本" value=version disabled=instance_id.is_some() />
                <div class="modal-actions">
                    <button class="btn" on:click=move |_| on_done.run(false)>"取消"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=save>"保存"</button>
                </div>
            </div>
        </div>
    }
}
