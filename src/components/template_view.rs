//! Template View
//!
//! Template list with filters, the create/edit form and the detail dialog.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::template::{none_if_blank, TemplateForm, TemplateQuery};
use crate::components::common::{toggle_label, StatusBadge, TextField};
use crate::components::structure_detail::StructureDetailDialog;
use crate::context::AppContext;
use crate::freshness::BusyGuard;
use crate::models::{Domain, TemplateSummary, STATUS_DISABLED, STATUS_ENABLED};

#[component]
pub fn TemplateView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let templates = RwSignal::new(Vec::<TemplateSummary>::new());
    let loading = RwSignal::new(false);
    let code_filter = RwSignal::new(String::new());
    let name_filter = RwSignal::new(String::new());
    let status_filter = RwSignal::new(String::new());
    let editing = RwSignal::new(None::<TemplateForm>);
    let detail_id = RwSignal::new(None::<i64>);

    let reload = move || {
        let filter = TemplateQuery {
            template_code: none_if_blank(&code_filter.get_untracked()),
            name_keyword: none_if_blank(&name_filter.get_untracked()),
            status: none_if_blank(&status_filter.get_untracked()),
        };
        spawn_local(async move {
            let token = ctx.tracker().issue("templates");
            loading.set(true);
            let result = ctx.api().query_templates(&filter).await;
            if !ctx.tracker().is_current(&token) {
                return;
            }
            loading.set(false);
            match result {
                Ok(list) => templates.set(list),
                Err(e) => ctx.api_failed("查询模板", &e),
            }
        });
    };
    reload();

    let toggle_status = move |template: TemplateSummary| {
        let (action, enable) = toggle_label(&template.status);
        let name = template.template_name.clone().unwrap_or_default();
        spawn_local(async move {
            let message = format!("确定要{}模板\"{}\"吗？", action, name);
            if ctx.confirm(&format!("{}模板", action), message).await.confirmed().is_none() {
                return;
            }
            match ctx.api().set_template_enabled(template.id, enable).await {
                Ok(()) => {
                    ctx.success(format!("{}成功", action));
                    reload();
                }
                Err(e) => ctx.api_failed(action, &e),
            }
        });
    };

    let new_version = move |template: TemplateSummary| {
        spawn_local(async move {
            let current = template.version.clone().unwrap_or_default();
            let Some(version) = ctx.prompt("创建新版本", format!("当前版本: {}，请输入新版本号", current), "").await.confirmed() else {
                return;
            };
            match ctx.api().create_template_version(template.id, &version).await {
                Ok(()) => {
                    ctx.success("创建新版本成功");
                    reload();
                }
                Err(e) => ctx.api_failed("创建新版本", &e),
            }
        });
    };

    view! {
        <div class="page template-page">
            <div class="page-header">
                <h2>"结构模板"</h2>
                <button class="btn btn-primary" on:click=move |_| editing.set(Some(TemplateForm::default()))>"新建模板"</button>
            </div>

            <div class="filter-bar">
                <TextField label="模板编码" value=code_filter />
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
                        <th>"更新时间"</th>
                        <th>"操作"</th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || templates.get()
                        key=|t| (t.id, t.status.clone(), t.version.clone(), t.template_name.clone())
                        children=move |template: TemplateSummary| {
                            let id = template.id;
                            let (toggle_text, _) = toggle_label(&template.status);
                            let for_edit = template.clone();
                            let for_toggle = template.clone();
                            let for_version = template.clone();
                            view! {
                                <tr>
                                    <td>{template.template_code.clone()}</td>
                                    <td>{template.template_name.clone()}</td>
                                    <td>{template.version.clone()}</td>
                                    <td><StatusBadge status=template.status.clone() /></td>
                                    <td>{template.updated_time.clone()}</td>
                                    <td class="row-actions">
                                        <button class="btn btn-small" on:click=move |_| detail_id.set(Some(id))>"结构"</button>
                                        <button class="btn btn-small" on:click=move |_| editing.set(Some(TemplateForm {
                                            template_id: Some(for_edit.id),
                                            template_code: for_edit.template_code.clone().unwrap_or_default(),
                                            template_name: for_edit.template_name.clone().unwrap_or_default(),
                                            template_desc: for_edit.template_desc.clone().unwrap_or_default(),
                                            version: for_edit.version.clone().unwrap_or_default(),
                                        }))>"编辑"</button>
                                        <button class="btn btn-small" on:click=move |_| new_version(for_version.clone())>"新版本"</button>
                                        <button class="btn btn-small" on:click=move |_| toggle_status(for_toggle.clone())>{toggle_text}</button>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>

            {move || editing.get().map(|form| view! {
                <TemplateFormDialog
                    form=form
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
                    domain=Domain::Template
                    owner_id=id
                    on_close=Callback::new(move |_| detail_id.set(None))
                />
            })}
        </div>
    }
}

#[component]
fn TemplateFormDialog(form: TemplateForm, on_done: Callback<bool>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let template_id = form.template_id;
    let code = RwSignal::new(form.template_code);
    let name = RwSignal::new(form.template_name);
    let desc = RwSignal::new(form.template_desc);
    let version = RwSignal::new(form.version);
    let saving = RwSignal::new(false);

    let save = move |_| {
        let form = TemplateForm {
            template_id,
            template_code: code.get_untracked(),
            template_name: name.get_untracked(),
            template_desc: desc.get_untracked(),
            version: version.get_untracked(),
        };
        if form.template_code.trim().is_empty() || form.template_name.trim().is_empty() {
            ctx.warn("请填写模板编码和名称");
            return;
        }
        spawn_local(async move {
            let Some(_guard) = BusyGuard::try_acquire(saving) else { return };
            let api = ctx.api();
            let result = match template_id {
                Some(id) => api.update_template(id, &form).await,
                None => api.create_template(&form).await,
            };
            match result {
                Ok(()) => {
                    ctx.success(if template_id.is_some() { "更新模板成功" } else { "创建模板成功" });
                    on_done.run(true);
                }
                Err(e) => ctx.api_failed("保存模板", &e),
            }
        });
    };

    view! {
        <div class="modal-overlay">
            <div class="modal form-modal">
                <h3>{if template_id.is_some() { "编辑模板" } else { "新建模板" }}</h3>
                <TextField label="模板编码" value=code disabled=template_id.is_some() />
                <TextField label="模板名称" value=name />
                <TextField label="描述" value=desc />
                <TextField label="版本" value=version disabled=template_id.is_some() />
                <div class="modal-actions">
                    <button class="btn" on:click=move |_| on_done.run(false)>"取消"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=save>"保存"</button>
                </div>
            </div>
        </div>
    }
}
