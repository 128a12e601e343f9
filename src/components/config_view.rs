//! Config Views
//!
//! Configuration categories and the items under each category.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::config::{CategoryForm, ConfigItemForm};
use crate::components::common::{parse_id, StatusBadge, TextField};
use crate::context::AppContext;
use crate::freshness::BusyGuard;
use crate::models::{ConfigCategory, ConfigItem};
use crate::store::{store_set_categories, use_app_store, AppStateStoreFields};

/// Fetch categories into the shared store
pub fn load_categories(ctx: AppContext) {
    let store = use_app_store();
    spawn_local(async move {
        match ctx.api().get_categories().await {
            Ok(list) => store_set_categories(&store, list),
            Err(e) => ctx.api_failed("加载配置类别", &e),
        }
    });
}

// ========================
// Categories
// ========================

#[component]
pub fn ConfigCategoryView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let keyword = RwSignal::new(String::new());
    let editing = RwSignal::new(None::<CategoryForm>);

    let reload = move || {
        let keyword = keyword.get_untracked();
        spawn_local(async move {
            let token = ctx.tracker().issue("categories");
            let result = ctx.api().search_categories(&keyword).await;
            if !ctx.tracker().is_current(&token) {
                return;
            }
            match result {
                Ok(list) => store_set_categories(&store, list),
                Err(e) => ctx.api_failed("查询配置类别", &e),
            }
        });
    };
    reload();

    let remove = move |category: ConfigCategory| {
        spawn_local(async move {
            let message = format!("确定要删除配置类别\"{}\"吗？", category.category_name);
            if ctx.confirm("删除配置类别", message).await.confirmed().is_none() {
                return;
            }
            match ctx.api().delete_category(category.id).await {
                Ok(()) => {
                    ctx.success("删除成功");
                    reload();
                }
                Err(e) => ctx.api_failed("删除配置类别", &e),
            }
        });
    };

    view! {
        <div class="page config-category-page">
            <div class="page-header">
                <h2>"配置类别"</h2>
                <button class="btn btn-primary" on:click=move |_| editing.set(Some(CategoryForm::default()))>"新建类别"</button>
            </div>
            <div class="filter-bar">
                <TextField label="关键字" value=keyword />
                <button class="btn" on:click=move |_| reload()>"搜索"</button>
            </div>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"编码"</th>
                        <th>"名称"</th>
                        <th>"排序"</th>
                        <th>"状态"</th>
                        <th>"配置项"</th>
                        <th>"操作"</th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || store.categories().get()
                        key=|c| (c.id, c.category_name.clone(), c.sort_order, c.items.len())
                        children=move |category: ConfigCategory| {
                            let for_edit = category.clone();
                            let for_delete = category.clone();
                            view! {
                                <tr>
                                    <td>{category.category_code.clone()}</td>
                                    <td>{category.category_name.clone()}</td>
                                    <td>{category.sort_order}</td>
                                    <td><StatusBadge status=category.status.clone() /></td>
                                    <td>{category.items.len()}</td>
                                    <td class="row-actions">
                                        <button class="btn btn-small" on:click=move |_| editing.set(Some(CategoryForm {
                                            id: Some(for_edit.id),
                                            category_code: for_edit.category_code.clone().unwrap_or_default(),
                                            category_name: for_edit.category_name.clone(),
                                            sort_order: for_edit.sort_order.unwrap_or(0),
                                            creator: None,
                                        }))>"编辑"</button>
                                        <button class="btn btn-small btn-danger" on:click=move |_| remove(for_delete.clone())>"删除"</button>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>

            {move || editing.get().map(|form| view! {
                <CategoryFormDialog
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
fn CategoryFormDialog(form: CategoryForm, on_done: Callback<bool>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let id = form.id;
    let code = RwSignal::new(form.category_code);
    let name = RwSignal::new(form.category_name);
    let sort = RwSignal::new(form.sort_order.to_string());
    let saving = RwSignal::new(false);

    let save = move |_| {
        let form = CategoryForm {
            id,
            category_code: code.get_untracked().trim().to_string(),
            category_name: name.get_untracked().trim().to_string(),
            sort_order: sort.get_untracked().trim().parse().unwrap_or(0),
            creator: None,
        };
        if form.category_code.is_empty() || form.category_name.is_empty() {
            ctx.warn("请填写类别编码和名称");
            return;
        }
        spawn_local(async move {
            let Some(_guard) = BusyGuard::try_acquire(saving) else { return };
            let api = ctx.api();
            let result = if id.is_some() {
                api.update_category(&form).await
            } else {
                api.create_category(&form).await
            };
            match result {
                Ok(()) => {
                    ctx.success(if id.is_some() { "更新成功" } else { "创建成功" });
                    on_done.run(true);
                }
                Err(e) => ctx.api_failed("保存配置类别", &e),
            }
        });
    };

    view! {
        <div class="modal-overlay">
            <div class="modal form-modal">
                <h3>{if id.is_some() { "编辑配置类别" } else { "新建配置类别" }}</h3>
                <TextField label="类别编码" value=code disabled=id.is_some() />
                <TextField label="类别名称" value=name />
                <TextField label="排序" value=sort input_type="number" />
                <div class="modal-actions">
                    <button class="btn" on:click=move |_| on_done.run(false)>"取消"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=save>"保存"</button>
                </div>
            </div>
        </div>
    }
}

// ========================
// Items
// ========================

#[component]
pub fn ConfigItemView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let category_id = RwSignal::new(None::<i64>);
    let items = RwSignal::new(Vec::<ConfigItem>::new());
    let keyword = RwSignal::new(String::new());
    let creating = RwSignal::new(false);

    if store.categories().with_untracked(Vec::is_empty) {
        load_categories(ctx);
    }

    let reload = move || {
        let selected = category_id.get_untracked();
        let keyword = keyword.get_untracked();
        spawn_local(async move {
            let token = ctx.tracker().issue("config-items");
            let api = ctx.api();
            let result = match selected {
                _ if !keyword.trim().is_empty() => api.search_config_items(&keyword).await,
                Some(id) => api.get_config_items(id).await,
                None => Ok(Vec::new()),
            };
            if !ctx.tracker().is_current(&token) {
                return;
            }
            match result {
                Ok(list) => items.set(list),
                Err(e) => ctx.api_failed("查询配置项", &e),
            }
        });
    };

    let remove = move |item: ConfigItem| {
        spawn_local(async move {
            let message = format!("确定要删除配置项\"{}\"吗？", item.item_name);
            if ctx.confirm("删除配置项", message).await.confirmed().is_none() {
                return;
            }
            match ctx.api().delete_config_item(item.id).await {
                Ok(()) => {
                    ctx.success("删除成功");
                    reload();
                }
                Err(e) => ctx.api_failed("删除配置项", &e),
            }
        });
    };

    view! {
        <div class="page config-item-page">
            <div class="page-header">
                <h2>"配置项"</h2>
                <button
                    class="btn btn-primary"
                    disabled=move || category_id.get().is_none()
                    on:click=move |_| creating.set(true)
                >
                    "新建配置项"
                </button>
            </div>
            <div class="filter-bar">
                <label class="form-field">
                    <span class="form-label">"配置类别"</span>
                    <select on:change=move |ev| {
                        category_id.set(parse_id(&event_target_value(&ev)));
                        reload();
                    }>
                        <option value="">"请选择类别"</option>
                        <For
                            each=move || store.categories().get()
                            key=|c| c.id
                            children=move |c: ConfigCategory| view! {
                                <option value=c.id.to_string()>{c.category_name}</option>
                            }
                        />
                    </select>
                </label>
                <TextField label="关键字" value=keyword />
                <button class="btn" on:click=move |_| reload()>"搜索"</button>
            </div>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"编码"</th>
                        <th>"名称"</th>
                        <th>"值"</th>
                        <th>"状态"</th>
                        <th>"操作"</th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || items.get()
                        key=|i| i.id
                        children=move |item: ConfigItem| {
                            let for_delete = item.clone();
                            view! {
                                <tr>
                                    <td>{item.item_code.clone()}</td>
                                    <td>{item.item_name.clone()}</td>
                                    <td>{item.item_value.clone()}</td>
                                    <td><StatusBadge status=item.status.clone() /></td>
                                    <td class="row-actions">
                                        <button class="btn btn-small btn-danger" on:click=move |_| remove(for_delete.clone())>"删除"</button>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>

            {move || (creating.get()).then(|| category_id.get()).flatten().map(|id| view! {
                <ConfigItemFormDialog
                    category_id=id
                    on_done=Callback::new(move |saved: bool| {
                        creating.set(false);
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
fn ConfigItemFormDialog(category_id: i64, on_done: Callback<bool>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let code = RwSignal::new(String::new());
    let name = RwSignal::new(String::new());
    let value = RwSignal::new(String::new());
    let saving = RwSignal::new(false);

    let save = move |_| {
        let form = ConfigItemForm {
            category_id,
            item_code: code.get_untracked().trim().to_string(),
            item_name: name.get_untracked().trim().to_string(),
            item_value: value.get_untracked().trim().to_string(),
            creator: ctx.operator(),
        };
        if form.item_code.is_empty() || form.item_name.is_empty() {
            ctx.warn("请填写配置项编码和名称");
            return;
        }
        spawn_local(async move {
            let Some(_guard) = BusyGuard::try_acquire(saving) else { return };
            match ctx.api().create_config_item(&form).await {
                Ok(()) => {
                    ctx.success("创建成功");
                    on_done.run(true);
                }
                Err(e) => ctx.api_failed("创建配置项", &e),
            }
        });
    };

    view! {
        <div class="modal-overlay">
            <div class="modal form-modal">
                <h3>"新建配置项"</h3>
                <TextField label="配置项编码" value=code />
                <TextField label="配置项名称" value=name />
                <TextField label="配置项值" value=value />
                <div class="modal-actions">
                    <button class="btn" on:click=move |_| on_done.run(false)>"取消"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=save>"保存"</button>
                </div>
            </div>
        </div>
    }
}
