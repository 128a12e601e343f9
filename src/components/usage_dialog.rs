//! Usage Dialog
//!
//! Create or edit a usage: basic fields, the exploded-view image and the
//! list of configuration combinations with a per-category item picker.

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen_futures::JsFuture;

use crate::api::usage::Attachment;
use crate::combination::{Combination, UsageForm};
use crate::components::common::parse_id;
use crate::context::AppContext;
use crate::freshness::BusyGuard;
use crate::models::ConfigCategory;
use crate::store::{use_app_store, AppStateStoreFields};

use super::config_view::load_categories;

async fn read_attachment(file: web_sys::File) -> Result<Attachment, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("{:?}", e))?;
    Ok(Attachment {
        file_name: file.name(),
        mime: Some(file.type_()),
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}

#[component]
pub fn UsageDialog(form: UsageForm, on_done: Callback<bool>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    if store.categories().with_untracked(Vec::is_empty) {
        load_categories(ctx);
    }

    let is_edit = form.is_edit();
    let form = RwSignal::new(form);
    let attachment = RwSignal::new(None::<Attachment>);
    let saving = RwSignal::new(false);

    let combination_count = Memo::new(move |_| form.with(|f| f.combinations.len()));
    let first_category = move || store.categories().with_untracked(|c| c.first().map(|c| c.id));

    let set_text = move |apply: fn(&mut UsageForm, String)| {
        move |ev: web_sys::Event| {
            let value = event_target_value(&ev);
            form.update(|f| apply(f, value));
        }
    };

    let on_file = move |ev: web_sys::Event| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            attachment.set(None);
            return;
        };
        spawn_local(async move {
            match read_attachment(file).await {
                Ok(file) => {
                    tracing::debug!(name = %file.file_name, size = file.bytes.len(), "attachment read");
                    attachment.set(Some(file));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read attachment");
                    ctx.warn("读取文件失败");
                }
            }
        });
    };

    let save = move |_| {
        let current = form.get_untracked();
        if let Err(e) = current.validate() {
            ctx.editor_failed("保存用法", &e);
            return;
        }
        spawn_local(async move {
            let Some(_guard) = BusyGuard::try_acquire(saving) else { return };
            match ctx.api().save_usage(&current, attachment.get_untracked()).await {
                Ok(()) => {
                    ctx.success(if is_edit { "更新用法成功" } else { "创建用法成功" });
                    on_done.run(true);
                }
                Err(e) => ctx.api_failed("保存用法", &e),
            }
        });
    };

    let id_field = |f: &UsageForm, pick: fn(&UsageForm) -> Option<i64>| pick(f).map(|v| v.to_string()).unwrap_or_default();

    view! {
        <div class="modal-overlay">
            <div class="modal usage-modal">
                <h3>{if is_edit { "编辑用法" } else { "新建用法" }}</h3>

                <label class="form-field">
                    <span class="form-label">"用法名称"</span>
                    <input
                        type="text"
                        prop:value=move || form.with(|f| f.usage_name.clone())
                        on:change=set_text(|f, v| f.usage_name = v)
                    />
                </label>
                <Show when=move || !is_edit>
                    <label class="form-field">
                        <span class="form-label">"实例ID"</span>
                        <input
                            type="number"
                            prop:value=move || form.with(|f| id_field(f, |f| f.instance_id))
                            on:change=set_text(|f, v| f.instance_id = parse_id(&v))
                        />
                    </label>
                    <label class="form-field">
                        <span class="form-label">"父组节点ID"</span>
                        <input
                            type="number"
                            prop:value=move || form.with(|f| id_field(f, |f| f.parent_group_node_id))
                            on:change=set_text(|f, v| f.parent_group_node_id = parse_id(&v))
                        />
                    </label>
                    <label class="form-field">
                        <span class="form-label">"排序"</span>
                        <input
                            type="number"
                            prop:value=move || form.with(|f| f.sort_order.to_string())
                            on:change=set_text(|f, v| f.sort_order = v.trim().parse().unwrap_or(1))
                        />
                    </label>
                    <label class="form-field">
                        <span class="form-label">"创建人"</span>
                        <input
                            type="text"
                            prop:value=move || form.with(|f| f.creator.clone())
                            on:change=set_text(|f, v| f.creator = v)
                        />
                    </label>
                </Show>
                <label class="form-field">
                    <span class="form-label">"系统分组ID"</span>
                    <input
                        type="number"
                        prop:value=move || form.with(|f| id_field(f, |f| f.group_id))
                        on:change=set_text(|f, v| f.group_id = parse_id(&v))
                    />
                </label>
                <label class="form-field">
                    <span class="form-label">"爆炸图"</span>
                    <input type="file" accept="image/*" on:change=on_file />
                    {move || attachment.with(|a| a.as_ref().map(|a| a.file_name.clone()))}
                </label>

                <div class="combinations-header">
                    <h4>"配置组合"</h4>
                    <button
                        class="btn btn-small"
                        on:click=move |_| {
                            let first = first_category();
                            form.update(|f| {
                                f.combinations.add(first);
                            });
                            if let Some(category_id) = first {
                                let index = form.with_untracked(|f| f.combinations.len() - 1);
                                select_category(ctx, form, index, category_id);
                            }
                        }
                    >
                        "添加组合"
                    </button>
                </div>
                {move || {
                    (0..combination_count.get())
                        .map(|index| view! { <CombinationCard form=form index=index /> })
                        .collect_view()
                }}

                <div class="modal-actions">
                    <button class="btn" on:click=move |_| on_done.run(false)>"取消"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=save>"保存"</button>
                </div>
            </div>
        </div>
    }
}

/// Show a category tab, fetching its items the first time
fn select_category(ctx: AppContext, form: RwSignal<UsageForm>, index: usize, category_id: i64) {
    let cached = form
        .try_update(|f| {
            let combination = f.combinations.get_mut(index)?;
            combination.active_category = Some(category_id);
            Some(combination.has_category(category_id))
        })
        .flatten();
    if cached != Some(false) {
        return;
    }
    spawn_local(async move {
        match ctx.api().get_config_items(category_id).await {
            Ok(items) => form.update(|f| {
                if let Some(combination) = f.combinations.get_mut(index) {
                    combination.cache_items(category_id, items);
                }
            }),
            Err(e) => ctx.api_failed("加载配置项", &e),
        }
    });
}

#[component]
fn CombinationCard(form: RwSignal<UsageForm>, index: usize) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let combination = move || form.with(|f| f.combinations.items().get(index).cloned());
    let edit = move |apply: &dyn Fn(&mut Combination)| {
        form.update(|f| {
            if let Some(c) = f.combinations.get_mut(index) {
                apply(c);
            }
        })
    };

    view! {
        {move || combination().map(|c| {
            let active = c.active_category;
            let selected: Vec<(i64, String)> = c.config_item_ids.iter().map(|id| (*id, c.item_label(*id))).collect();
            let options = active.and_then(|cat| c.category_items.get(&cat).cloned()).unwrap_or_default();
            let picked = c.config_item_ids.clone();
            view! {
                <div class="combination-card">
                    <div class="combination-header">
                        <span class="combination-order">{format!("#{}", c.sort_order)}</span>
                        <input
                            type="text"
                            placeholder="组合名称"
                            prop:value=c.combination_name.clone()
                            on:change=move |ev| {
                                let value = event_target_value(&ev);
                                edit(&|c| c.combination_name = value.clone());
                            }
                        />
                        <button
                            class="btn btn-small btn-danger"
                            on:click=move |_| form.update(|f| {
                                f.combinations.remove(index);
                            })
                        >
                            "删除组合"
                        </button>
                    </div>

                    <div class="selected-items">
                        {selected.into_iter().map(|(id, label)| view! {
                            <span class="item-tag">
                                {label}
                                <button class="tag-remove" on:click=move |_| edit(&|c| c.remove_item(id))>"×"</button>
                            </span>
                        }).collect_view()}
                    </div>

                    <div class="category-tabs">
                        <For
                            each=move || store.categories().get()
                            key=|cat| cat.id
                            children=move |cat: ConfigCategory| {
                                let id = cat.id;
                                view! {
                                    <button
                                        class=if active == Some(id) { "tab active" } else { "tab" }
                                        on:click=move |_| select_category(ctx, form, index, id)
                                    >
                                        {cat.category_name}
                                    </button>
                                }
                            }
                        />
                    </div>

                    <div class="item-options">
                        {options.into_iter().map(|item| {
                            let id = item.id;
                            let checked = picked.contains(&id);
                            view! {
                                <label class="item-option">
                                    <input
                                        type="checkbox"
                                        prop:checked=checked
                                        on:change=move |_| edit(&|c| c.toggle_item(id))
                                    />
                                    {item.label()}
                                </label>
                            }
                        }).collect_view()}
                    </div>
                </div>
            }
        })}
    }
}
