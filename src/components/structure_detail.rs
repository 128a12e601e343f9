//! Structure Detail Dialog
//!
//! Opens a template or instance, shows its node tree and runs the
//! context-menu actions against it.

use std::collections::HashSet;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_contextmenu::{bind_global_dismiss, create_menu_signals, MenuSignals};

use crate::api::StructureApi;
use crate::components::node_tree::{NodeTree, TREE_ROW_SELECTOR};
use crate::context::AppContext;
use crate::editor::{DetailSession, MoveDirection, NewNodeDraft, NodeEditor, NodeForm};
use crate::feedback::reconcile_toast;
use crate::freshness::{BusyGuard, RequestToken};
use crate::menu::{NodeAction, NodeMenuTarget};
use crate::models::Domain;
use crate::store::{store_jump_to_usages, use_app_store};
use crate::tree;

const MENU_SELECTOR: &str = ".node-context-menu";

/// Add-node form currently open
#[derive(Clone, Debug, PartialEq)]
struct AddFormState {
    draft: NewNodeDraft,
    form: NodeForm,
}

#[component]
pub fn StructureDetailDialog(domain: Domain, owner_id: i64, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let session = RwSignal::new(None::<DetailSession>);
    let loading = RwSignal::new(true);
    let busy = RwSignal::new(false);
    let expanded = RwSignal::new(HashSet::<i64>::new());
    let add_form = RwSignal::new(None::<AddFormState>);
    let menu = create_menu_signals::<NodeMenuTarget>();
    bind_global_dismiss(menu, MENU_SELECTOR, TREE_ROW_SELECTOR);

    // Initial load, everything expanded
    let session_key = format!("{}:{}", domain.segment(), owner_id);
    let cleanup_key = session_key.clone();
    on_cleanup(move || ctx.tracker().invalidate(&cleanup_key));
    spawn_local(async move {
        let token = ctx.tracker().issue(session_key);
        let result = ctx.api().fetch_detail(domain, owner_id).await;
        if !ctx.tracker().is_current(&token) {
            return;
        }
        match result {
            Ok(detail) => {
                expanded.set(tree::all_ids(&detail.node_tree).into_iter().collect());
                session.set(Some(DetailSession::new(domain, detail)));
            }
            Err(e) => ctx.api_failed("加载详情", &e),
        }
        loading.set(false);
    });

    let nodes = Signal::derive(move || session.with(|s| s.as_ref().map(|s| s.detail.node_tree.clone()).unwrap_or_default()));
    let title = move || session.with(|s| s.as_ref().map(DetailSession::title).unwrap_or_else(|| domain.label().to_string()));

    let expand_all = move |_| {
        session.with_untracked(|s| {
            if let Some(s) = s {
                expanded.set(tree::all_ids(s.tree()).into_iter().collect());
            }
        })
    };
    let collapse_all = move |_| expanded.set(HashSet::new());

    let add_root = move |_| {
        let Some(snapshot) = session.get_untracked() else { return };
        let api = ctx.api();
        let operator = ctx.operator();
        let draft = NodeEditor::new(&api, &operator).draft_root(&snapshot);
        add_form.set(Some(AddFormState {
            draft,
            form: NodeForm::default(),
        }));
    };

    let on_action = Callback::new(move |action: NodeAction| {
        let Some(target) = menu.begin() else { return };
        spawn_local(async move {
            run_action(ctx, session, busy, expanded, add_form, target, action).await;
            menu.finish();
        });
    });

    let on_usage_click = Callback::new(move |group_id: i64| {
        on_close.run(());
        store_jump_to_usages(&store, group_id);
    });
    let usage_click = (domain == Domain::Instance).then_some(on_usage_click);

    view! {
        <div class="modal-overlay">
            <div class="modal structure-detail-modal">
                <div class="modal-header">
                    <h3>{title}</h3>
                    <button class="btn btn-small" on:click=move |_| on_close.run(())>"关闭"</button>
                </div>
                <div class="detail-toolbar">
                    <button class="btn btn-primary" disabled=move || busy.get() on:click=add_root>"添加根节点"</button>
                    <button class="btn" on:click=expand_all>"全部展开"</button>
                    <button class="btn" on:click=collapse_all>"全部收起"</button>
                    <Show when=move || busy.get()>
                        <span class="busy-hint">"处理中..."</span>
                    </Show>
                </div>
                <Show
                    when=move || !loading.get()
                    fallback=|| view! { <div class="loading">"加载中..."</div> }
                >
                    {match usage_click {
                        Some(callback) => view! {
                            <NodeTree domain=domain nodes=nodes expanded=expanded menu=menu on_usage_click=callback />
                        }.into_any(),
                        None => view! {
                            <NodeTree domain=domain nodes=nodes expanded=expanded menu=menu />
                        }.into_any(),
                    }}
                </Show>
            </div>

            <NodeContextMenu menu=menu on_action=on_action />

            {move || add_form.get().map(|state| view! {
                <AddNodeForm
                    state=state
                    busy=busy
                    on_submit=Callback::new(move |state: AddFormState| {
                        spawn_local(submit_add(ctx, session, busy, expanded, add_form, state));
                    })
                    on_cancel=Callback::new(move |_| add_form.set(None))
                />
            })}
        </div>
    }
}

#[component]
fn NodeContextMenu(menu: MenuSignals<NodeMenuTarget>, on_action: Callback<NodeAction>) -> impl IntoView {
    view! {
        {move || {
            let position = menu.position()?;
            let target = menu.payload()?;
            Some(view! {
                <div
                    class="node-context-menu"
                    style=format!("left: {}px; top: {}px;", position.x, position.y)
                >
                    {target.actions().into_iter().map(|action| view! {
                        <div
                            class=if action.is_danger() { "menu-item danger" } else { "menu-item" }
                            on:click=move |_| on_action.run(action)
                        >
                            {action.label()}
                        </div>
                    }).collect_view()}
                </div>
            })
        }}
    }
}

#[component]
fn AddNodeForm(
    state: AddFormState,
    busy: RwSignal<bool>,
    on_submit: Callback<AddFormState>,
    on_cancel: Callback<()>,
) -> impl IntoView {
    let draft = state.draft;
    let (name, set_name) = signal(state.form.node_name);
    let (name_en, set_name_en) = signal(state.form.node_name_en);
    let (ref_id, set_ref_id) = signal(state.form.ref_id.map(|id| id.to_string()).unwrap_or_default());

    let submit = move || {
        on_submit.run(AddFormState {
            draft,
            form: NodeForm {
                node_name: name.get_untracked(),
                node_name_en: name_en.get_untracked(),
                ref_id: ref_id.get_untracked().trim().parse().ok(),
            },
        })
    };

    view! {
        <div class="modal-overlay">
            <div class="modal node-form-modal">
                <h3>{format!("添加{}节点", draft.node_type.label())}</h3>
                <label>"节点名称"</label>
                <input type="text" prop:value=move || name.get() on:input=move |ev| set_name.set(event_target_value(&ev)) />
                <label>"英文名称"</label>
                <input type="text" prop:value=move || name_en.get() on:input=move |ev| set_name_en.set(event_target_value(&ev)) />
                <label>{format!("关联{}ID", draft.node_type.label())}</label>
                <input type="number" prop:value=move || ref_id.get() on:input=move |ev| set_ref_id.set(event_target_value(&ev)) />
                <div class="form-hint">{format!("排序号: {}", draft.sort_order)}</div>
                <div class="modal-actions">
                    <button class="btn" on:click=move |_| on_cancel.run(())>"取消"</button>
                    <button class="btn btn-primary" disabled=move || busy.get() on:click=move |_| submit()>"确定"</button>
                </div>
            </div>
        </div>
    }
}

// ========================
// Actions
// ========================

/// Store the mutated copy unless a newer request for the same detail started
fn commit(ctx: AppContext, session: RwSignal<Option<DetailSession>>, token: &RequestToken, updated: DetailSession) {
    if ctx.tracker().is_current(token) {
        session.set(Some(updated));
    }
}

async fn run_action(
    ctx: AppContext,
    session: RwSignal<Option<DetailSession>>,
    busy: RwSignal<bool>,
    expanded: RwSignal<HashSet<i64>>,
    add_form: RwSignal<Option<AddFormState>>,
    target: NodeMenuTarget,
    action: NodeAction,
) {
    let Some(mut snapshot) = session.get_untracked() else { return };
    let api = ctx.api();
    let operator = ctx.operator();
    let editor = NodeEditor::new(&api, &operator);

    if action == NodeAction::AddChild {
        let token = ctx.tracker().issue(snapshot.key());
        match editor.prepare_child(&mut snapshot, target.node_id, target.node_type).await {
            Ok(draft) => add_form.set(Some(AddFormState {
                draft,
                form: NodeForm::default(),
            })),
            Err(e) => {
                commit(ctx, session, &token, snapshot);
                ctx.editor_failed("添加节点", &e);
            }
        }
        return;
    }

    let Some(node_id) = target.node_id else {
        ctx.warn("节点尚未保存");
        return;
    };

    match action {
        NodeAction::AddChild => {}
        NodeAction::Edit => {
            let Some(new_name) = ctx.prompt("编辑节点", "请输入新的节点名称", &target.node_name).await.confirmed() else {
                return;
            };
            let Some(_guard) = BusyGuard::try_acquire(busy) else { return };
            let token = ctx.tracker().issue(snapshot.key());
            let result = editor.rename(&mut snapshot, node_id, &new_name).await;
            commit(ctx, session, &token, snapshot);
            match result {
                Ok(()) => ctx.success("编辑节点成功"),
                Err(e) => ctx.editor_failed("编辑节点", &e),
            }
        }
        NodeAction::Delete => {
            let message = format!("确定要删除节点\"{}\"吗？删除后其所有子节点也将被删除。", target.node_name);
            if ctx.confirm("删除节点", message).await.confirmed().is_none() {
                return;
            }
            let Some(_guard) = BusyGuard::try_acquire(busy) else { return };
            let token = ctx.tracker().issue(snapshot.key());
            match editor.delete(&mut snapshot, node_id).await {
                Ok(reconciled) => {
                    commit(ctx, session, &token, snapshot);
                    expanded.update(|set| {
                        set.remove(&node_id);
                    });
                    ctx.success("删除节点成功");
                    if let Some((level, text)) = reconcile_toast(&reconciled) {
                        ctx.notify(level, text);
                    }
                }
                Err(e) => ctx.editor_failed("删除节点", &e),
            }
        }
        NodeAction::MoveUp | NodeAction::MoveDown => {
            let direction = if action == NodeAction::MoveUp {
                MoveDirection::Up
            } else {
                MoveDirection::Down
            };
            let Some(_guard) = BusyGuard::try_acquire(busy) else { return };
            let token = ctx.tracker().issue(snapshot.key());
            let result = editor.move_by(&mut snapshot, node_id, direction).await;
            commit(ctx, session, &token, snapshot);
            match result {
                Ok(reconciled) => {
                    ctx.success(direction.success_text());
                    if let Some((level, text)) = reconcile_toast(&reconciled) {
                        ctx.notify(level, text);
                    }
                }
                Err(e) => ctx.editor_failed("移动节点", &e),
            }
        }
    }
}

async fn submit_add(
    ctx: AppContext,
    session: RwSignal<Option<DetailSession>>,
    busy: RwSignal<bool>,
    expanded: RwSignal<HashSet<i64>>,
    add_form: RwSignal<Option<AddFormState>>,
    state: AddFormState,
) {
    let Some(mut snapshot) = session.get_untracked() else { return };
    let Some(_guard) = BusyGuard::try_acquire(busy) else { return };
    let api = ctx.api();
    let operator = ctx.operator();
    let editor = NodeEditor::new(&api, &operator);

    let token = ctx.tracker().issue(snapshot.key());
    match editor.submit_add(&mut snapshot, state.draft, &state.form).await {
        Ok((node, reconciled)) => {
            commit(ctx, session, &token, snapshot);
            expanded.update(|set| {
                set.extend(state.draft.parent_id);
                set.extend(node.id);
            });
            add_form.set(None);
            ctx.success("添加节点成功");
            if let Some((level, text)) = reconcile_toast(&reconciled) {
                ctx.notify(level, text);
            }
        }
        Err(e) => ctx.editor_failed("添加节点", &e),
    }
}
