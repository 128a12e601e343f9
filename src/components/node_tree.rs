//! Node Tree Component
//!
//! Recursive view of a template/instance structure. Right-clicking a row
//! opens the node context menu.

use std::collections::HashSet;

use leptos::prelude::*;
use leptos_contextmenu::{make_on_contextmenu, MenuSignals};

use crate::menu::NodeMenuTarget;
use crate::models::{Domain, Node, NodeType};

/// Row class the context menu treats as a valid right-click target
pub const TREE_ROW_SELECTOR: &str = ".tree-node-row";

#[component]
pub fn NodeTree(
    domain: Domain,
    #[prop(into)] nodes: Signal<Vec<Node>>,
    expanded: RwSignal<HashSet<i64>>,
    menu: MenuSignals<NodeMenuTarget>,
    /// Fired with the parent group id when a usage row is clicked
    #[prop(optional)]
    on_usage_click: Option<Callback<i64>>,
) -> impl IntoView {
    view! {
        <div class="node-tree">
            {move || {
                let nodes = nodes.get();
                if nodes.is_empty() {
                    view! { <div class="empty-tree">"暂无节点，请先添加根节点"</div> }.into_any()
                } else {
                    render_level(nodes, None, 0, domain, expanded, menu, on_usage_click)
                }
            }}
        </div>
    }
}

fn render_level(
    nodes: Vec<Node>,
    parent_id: Option<i64>,
    depth: usize,
    domain: Domain,
    expanded: RwSignal<HashSet<i64>>,
    menu: MenuSignals<NodeMenuTarget>,
    on_usage_click: Option<Callback<i64>>,
) -> AnyView {
    nodes
        .into_iter()
        .map(|node| render_node(node, parent_id, depth, domain, expanded, menu, on_usage_click))
        .collect_view()
        .into_any()
}

fn render_node(
    mut node: Node,
    parent_id: Option<i64>,
    depth: usize,
    domain: Domain,
    expanded: RwSignal<HashSet<i64>>,
    menu: MenuSignals<NodeMenuTarget>,
    on_usage_click: Option<Callback<i64>>,
) -> AnyView {
    let id = node.id;
    let children = std::mem::take(&mut node.children);
    let has_children = !children.is_empty();
    let is_open = move || id.is_none_or(|id| expanded.with(|set| set.contains(&id)));
    let target = NodeMenuTarget::new(domain, &node, parent_id);
    let on_contextmenu = make_on_contextmenu(menu, move || target.clone());

    let type_class = format!("node-type node-type-{}", node.type_str().to_lowercase());
    let type_label = node.node_type.map(NodeType::label).unwrap_or("未知");
    let clickable_usage = domain == Domain::Instance && node.is_leaf_type() && on_usage_click.is_some();
    let name = node.node_name.clone();
    let code = node.node_code.clone();

    let toggle = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        if let Some(id) = id {
            expanded.update(|set| {
                if !set.remove(&id) {
                    set.insert(id);
                }
            });
        }
    };

    let on_row_click = move |_: web_sys::MouseEvent| {
        if clickable_usage {
            if let (Some(callback), Some(group_id)) = (on_usage_click, parent_id) {
                callback.run(group_id);
            }
        }
    };

    view! {
        <div class="tree-node">
            <div
                class=if clickable_usage { "tree-node-row clickable" } else { "tree-node-row" }
                style=format!("padding-left: {}px;", depth * 20)
                on:contextmenu=on_contextmenu
                on:click=on_row_click
            >
                {if has_children {
                    view! {
                        <button class="collapse-btn" on:click=toggle>
                            {move || if is_open() { "▼" } else { "▶" }}
                        </button>
                    }.into_any()
                } else {
                    view! { <span class="collapse-placeholder">"·"</span> }.into_any()
                }}
                <span class=type_class>{type_label}</span>
                <span class="node-name">{name}</span>
                {code.map(|code| view! { <span class="node-code">{code}</span> })}
            </div>
            {has_children.then(|| {
                let children = StoredValue::new(children);
                view! {
                    <Show when=is_open>
                        {move || render_level(
                            children.get_value(),
                            id,
                            depth + 1,
                            domain,
                            expanded,
                            menu,
                            on_usage_click,
                        )}
                    </Show>
                }
            })}
        </div>
    }
    .into_any()
}
