//! Node Context Menu
//!
//! Payload captured when a tree node is right-clicked, and the actions the
//! menu offers for it.

use crate::models::{Domain, Node, NodeType};

/// Snapshot of the right-clicked node. Only ids are kept; the node itself
/// is looked up again in the current tree when an action runs.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMenuTarget {
    pub domain: Domain,
    pub node_id: Option<i64>,
    pub node_name: String,
    pub node_type: Option<NodeType>,
    pub parent_id: Option<i64>,
}

impl NodeMenuTarget {
    pub fn new(domain: Domain, node: &Node, parent_id: Option<i64>) -> Self {
        Self {
            domain,
            node_id: node.id,
            node_name: node.node_name.clone(),
            node_type: node.node_type,
            parent_id,
        }
    }

    /// Actions offered for this node, in menu order
    pub fn actions(&self) -> Vec<NodeAction> {
        let mut actions = Vec::with_capacity(5);
        if self.node_type != Some(NodeType::Usage) {
            actions.push(NodeAction::AddChild);
        }
        actions.extend([NodeAction::Edit, NodeAction::Delete, NodeAction::MoveUp, NodeAction::MoveDown]);
        actions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    AddChild,
    Edit,
    Delete,
    MoveUp,
    MoveDown,
}

impl NodeAction {
    pub fn label(self) -> &'static str {
        match self {
            NodeAction::AddChild => "添加子节点",
            NodeAction::Edit => "编辑节点",
            NodeAction::Delete => "删除节点",
            NodeAction::MoveUp => "上移",
            NodeAction::MoveDown => "下移",
        }
    }

    pub fn is_danger(self) -> bool {
        self == NodeAction::Delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(node_type: Option<NodeType>) -> NodeMenuTarget {
        let node = Node {
            id: Some(1),
            node_name: "n".into(),
            node_type,
            ..Default::default()
        };
        NodeMenuTarget::new(Domain::Template, &node, None)
    }

    #[test]
    fn test_usage_menu_has_no_add_child() {
        assert!(!target(Some(NodeType::Usage)).actions().contains(&NodeAction::AddChild));
        assert_eq!(target(Some(NodeType::Group)).actions()[0], NodeAction::AddChild);
        assert_eq!(target(None).actions().len(), 5);
    }
}
