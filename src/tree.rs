//! Tree Utilities
//!
//! Recursive operations over template/instance node trees. A tree is the
//! ordered list of root nodes; parents are implicit (whichever node's
//! `children` holds a node). All searches are depth-first pre-order and act
//! on the first match only.

use crate::models::Node;

/// Outcome of a mutation addressed by node id
#[must_use = "a NotFound result means the local tree is stale"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound,
}

impl Lookup {
    pub fn is_found(self) -> bool {
        self == Lookup::Found
    }
}

impl From<bool> for Lookup {
    fn from(found: bool) -> Self {
        if found {
            Lookup::Found
        } else {
            Lookup::NotFound
        }
    }
}

/// Fields merged into a node by [`find_and_update`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub node_name: Option<String>,
    pub node_name_en: Option<Option<String>>,
    pub sort_order: Option<i32>,
}

impl NodePatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            node_name: Some(name.into()),
            ..Default::default()
        }
    }

    fn apply(&self, node: &mut Node) {
        if let Some(name) = &self.node_name {
            node.node_name = name.clone();
        }
        if let Some(name_en) = &self.node_name_en {
            node.node_name_en = name_en.clone();
        }
        if let Some(sort_order) = self.sort_order {
            node.sort_order = Some(sort_order);
        }
    }
}

/// Where a node sits: its parent (None = root level), index among its
/// siblings and depth (roots are depth 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLocation {
    pub parent_id: Option<i64>,
    pub index: usize,
    pub depth: usize,
}

// ========================
// Lookup
// ========================

pub fn find(tree: &[Node], id: i64) -> Option<&Node> {
    for node in tree {
        if node.id == Some(id) {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut(tree: &mut [Node], id: i64) -> Option<&mut Node> {
    for node in tree.iter_mut() {
        if node.id == Some(id) {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Resolve a node's parent, sibling index and depth by id
pub fn locate(tree: &[Node], id: i64) -> Option<NodeLocation> {
    fn walk(nodes: &[Node], parent_id: Option<i64>, depth: usize, id: i64) -> Option<NodeLocation> {
        for (index, node) in nodes.iter().enumerate() {
            if node.id == Some(id) {
                return Some(NodeLocation { parent_id, index, depth });
            }
            if let Some(found) = walk(&node.children, node.id, depth + 1, id) {
                return Some(found);
            }
        }
        None
    }
    walk(tree, None, 0, id)
}

/// Children of `parent_id`, or the root list when `None`
pub fn siblings(tree: &[Node], parent_id: Option<i64>) -> Option<&[Node]> {
    match parent_id {
        None => Some(tree),
        Some(pid) => find(tree, pid).map(|parent| parent.children.as_slice()),
    }
}

// ========================
// Mutation
// ========================

/// Remove the first node with `id` (and its subtree)
pub fn find_and_remove(tree: &mut Vec<Node>, id: i64) -> Lookup {
    if let Some(pos) = tree.iter().position(|node| node.id == Some(id)) {
        tree.remove(pos);
        return Lookup::Found;
    }
    for node in tree.iter_mut() {
        if find_and_remove(&mut node.children, id).is_found() {
            return Lookup::Found;
        }
    }
    Lookup::NotFound
}

/// Merge `patch` into the first node with `id`
pub fn find_and_update(tree: &mut [Node], id: i64, patch: &NodePatch) -> Lookup {
    match find_mut(tree, id) {
        Some(node) => {
            patch.apply(node);
            Lookup::Found
        }
        None => Lookup::NotFound,
    }
}

/// Append under `parent_id`, or at root level when `None`
pub fn append(tree: &mut Vec<Node>, parent_id: Option<i64>, node: Node) -> Lookup {
    match parent_id {
        None => {
            tree.push(node);
            Lookup::Found
        }
        Some(pid) => match find_mut(tree, pid) {
            Some(parent) => {
                parent.children.push(node);
                Lookup::Found
            }
            None => Lookup::NotFound,
        },
    }
}

// ========================
// Traversal
// ========================

/// Every node in pre-order
pub fn flatten(tree: &[Node]) -> Vec<&Node> {
    flatten_with_depth(tree).into_iter().map(|(node, _)| node).collect()
}

/// Every node in pre-order with its depth
pub fn flatten_with_depth(tree: &[Node]) -> Vec<(&Node, usize)> {
    fn collect<'a>(nodes: &'a [Node], depth: usize, result: &mut Vec<(&'a Node, usize)>) {
        for node in nodes {
            result.push((node, depth));
            collect(&node.children, depth + 1, result);
        }
    }

    let mut result = Vec::new();
    collect(tree, 0, &mut result);
    result
}

/// Ids of every persisted node, for expand-all
pub fn all_ids(tree: &[Node]) -> Vec<i64> {
    flatten(tree).into_iter().filter_map(|node| node.id).collect()
}

/// `1 + max(sortOrder)` over the siblings, 1 for an empty list
pub fn next_sibling_sort_order(siblings: &[Node]) -> i32 {
    siblings.iter().map(Node::sort_key).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeType;

    fn make_node(id: i64, name: &str, node_type: NodeType, sort_order: i32, children: Vec<Node>) -> Node {
        Node {
            id: Some(id),
            node_name: name.to_string(),
            node_type: Some(node_type),
            sort_order: Some(sort_order),
            children,
            ..Default::default()
        }
    }

    /// Body(1) -> Engine(2) -> Oil Change(3), Brakes(4); Chassis(5)
    fn sample_tree() -> Vec<Node> {
        vec![
            make_node(
                1,
                "Body",
                NodeType::Category,
                1,
                vec![
                    make_node(2, "Engine", NodeType::Group, 1, vec![make_node(3, "Oil Change", NodeType::Usage, 1, vec![])]),
                    make_node(4, "Brakes", NodeType::Group, 2, vec![]),
                ],
            ),
            make_node(5, "Chassis", NodeType::Category, 2, vec![]),
        ]
    }

    #[test]
    fn test_flatten_tree() {
        let tree = sample_tree();
        let flat = flatten_with_depth(&tree);
        let ids: Vec<(i64, usize)> = flat.iter().map(|(n, d)| (n.id.unwrap(), *d)).collect();
        assert_eq!(ids, vec![(1, 0), (2, 1), (3, 2), (4, 1), (5, 0)]);
        assert_eq!(flatten(&tree).len(), 5);
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn test_find_and_remove_once() {
        let mut tree = sample_tree();
        let before = flatten(&tree).len();

        assert_eq!(find_and_remove(&mut tree, 3), Lookup::Found);
        assert_eq!(flatten(&tree).len(), before - 1);

        let snapshot = tree.clone();
        assert_eq!(find_and_remove(&mut tree, 3), Lookup::NotFound);
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn test_find_and_remove_every_id() {
        for id in [1, 2, 3, 4, 5] {
            let mut tree = sample_tree();
            assert!(find_and_remove(&mut tree, id).is_found());
            assert!(find(&tree, id).is_none());
            assert!(!find_and_remove(&mut tree, id).is_found());
        }
    }

    #[test]
    fn test_remove_takes_subtree() {
        let mut tree = sample_tree();
        assert!(find_and_remove(&mut tree, 1).is_found());
        assert_eq!(all_ids(&tree), vec![5]);
    }

    #[test]
    fn test_find_and_update_patches_first_match() {
        let mut tree = sample_tree();
        assert_eq!(find_and_update(&mut tree, 4, &NodePatch::rename("Brake System")), Lookup::Found);
        assert_eq!(find(&tree, 4).unwrap().node_name, "Brake System");
        assert_eq!(find(&tree, 4).unwrap().sort_order, Some(2));
        assert_eq!(find_and_update(&mut tree, 99, &NodePatch::rename("x")), Lookup::NotFound);
    }

    #[test]
    fn test_duplicate_ids_hit_first_preorder_match() {
        let mut tree = vec![
            make_node(1, "a", NodeType::Category, 1, vec![make_node(7, "deep", NodeType::Group, 1, vec![])]),
            make_node(7, "shallow", NodeType::Category, 2, vec![]),
        ];
        assert_eq!(find(&tree, 7).unwrap().node_name, "deep");
        assert!(find_and_update(&mut tree, 7, &NodePatch::rename("patched")).is_found());
        assert_eq!(tree[1].node_name, "shallow");
    }

    #[test]
    fn test_locate_and_siblings() {
        let tree = sample_tree();
        assert_eq!(
            locate(&tree, 4),
            Some(NodeLocation { parent_id: Some(1), index: 1, depth: 1 })
        );
        assert_eq!(
            locate(&tree, 5),
            Some(NodeLocation { parent_id: None, index: 1, depth: 0 })
        );
        assert_eq!(locate(&tree, 42), None);

        assert_eq!(siblings(&tree, Some(1)).unwrap().len(), 2);
        assert_eq!(siblings(&tree, None).unwrap().len(), 2);
        assert!(siblings(&tree, Some(42)).is_none());
    }

    #[test]
    fn test_append_under_parent_and_root() {
        let mut tree = sample_tree();
        let child = make_node(10, "Filter", NodeType::Usage, 2, vec![]);
        assert!(append(&mut tree, Some(2), child).is_found());
        assert_eq!(locate(&tree, 10).unwrap().parent_id, Some(2));

        assert!(append(&mut tree, None, make_node(11, "Interior", NodeType::Category, 3, vec![])).is_found());
        assert_eq!(tree.len(), 3);

        assert_eq!(append(&mut tree, Some(99), Node::default()), Lookup::NotFound);
    }

    #[test]
    fn test_next_sibling_sort_order() {
        assert_eq!(next_sibling_sort_order(&[]), 1);

        let tree = sample_tree();
        assert_eq!(next_sibling_sort_order(&tree), 3);

        let gapped = vec![
            make_node(1, "a", NodeType::Group, 4, vec![]),
            make_node(2, "b", NodeType::Group, 9, vec![]),
            make_node(3, "c", NodeType::Group, 2, vec![]),
        ];
        assert_eq!(next_sibling_sort_order(&gapped), 10);

        let unsorted = vec![Node::default()];
        assert_eq!(next_sibling_sort_order(&unsorted), 1);
    }
}
