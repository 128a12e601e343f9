//! Instance Comparison
//!
//! Renders two instance trees as numbered, annotated lines using the
//! added/removed/modified sets computed by the server. The client never
//! diffs trees itself.

use std::collections::HashSet;

use crate::api::StructureApi;
use crate::error::ApiError;
use crate::models::{CompareResult, DiffEntry, Domain, Node, StructureDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSide {
    /// First instance, checked against `removed` then `modified`
    Left,
    /// Second instance, checked against `added` then `modified`
    Right,
    /// Single column, rendered like the left side
    Unified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
    Modified,
    Separator,
}

impl LineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LineKind::Context => "context",
            LineKind::Added => "added",
            LineKind::Removed => "removed",
            LineKind::Modified => "modified",
            LineKind::Separator => "separator",
        }
    }

    pub fn indicator(self) -> char {
        match self {
            LineKind::Added => '+',
            LineKind::Removed => '-',
            LineKind::Modified => '~',
            LineKind::Context | LineKind::Separator => ' ',
        }
    }

    pub fn css_class(self) -> String {
        format!("diff-line-{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// 1-based, counted per side before any filtering
    pub line_number: usize,
    pub content: String,
    pub kind: LineKind,
    pub indicator: char,
    pub node_id: Option<i64>,
}

// ========================
// Diff Sets
// ========================

/// Membership keys of one diff set. Entries are matched by node id, or by
/// node code when the server left the id out.
#[derive(Debug, Clone, Default, PartialEq)]
struct KeySet {
    ids: HashSet<i64>,
    codes: HashSet<String>,
}

impl KeySet {
    fn from_entries(entries: &[DiffEntry]) -> Self {
        let mut set = KeySet::default();
        for entry in entries {
            match (entry.node_id, &entry.node_code) {
                (Some(id), _) => {
                    set.ids.insert(id);
                }
                (None, Some(code)) if !code.is_empty() => {
                    set.codes.insert(code.clone());
                }
                _ => {}
            }
        }
        set
    }

    fn contains(&self, node: &Node) -> bool {
        node.id.is_some_and(|id| self.ids.contains(&id))
            || node.node_code.as_ref().is_some_and(|code| self.codes.contains(code))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffIndex {
    added: KeySet,
    removed: KeySet,
    modified: KeySet,
}

impl DiffIndex {
    pub fn new(result: &CompareResult) -> Self {
        Self {
            added: KeySet::from_entries(&result.added),
            removed: KeySet::from_entries(&result.removed),
            modified: KeySet::from_entries(&result.modified),
        }
    }

    /// Removed (left) or added (right) wins over modified
    pub fn classify(&self, node: &Node, side: DiffSide) -> LineKind {
        let primary = match side {
            DiffSide::Left | DiffSide::Unified => (&self.removed, LineKind::Removed),
            DiffSide::Right => (&self.added, LineKind::Added),
        };
        if primary.0.contains(node) {
            primary.1
        } else if self.modified.contains(node) {
            LineKind::Modified
        } else {
            LineKind::Context
        }
    }
}

/// Pre-order lines for one tree. Context lines are dropped afterwards when
/// `only_differences` is set, so surviving lines keep their numbers.
pub fn render_lines(tree: &[Node], index: &DiffIndex, side: DiffSide, only_differences: bool) -> Vec<DiffLine> {
    fn walk(nodes: &[Node], level: usize, index: &DiffIndex, side: DiffSide, lines: &mut Vec<DiffLine>) {
        for node in nodes {
            let kind = index.classify(node, side);
            lines.push(DiffLine {
                line_number: lines.len() + 1,
                content: format!("{}{} [{}]", "  ".repeat(level), node.node_name, node.type_str()),
                kind,
                indicator: kind.indicator(),
                node_id: node.id,
            });
            walk(&node.children, level + 1, index, side, lines);
        }
    }

    let mut lines = Vec::new();
    walk(tree, 0, index, side, &mut lines);
    if only_differences {
        lines.retain(|line| line.kind != LineKind::Context);
    }
    lines
}

// ========================
// Loaded Comparison
// ========================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: u32,
    pub removed: u32,
    pub modified: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    pub left: StructureDetail,
    pub right: StructureDetail,
    pub result: CompareResult,
    index: DiffIndex,
}

impl ComparisonView {
    pub fn new(left: StructureDetail, right: StructureDetail, result: CompareResult) -> Self {
        let index = DiffIndex::new(&result);
        Self {
            left,
            right,
            result,
            index,
        }
    }

    pub fn lines(&self, side: DiffSide, only_differences: bool) -> Vec<DiffLine> {
        let tree = match side {
            DiffSide::Left | DiffSide::Unified => &self.left.node_tree,
            DiffSide::Right => &self.right.node_tree,
        };
        render_lines(tree, &self.index, side, only_differences)
    }

    /// Server totals, missing ones counted as zero
    pub fn stats(&self) -> DiffStats {
        DiffStats {
            added: self.result.total_added.unwrap_or(0),
            removed: self.result.total_removed.unwrap_or(0),
            modified: self.result.total_modified.unwrap_or(0),
        }
    }
}

/// Fetch both details and the diff together. Returns `None` without any
/// request when either instance is unselected; any failure fails the whole.
pub async fn load_comparison<A: StructureApi + ?Sized>(
    api: &A,
    instance_id1: Option<i64>,
    instance_id2: Option<i64>,
) -> Result<Option<ComparisonView>, ApiError> {
    let (Some(id1), Some(id2)) = (instance_id1, instance_id2) else {
        return Ok(None);
    };
    tracing::debug!(id1, id2, "loading comparison");
    let (left, right, result) = futures::try_join!(
        api.fetch_detail(Domain::Instance, id1),
        api.fetch_detail(Domain::Instance, id2),
        api.compare_instances(id1, id2)
    )?;
    Ok(Some(ComparisonView::new(left, right, result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::structure::CreatedNode;
    use crate::api::{AddNodeRequest, MoveNodeRequest, UpdateNodeRequest};
    use crate::models::NodeType;
    use async_trait::async_trait;
    use std::cell::RefCell;

    fn make_node(id: i64, name: &str, node_type: NodeType, children: Vec<Node>) -> Node {
        Node {
            id: Some(id),
            node_name: name.to_string(),
            node_type: Some(node_type),
            children,
            ..Default::default()
        }
    }

    fn entry(node_id: i64) -> DiffEntry {
        DiffEntry {
            node_id: Some(node_id),
            ..Default::default()
        }
    }

    fn left_tree() -> Vec<Node> {
        vec![make_node(
            1,
            "Body",
            NodeType::Category,
            vec![
                make_node(2, "Engine", NodeType::Group, vec![make_node(4, "Oil Change", NodeType::Usage, vec![])]),
                make_node(3, "Brakes", NodeType::Group, vec![]),
            ],
        )]
    }

    fn right_tree() -> Vec<Node> {
        vec![make_node(
            1,
            "Body",
            NodeType::Category,
            vec![
                make_node(3, "Brake System", NodeType::Group, vec![]),
                make_node(5, "Lights", NodeType::Group, vec![]),
            ],
        )]
    }

    fn sample_result() -> CompareResult {
        CompareResult {
            added: vec![entry(5)],
            removed: vec![entry(2), entry(4)],
            modified: vec![entry(3)],
            total_added: Some(1),
            total_removed: Some(2),
            total_modified: None,
        }
    }

    #[test]
    fn test_added_and_modified_on_right() {
        let result = CompareResult {
            added: vec![entry(5)],
            removed: vec![],
            modified: vec![entry(3)],
            ..Default::default()
        };
        let tree = vec![make_node(5, "Lights", NodeType::Group, vec![]), make_node(3, "Seats", NodeType::Group, vec![])];
        let lines = render_lines(&tree, &DiffIndex::new(&result), DiffSide::Right, false);

        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].node_id, lines[0].kind, lines[0].indicator), (Some(5), LineKind::Added, '+'));
        assert_eq!((lines[1].node_id, lines[1].kind, lines[1].indicator), (Some(3), LineKind::Modified, '~'));
        assert_eq!(lines[0].kind.as_str(), "added");
    }

    #[test]
    fn test_left_side_content_and_numbering() {
        let view = ComparisonView::new(
            StructureDetail { node_tree: left_tree(), ..Default::default() },
            StructureDetail { node_tree: right_tree(), ..Default::default() },
            sample_result(),
        );
        let lines = view.lines(DiffSide::Left, false);
        let rendered: Vec<(usize, &str, char)> = lines
            .iter()
            .map(|l| (l.line_number, l.content.as_str(), l.indicator))
            .collect();
        assert_eq!(
            rendered,
            vec![
                (1, "Body [CATEGORY]", ' '),
                (2, "  Engine [GROUP]", '-'),
                (3, "    Oil Change [USAGE]", '-'),
                (4, "  Brakes [GROUP]", '~'),
            ]
        );

        let right = view.lines(DiffSide::Right, false);
        assert_eq!(right[0].line_number, 1);
        assert_eq!(right[2].kind, LineKind::Added);
        assert_eq!(view.lines(DiffSide::Unified, false), lines);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let view = ComparisonView::new(
            StructureDetail { node_tree: left_tree(), ..Default::default() },
            StructureDetail { node_tree: right_tree(), ..Default::default() },
            sample_result(),
        );
        for side in [DiffSide::Left, DiffSide::Right, DiffSide::Unified] {
            for only in [false, true] {
                assert_eq!(view.lines(side, only), view.lines(side, only));
            }
        }
    }

    #[test]
    fn test_only_differences_is_ordered_subsequence() {
        let view = ComparisonView::new(
            StructureDetail { node_tree: left_tree(), ..Default::default() },
            StructureDetail { node_tree: right_tree(), ..Default::default() },
            sample_result(),
        );
        for side in [DiffSide::Left, DiffSide::Right] {
            let full = view.lines(side, false);
            let filtered = view.lines(side, true);
            assert!(filtered.len() < full.len());
            assert!(filtered.iter().all(|l| l.kind != LineKind::Context));

            let mut rest = full.iter();
            for line in &filtered {
                assert!(rest.any(|candidate| candidate == line), "{:?} out of order", line);
            }
        }
        let numbers: Vec<usize> = view.lines(DiffSide::Left, true).iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![2, 3, 4]);
    }

    #[test]
    fn test_removed_wins_over_modified() {
        let result = CompareResult {
            removed: vec![entry(1)],
            modified: vec![entry(1)],
            added: vec![entry(1)],
            ..Default::default()
        };
        let tree = vec![make_node(1, "Body", NodeType::Category, vec![])];
        let index = DiffIndex::new(&result);
        assert_eq!(render_lines(&tree, &index, DiffSide::Left, false)[0].kind, LineKind::Removed);
        assert_eq!(render_lines(&tree, &index, DiffSide::Right, false)[0].kind, LineKind::Added);
    }

    #[test]
    fn test_entries_without_id_match_by_code() {
        let result = CompareResult {
            modified: vec![DiffEntry {
                node_code: Some("ENG".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut engine = make_node(2, "Engine", NodeType::Group, vec![]);
        engine.node_code = Some("ENG".into());
        let unsaved = Node {
            node_name: "Draft".into(),
            ..Default::default()
        };
        let lines = render_lines(&[engine, unsaved], &DiffIndex::new(&result), DiffSide::Left, false);
        assert_eq!(lines[0].kind, LineKind::Modified);
        assert_eq!(lines[1].kind, LineKind::Context);
        assert_eq!(lines[1].content, "Draft []");
    }

    #[test]
    fn test_stats_copy_server_totals() {
        let view = ComparisonView::new(StructureDetail::default(), StructureDetail::default(), sample_result());
        assert_eq!(
            view.stats(),
            DiffStats {
                added: 1,
                removed: 2,
                modified: 0
            }
        );
        assert!(view.lines(DiffSide::Left, false).is_empty());
        assert_eq!(LineKind::Separator.css_class(), "diff-line-separator");
    }

    // ========================
    // Loading
    // ========================

    #[derive(Default)]
    struct CompareApi {
        calls: RefCell<Vec<String>>,
        fail_compare: bool,
    }

    #[async_trait(?Send)]
    impl StructureApi for CompareApi {
        async fn fetch_detail(&self, _domain: Domain, id: i64) -> Result<StructureDetail, ApiError> {
            self.calls.borrow_mut().push(format!("detail {}", id));
            Ok(StructureDetail {
                id,
                node_tree: if id == 1 { left_tree() } else { right_tree() },
                ..Default::default()
            })
        }

        async fn add_node(&self, _: Domain, _: &AddNodeRequest) -> Result<CreatedNode, ApiError> {
            unreachable!()
        }

        async fn update_node(&self, _: Domain, _: &UpdateNodeRequest) -> Result<(), ApiError> {
            unreachable!()
        }

        async fn delete_node(&self, _: Domain, _: i64) -> Result<(), ApiError> {
            unreachable!()
        }

        async fn move_node(&self, _: Domain, _: &MoveNodeRequest) -> Result<(), ApiError> {
            unreachable!()
        }

        async fn compare_instances(&self, a: i64, b: i64) -> Result<CompareResult, ApiError> {
            self.calls.borrow_mut().push(format!("compare {} {}", a, b));
            if self.fail_compare {
                return Err(ApiError::Status(500));
            }
            Ok(sample_result())
        }
    }

    #[tokio::test]
    async fn test_load_comparison_joins_three_calls() {
        let api = CompareApi::default();
        let view = load_comparison(&api, Some(1), Some(2)).await.unwrap().unwrap();
        assert_eq!(view.left.id, 1);
        assert_eq!(view.right.id, 2);
        assert_eq!(api.calls.borrow().len(), 3);
        assert_eq!(view.stats().removed, 2);
    }

    #[tokio::test]
    async fn test_load_comparison_needs_both_ids() {
        let api = CompareApi::default();
        assert!(load_comparison(&api, Some(1), None).await.unwrap().is_none());
        assert!(load_comparison(&api, None, Some(2)).await.unwrap().is_none());
        assert!(api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_load_comparison_fails_as_a_whole() {
        let api = CompareApi {
            fail_compare: true,
            ..Default::default()
        };
        let err = load_comparison(&api, Some(1), Some(2)).await.unwrap_err();
        assert_eq!(err, ApiError::Status(500));
    }
}
