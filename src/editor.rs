//! Node Editor
//!
//! Tree mutations for an open template/instance detail. Every change goes
//! to the server first; the local tree is then reconciled by re-fetching
//! the whole detail. The one local-first change is a rename, which is
//! reverted if the server rejects it.

use crate::api::{AddNodeRequest, MoveNodeRequest, StructureApi, UpdateNodeRequest};
use crate::error::EditorError;
use crate::models::{Domain, Node, NodeType, StructureDetail};
use crate::tree::{self, NodePatch};

/// The detail currently open in a dialog
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSession {
    pub domain: Domain,
    pub owner_id: i64,
    pub detail: StructureDetail,
}

impl DetailSession {
    pub fn new(domain: Domain, detail: StructureDetail) -> Self {
        Self {
            domain,
            owner_id: detail.id,
            detail,
        }
    }

    pub fn tree(&self) -> &[Node] {
        &self.detail.node_tree
    }

    /// Key used for request freshness tracking
    pub fn key(&self) -> String {
        format!("{}:{}", self.domain.segment(), self.owner_id)
    }

    pub fn title(&self) -> String {
        self.detail
            .name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.domain.label(), self.owner_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn success_text(self) -> &'static str {
        match self {
            MoveDirection::Up => "上移成功",
            MoveDirection::Down => "下移成功",
        }
    }
}

/// Values derived when the add dialog opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewNodeDraft {
    pub parent_id: Option<i64>,
    pub node_type: NodeType,
    pub sort_order: i32,
}

/// What the user typed into the add dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeForm {
    pub node_name: String,
    pub node_name_en: String,
    /// Linked category/group/usage id, sent in the field matching the node type
    pub ref_id: Option<i64>,
}

/// How the local tree relates to the server after a successful change
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// Tree re-fetched
    Fresh,
    /// The change went through but the re-fetch failed; the tree may lag
    Stale(String),
}

pub struct NodeEditor<'a, A: StructureApi + ?Sized> {
    api: &'a A,
    operator: &'a str,
}

impl<'a, A: StructureApi + ?Sized> NodeEditor<'a, A> {
    pub fn new(api: &'a A, operator: &'a str) -> Self {
        Self { api, operator }
    }

    // ========================
    // Drafts (no network)
    // ========================

    /// A new CATEGORY sorted after the current roots
    pub fn draft_root(&self, session: &DetailSession) -> NewNodeDraft {
        NewNodeDraft {
            parent_id: None,
            node_type: NodeType::Category,
            sort_order: tree::next_sibling_sort_order(session.tree()),
        }
    }

    /// A child of `parent`, typed one level below it and sorted last
    pub fn draft_child(
        &self,
        session: &DetailSession,
        parent_id: Option<i64>,
        parent_type: Option<NodeType>,
    ) -> Result<NewNodeDraft, EditorError> {
        let Some(node_type) = NodeType::child_of(parent_type) else {
            tracing::warn!(?parent_id, "refusing to add a child under a usage node");
            return Err(EditorError::Validation("用法节点不能添加子节点".into()));
        };
        let Some(parent_id) = parent_id else {
            return Err(EditorError::Validation("节点尚未保存，无法添加子节点".into()));
        };
        let Some(siblings) = tree::siblings(session.tree(), Some(parent_id)) else {
            tracing::warn!(parent_id, "parent missing from local tree");
            return Err(EditorError::NotFound(parent_id));
        };
        Ok(NewNodeDraft {
            parent_id: Some(parent_id),
            node_type,
            sort_order: tree::next_sibling_sort_order(siblings),
        })
    }

    // ========================
    // Server Operations
    // ========================

    /// `draft_child`, reloading the tree when the parent is no longer in it
    pub async fn prepare_child(
        &self,
        session: &mut DetailSession,
        parent_id: Option<i64>,
        parent_type: Option<NodeType>,
    ) -> Result<NewNodeDraft, EditorError> {
        match self.draft_child(session, parent_id, parent_type) {
            Err(EditorError::NotFound(id)) => Err(self.reload_stale(session, id).await),
            other => other,
        }
    }

    /// Create the node, append it locally, then re-fetch
    pub async fn submit_add(
        &self,
        session: &mut DetailSession,
        draft: NewNodeDraft,
        form: &NodeForm,
    ) -> Result<(Node, Reconciled), EditorError> {
        if form.node_name.trim().is_empty() {
            return Err(EditorError::Validation("请输入节点名称".into()));
        }
        let request = AddNodeRequest::new(
            session.domain,
            session.owner_id,
            draft.parent_id,
            draft.node_type,
            &form.node_name,
            &form.node_name_en,
            draft.sort_order,
            form.ref_id,
            self.operator,
        );
        let created = self.api.add_node(session.domain, &request).await?;
        let node = created.into_node(&request);
        tracing::info!(id = ?node.id, parent = ?draft.parent_id, node_type = %draft.node_type, "node added");

        if !tree::append(&mut session.detail.node_tree, draft.parent_id, node.clone()).is_found() {
            tracing::warn!(parent = ?draft.parent_id, "parent vanished before append, relying on refresh");
        }
        let reconciled = self.refresh(session).await;
        Ok((node, reconciled))
    }

    /// Rename locally, then persist; the old name comes back on failure
    pub async fn rename(&self, session: &mut DetailSession, node_id: i64, new_name: &str) -> Result<(), EditorError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(EditorError::Validation("节点名称不能为空".into()));
        }
        let Some(current) = tree::find(session.tree(), node_id) else {
            tracing::warn!(node_id, "rename target missing from local tree");
            return Err(self.reload_stale(session, node_id).await);
        };
        let previous = current.node_name.clone();
        let request = UpdateNodeRequest {
            node_id,
            node_name: new_name.to_string(),
            node_name_en: current.node_name_en.clone(),
        };

        let applied = tree::find_and_update(&mut session.detail.node_tree, node_id, &NodePatch::rename(new_name));
        debug_assert!(applied.is_found(), "node {} was just found", node_id);
        if let Err(e) = self.api.update_node(session.domain, &request).await {
            tracing::warn!(node_id, error = %e, "rename rejected, restoring previous name");
            if !tree::find_and_update(&mut session.detail.node_tree, node_id, &NodePatch::rename(previous)).is_found() {
                tracing::warn!(node_id, "node vanished before its name could be restored");
            }
            return Err(e.into());
        }
        tracing::info!(node_id, "node renamed");
        Ok(())
    }

    /// Delete on the server, then re-fetch. The local tree is never edited first.
    pub async fn delete(&self, session: &mut DetailSession, node_id: i64) -> Result<Reconciled, EditorError> {
        self.api.delete_node(session.domain, node_id).await?;
        tracing::info!(node_id, "node deleted");
        Ok(self.refresh(session).await)
    }

    /// Swap position with the neighbour in `direction`.
    /// The first sibling cannot move up, the last cannot move down.
    pub async fn move_by(
        &self,
        session: &mut DetailSession,
        node_id: i64,
        direction: MoveDirection,
    ) -> Result<Reconciled, EditorError> {
        let Some(location) = tree::locate(session.tree(), node_id) else {
            tracing::warn!(node_id, "move target missing from local tree");
            return Err(self.reload_stale(session, node_id).await);
        };
        let sibling_count = tree::siblings(session.tree(), location.parent_id).map_or(0, <[Node]>::len);
        let target = match direction {
            MoveDirection::Up => location.index.checked_sub(1),
            MoveDirection::Down => Some(location.index + 1).filter(|i| *i < sibling_count),
        };
        let Some(target) = target else {
            tracing::warn!(node_id, ?direction, index = location.index, "move out of range");
            return Err(EditorError::Validation("无法移动到该位置".into()));
        };

        let request = MoveNodeRequest {
            node_id,
            new_parent_id: location.parent_id,
            sort_order: target as i32 + 1,
        };
        self.api.move_node(session.domain, &request).await?;
        tracing::info!(node_id, from = location.index + 1, to = target + 1, "node moved");
        Ok(self.refresh(session).await)
    }

    /// The local tree lost `node_id`: re-fetch it, then report the miss
    async fn reload_stale(&self, session: &mut DetailSession, node_id: i64) -> EditorError {
        if let Reconciled::Stale(msg) = self.refresh(session).await {
            tracing::warn!(node_id, error = %msg, "stale tree could not be reloaded");
        }
        EditorError::NotFound(node_id)
    }

    /// Replace the local tree with the server's
    pub async fn refresh(&self, session: &mut DetailSession) -> Reconciled {
        match self.api.fetch_detail(session.domain, session.owner_id).await {
            Ok(detail) => {
                session.detail = detail;
                Reconciled::Fresh
            }
            Err(e) => {
                tracing::warn!(key = %session.key(), error = %e, "refresh failed");
                Reconciled::Stale(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::structure::CreatedNode;
    use crate::error::ApiError;
    use crate::models::CompareResult;
    use async_trait::async_trait;
    use std::cell::{Cell, RefCell};

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

    /// Body(1) -> Engine(2) -> Oil Change(3)
    fn scenario_detail() -> StructureDetail {
        StructureDetail {
            id: 100,
            name: Some("Sedan".into()),
            node_tree: vec![make_node(
                1,
                "Body",
                NodeType::Category,
                1,
                vec![make_node(2, "Engine", NodeType::Group, 1, vec![make_node(3, "Oil Change", NodeType::Usage, 1, vec![])])],
            )],
            ..Default::default()
        }
    }

    fn detail_with_roots(count: i64) -> StructureDetail {
        StructureDetail {
            id: 100,
            node_tree: (1..=count)
                .map(|i| make_node(i, &format!("Root {}", i), NodeType::Category, i as i32, vec![]))
                .collect(),
            ..Default::default()
        }
    }

    /// In-memory backend recording every call
    #[derive(Default)]
    struct FakeApi {
        server: RefCell<StructureDetail>,
        calls: RefCell<Vec<String>>,
        fail_update: Cell<bool>,
        fail_fetch: Cell<bool>,
        added: RefCell<Vec<AddNodeRequest>>,
        moved: RefCell<Vec<MoveNodeRequest>>,
    }

    impl FakeApi {
        fn with(detail: StructureDetail) -> Self {
            Self {
                server: RefCell::new(detail),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl StructureApi for FakeApi {
        async fn fetch_detail(&self, _domain: Domain, id: i64) -> Result<StructureDetail, ApiError> {
            self.calls.borrow_mut().push(format!("fetch_detail {}", id));
            if self.fail_fetch.get() {
                return Err(ApiError::Status(502));
            }
            Ok(self.server.borrow().clone())
        }

        async fn add_node(&self, _domain: Domain, request: &AddNodeRequest) -> Result<CreatedNode, ApiError> {
            self.calls.borrow_mut().push("add_node".into());
            self.added.borrow_mut().push(request.clone());
            Ok(CreatedNode {
                id: Some(50),
                node_name: Some(request.node_name.clone()),
                node_type: Some(request.node_type),
                sort_order: Some(request.sort_order),
                ..Default::default()
            })
        }

        async fn update_node(&self, _domain: Domain, request: &UpdateNodeRequest) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(format!("update_node {}", request.node_id));
            if self.fail_update.get() {
                return Err(ApiError::business("4001", Some("Duplicate code"), None));
            }
            Ok(())
        }

        async fn delete_node(&self, _domain: Domain, node_id: i64) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(format!("delete_node {}", node_id));
            let _ = tree::find_and_remove(&mut self.server.borrow_mut().node_tree, node_id);
            Ok(())
        }

        async fn move_node(&self, _domain: Domain, request: &MoveNodeRequest) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(format!("move_node {}", request.node_id));
            self.moved.borrow_mut().push(request.clone());
            Ok(())
        }

        async fn compare_instances(&self, _a: i64, _b: i64) -> Result<CompareResult, ApiError> {
            Ok(CompareResult::default())
        }
    }

    #[test]
    fn test_usage_parent_rejected_without_network() {
        let api = FakeApi::with(scenario_detail());
        let editor = NodeEditor::new(&api, "管理员");
        let session = DetailSession::new(Domain::Instance, scenario_detail());

        for id in [Some(3), None, Some(999)] {
            let err = editor.draft_child(&session, id, Some(NodeType::Usage)).unwrap_err();
            assert!(err.is_validation());
        }
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_draft_child_of_engine_is_usage_sorted_second() {
        let api = FakeApi::with(scenario_detail());
        let editor = NodeEditor::new(&api, "管理员");
        let session = DetailSession::new(Domain::Template, scenario_detail());

        let draft = editor.draft_child(&session, Some(2), Some(NodeType::Group)).unwrap();
        assert_eq!(
            draft,
            NewNodeDraft {
                parent_id: Some(2),
                node_type: NodeType::Usage,
                sort_order: 2
            }
        );

        let root = editor.draft_root(&session);
        assert_eq!(root.node_type, NodeType::Category);
        assert_eq!(root.sort_order, 2);

        let under_untyped = editor.draft_child(&session, Some(1), None).unwrap();
        assert_eq!(under_untyped.node_type, NodeType::Group);
        assert_eq!(under_untyped.sort_order, 2);
    }

    #[test]
    fn test_draft_child_of_stale_parent_is_not_found() {
        let api = FakeApi::default();
        let editor = NodeEditor::new(&api, "管理员");
        let session = DetailSession::new(Domain::Template, scenario_detail());
        assert_eq!(
            editor.draft_child(&session, Some(77), Some(NodeType::Category)),
            Err(EditorError::NotFound(77))
        );
    }

    #[tokio::test]
    async fn test_submit_add_sends_request_and_refreshes() {
        let api = FakeApi::with(scenario_detail());
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Instance, scenario_detail());

        let draft = editor.draft_child(&session, Some(2), Some(NodeType::Group)).unwrap();
        let form = NodeForm {
            node_name: "Filter".into(),
            node_name_en: String::new(),
            ref_id: Some(40),
        };
        let (node, reconciled) = editor.submit_add(&mut session, draft, &form).await.unwrap();

        assert_eq!(node.id, Some(50));
        assert_eq!(node.node_type, Some(NodeType::Usage));
        assert_eq!(reconciled, Reconciled::Fresh);
        assert_eq!(api.calls(), vec!["add_node".to_string(), "fetch_detail 100".to_string()]);

        let sent = &api.added.borrow()[0];
        assert_eq!(sent.usage_id, Some(40));
        assert_eq!(sent.group_id, None);
        assert_eq!(sent.parent_node_id, Some(2));
        assert_eq!(sent.instance_id, Some(100));
        assert_eq!(sent.sort_order, 2);
    }

    #[tokio::test]
    async fn test_submit_add_keeps_local_node_when_refresh_fails() {
        let api = FakeApi::with(scenario_detail());
        api.fail_fetch.set(true);
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Template, scenario_detail());

        let draft = editor.draft_root(&session);
        let form = NodeForm {
            node_name: "Chassis".into(),
            ..Default::default()
        };
        let (_, reconciled) = editor.submit_add(&mut session, draft, &form).await.unwrap();
        assert!(matches!(reconciled, Reconciled::Stale(_)));
        assert_eq!(session.tree().len(), 2);
        assert_eq!(tree::find(session.tree(), 50).unwrap().node_name, "Chassis");
    }

    #[tokio::test]
    async fn test_submit_add_requires_name() {
        let api = FakeApi::with(scenario_detail());
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Template, scenario_detail());
        let draft = editor.draft_root(&session);
        let err = editor
            .submit_add(&mut session, draft, &NodeForm::default())
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rename_applies_locally() {
        let api = FakeApi::with(scenario_detail());
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Template, scenario_detail());

        editor.rename(&mut session, 2, "Powertrain").await.unwrap();
        assert_eq!(tree::find(session.tree(), 2).unwrap().node_name, "Powertrain");
        assert_eq!(api.calls(), vec!["update_node 2".to_string()]);
    }

    #[tokio::test]
    async fn test_rename_reverts_on_failure() {
        let api = FakeApi::with(scenario_detail());
        api.fail_update.set(true);
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Template, scenario_detail());

        let err = editor.rename(&mut session, 2, "Powertrain").await.unwrap_err();
        assert_eq!(err.to_string(), "Duplicate code");
        assert_eq!(tree::find(session.tree(), 2).unwrap().node_name, "Engine");
    }

    #[tokio::test]
    async fn test_rename_rejects_blank_and_stale() {
        let api = FakeApi::with(scenario_detail());
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Template, scenario_detail());

        assert!(editor.rename(&mut session, 2, "   ").await.unwrap_err().is_validation());
        assert!(api.calls().is_empty());
        assert_eq!(
            editor.rename(&mut session, 99, "x").await.unwrap_err(),
            EditorError::NotFound(99)
        );
        assert_eq!(api.calls(), vec!["fetch_detail 100".to_string()]);
    }

    #[tokio::test]
    async fn test_stale_targets_reload_the_tree() {
        let mut server = scenario_detail();
        let _ = tree::append(&mut server.node_tree, None, make_node(77, "Chassis", NodeType::Category, 2, vec![]));
        let api = FakeApi::with(server);
        let editor = NodeEditor::new(&api, "管理员");

        let mut session = DetailSession::new(Domain::Template, scenario_detail());
        let err = editor.move_by(&mut session, 77, MoveDirection::Up).await.unwrap_err();
        assert_eq!(err, EditorError::NotFound(77));
        assert!(tree::find(session.tree(), 77).is_some());

        let mut session = DetailSession::new(Domain::Template, scenario_detail());
        let err = editor.prepare_child(&mut session, Some(77), Some(NodeType::Category)).await.unwrap_err();
        assert_eq!(err, EditorError::NotFound(77));
        assert!(tree::find(session.tree(), 77).is_some());

        assert_eq!(api.calls(), vec!["fetch_detail 100".to_string(), "fetch_detail 100".to_string()]);
        assert!(api.moved.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_prepare_child_skips_reload_when_parent_present() {
        let api = FakeApi::with(scenario_detail());
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Template, scenario_detail());

        let draft = editor.prepare_child(&mut session, Some(2), Some(NodeType::Group)).await.unwrap();
        assert_eq!(draft.node_type, NodeType::Usage);
        let usage = editor.prepare_child(&mut session, Some(3), Some(NodeType::Usage)).await.unwrap_err();
        assert!(usage.is_validation());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_refetches_instead_of_local_removal() {
        let api = FakeApi::with(scenario_detail());
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Instance, scenario_detail());

        let reconciled = editor.delete(&mut session, 3).await.unwrap();
        assert_eq!(reconciled, Reconciled::Fresh);
        assert!(tree::find(session.tree(), 3).is_none());
        assert_eq!(api.calls(), vec!["delete_node 3".to_string(), "fetch_detail 100".to_string()]);
    }

    #[tokio::test]
    async fn test_move_edges_are_noops_for_every_length() {
        for count in [1_i64, 2, 5] {
            let api = FakeApi::with(detail_with_roots(count));
            let editor = NodeEditor::new(&api, "管理员");
            let mut session = DetailSession::new(Domain::Template, detail_with_roots(count));

            let up = editor.move_by(&mut session, 1, MoveDirection::Up).await.unwrap_err();
            assert!(up.is_validation());
            let down = editor.move_by(&mut session, count, MoveDirection::Down).await.unwrap_err();
            assert!(down.is_validation());
            assert!(api.calls().is_empty(), "no call expected for {} siblings", count);
        }
    }

    #[tokio::test]
    async fn test_move_sends_position_based_sort_order() {
        let api = FakeApi::with(detail_with_roots(5));
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Template, detail_with_roots(5));

        let reconciled = editor.move_by(&mut session, 3, MoveDirection::Up).await.unwrap();
        assert_eq!(reconciled, Reconciled::Fresh);
        editor.move_by(&mut session, 3, MoveDirection::Down).await.unwrap();

        let moved = api.moved.borrow();
        assert_eq!(
            moved[0],
            MoveNodeRequest {
                node_id: 3,
                new_parent_id: None,
                sort_order: 2
            }
        );
        assert_eq!(moved[1].sort_order, 4);
    }

    #[tokio::test]
    async fn test_move_child_carries_parent_id() {
        let mut detail = scenario_detail();
        let _ = tree::append(&mut detail.node_tree, Some(2), make_node(4, "Filter", NodeType::Usage, 2, vec![]));
        let api = FakeApi::with(detail.clone());
        let editor = NodeEditor::new(&api, "管理员");
        let mut session = DetailSession::new(Domain::Instance, detail);

        editor.move_by(&mut session, 4, MoveDirection::Up).await.unwrap();
        let moved = api.moved.borrow();
        assert_eq!(moved[0].new_parent_id, Some(2));
        assert_eq!(moved[0].sort_order, 1);
    }
}
