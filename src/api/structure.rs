//! Structure Node Commands
//!
//! Detail fetch and node mutations shared by the template and instance
//! domains. [`StructureApi`] is the seam the node editor and the comparison
//! loader are written against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{q, ApiClient};
use crate::error::ApiError;
use crate::models::{CompareResult, Domain, Node, NodeType, StructureDetail};

// ========================
// Argument Structs
// ========================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNodeRequest {
    pub node_name: String,
    pub node_name_en: Option<String>,
    pub node_type: NodeType,
    pub sort_order: i32,
    pub creator: String,
    pub category_id: Option<i64>,
    pub group_id: Option<i64>,
    pub usage_id: Option<i64>,
    pub parent_node_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<i64>,
}

impl AddNodeRequest {
    /// Build a request with exactly one of the category/group/usage links
    /// populated according to `node_type`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        domain: Domain,
        owner_id: i64,
        parent_node_id: Option<i64>,
        node_type: NodeType,
        node_name: &str,
        node_name_en: &str,
        sort_order: i32,
        ref_id: Option<i64>,
        creator: &str,
    ) -> Self {
        let (category_id, group_id, usage_id) = match node_type {
            NodeType::Category => (ref_id, None, None),
            NodeType::Group => (None, ref_id, None),
            NodeType::Usage => (None, None, ref_id),
        };
        let node_name_en = Some(node_name_en.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let (template_id, instance_id) = match domain {
            Domain::Template => (Some(owner_id), None),
            Domain::Instance => (None, Some(owner_id)),
        };
        Self {
            node_name: node_name.trim().to_string(),
            node_name_en,
            node_type,
            sort_order,
            creator: creator.to_string(),
            category_id,
            group_id,
            usage_id,
            parent_node_id,
            template_id,
            instance_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNodeRequest {
    pub node_id: i64,
    pub node_name: String,
    pub node_name_en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeRequest {
    pub node_id: i64,
    pub new_parent_id: Option<i64>,
    pub sort_order: i32,
}

/// Fields the server returns for a freshly created node
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNode {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub node_name_en: Option<String>,
    #[serde(default)]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl CreatedNode {
    /// Local node for the created entry, falling back to the submitted values
    pub fn into_node(self, request: &AddNodeRequest) -> Node {
        Node {
            id: self.id,
            node_name: self.node_name.unwrap_or_else(|| request.node_name.clone()),
            node_name_en: self.node_name_en.or_else(|| request.node_name_en.clone()),
            node_type: self.node_type.or(Some(request.node_type)),
            sort_order: self.sort_order.or(Some(request.sort_order)),
            children: Vec::new(),
            ..Default::default()
        }
    }
}

// ========================
// Trait
// ========================

#[async_trait(?Send)]
pub trait StructureApi {
    async fn fetch_detail(&self, domain: Domain, id: i64) -> Result<StructureDetail, ApiError>;
    async fn add_node(&self, domain: Domain, request: &AddNodeRequest) -> Result<CreatedNode, ApiError>;
    async fn update_node(&self, domain: Domain, request: &UpdateNodeRequest) -> Result<(), ApiError>;
    async fn delete_node(&self, domain: Domain, node_id: i64) -> Result<(), ApiError>;
    async fn move_node(&self, domain: Domain, request: &MoveNodeRequest) -> Result<(), ApiError>;
    async fn compare_instances(&self, instance_id1: i64, instance_id2: i64) -> Result<CompareResult, ApiError>;
}

fn node_path(domain: Domain, action: &str) -> String {
    format!("/api/v1/structure/{}/{}", domain.segment(), action)
}

#[async_trait(?Send)]
impl StructureApi for ApiClient {
    async fn fetch_detail(&self, domain: Domain, id: i64) -> Result<StructureDetail, ApiError> {
        match domain {
            Domain::Template => {
                self.get(&node_path(domain, "get_template_detail"), &q("templateId", id))
                    .await
            }
            Domain::Instance => {
                self.get(&node_path(domain, "get_instance_detail"), &q("instanceId", id))
                    .await
            }
        }
    }

    async fn add_node(&self, domain: Domain, request: &AddNodeRequest) -> Result<CreatedNode, ApiError> {
        let created: Option<CreatedNode> = self.post_json(&node_path(domain, "add_node"), &[], request).await?;
        Ok(created.unwrap_or_default())
    }

    async fn update_node(&self, domain: Domain, request: &UpdateNodeRequest) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self.post_json(&node_path(domain, "update_node"), &[], request).await?;
        Ok(())
    }

    async fn delete_node(&self, domain: Domain, node_id: i64) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self
            .post_urlencoded(&node_path(domain, "delete_node"), &q("nodeId", node_id))
            .await?;
        Ok(())
    }

    async fn move_node(&self, domain: Domain, request: &MoveNodeRequest) -> Result<(), ApiError> {
        let _: Option<serde_json::Value> = self.post_json(&node_path(domain, "move_node"), &[], request).await?;
        Ok(())
    }

    async fn compare_instances(&self, instance_id1: i64, instance_id2: i64) -> Result<CompareResult, ApiError> {
        let query = [
            ("instanceId1", instance_id1.to_string()),
            ("instanceId2", instance_id2.to_string()),
        ];
        let result: Option<CompareResult> = self
            .post_empty(&node_path(Domain::Instance, "compare_instances"), &query)
            .await?;
        Ok(result.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_request_links_exactly_one_reference() {
        let req = AddNodeRequest::new(Domain::Instance, 7, Some(3), NodeType::Usage, " Oil Change ", "", 2, Some(40), "管理员");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            json!({
                "nodeName": "Oil Change",
                "nodeNameEn": null,
                "nodeType": "USAGE",
                "sortOrder": 2,
                "creator": "管理员",
                "categoryId": null,
                "groupId": null,
                "usageId": 40,
                "parentNodeId": 3,
                "instanceId": 7
            })
        );
    }

    #[test]
    fn test_add_request_for_template_root() {
        let req = AddNodeRequest::new(Domain::Template, 1, None, NodeType::Category, "Body", "Body", 1, Some(9), "ops");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["templateId"], json!(1));
        assert_eq!(body["categoryId"], json!(9));
        assert_eq!(body["parentNodeId"], json!(null));
        assert!(body.get("instanceId").is_none());
    }

    #[test]
    fn test_move_request_shape() {
        let body = serde_json::to_value(MoveNodeRequest {
            node_id: 4,
            new_parent_id: None,
            sort_order: 1,
        })
        .unwrap();
        assert_eq!(body, json!({ "nodeId": 4, "newParentId": null, "sortOrder": 1 }));
    }

    #[test]
    fn test_created_node_falls_back_to_request() {
        let req = AddNodeRequest::new(Domain::Template, 1, Some(2), NodeType::Group, "Engine", "", 3, None, "ops");
        let node = CreatedNode {
            id: Some(11),
            ..Default::default()
        }
        .into_node(&req);
        assert_eq!(node.id, Some(11));
        assert_eq!(node.node_name, "Engine");
        assert_eq!(node.sort_order, Some(3));
        assert!(node.children.is_empty());
    }
}
