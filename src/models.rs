//! Frontend Models
//!
//! Data structures matching the backend view objects.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub const STATUS_ENABLED: &str = "ENABLED";
pub const STATUS_DISABLED: &str = "DISABLED";

pub fn is_enabled(status: &Option<String>) -> bool {
    status.as_deref() == Some(STATUS_ENABLED)
}

// ========================
// Structure Trees
// ========================

/// Which structure a tree belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Template,
    Instance,
}

impl Domain {
    /// Path segment under `/api/v1/structure/`
    pub fn segment(self) -> &'static str {
        match self {
            Domain::Template => "template",
            Domain::Instance => "instance",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Domain::Template => "模板",
            Domain::Instance => "实例",
        }
    }
}

/// Node level in the fixed CATEGORY -> GROUP -> USAGE hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Category,
    Group,
    Usage,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Category => "CATEGORY",
            NodeType::Group => "GROUP",
            NodeType::Usage => "USAGE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeType::Category => "系统类别",
            NodeType::Group => "系统分组",
            NodeType::Usage => "用法",
        }
    }

    pub fn child_type(self) -> Option<NodeType> {
        Self::child_of(Some(self))
    }

    /// Type of a child created under a node of type `parent`.
    /// A missing parent type counts as CATEGORY; USAGE is a leaf.
    pub fn child_of(parent: Option<NodeType>) -> Option<NodeType> {
        match parent {
            None | Some(NodeType::Category) => Some(NodeType::Group),
            Some(NodeType::Group) => Some(NodeType::Usage),
            Some(NodeType::Usage) => None,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tree element shared by templates and instances
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// `None` until the server assigns one
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub node_code: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub node_name: String,
    #[serde(default)]
    pub node_name_en: Option<String>,
    #[serde(default)]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub usage_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Node>,
}

impl Node {
    /// Sort order with a missing value counted as 0
    pub fn sort_key(&self) -> i32 {
        self.sort_order.unwrap_or(0)
    }

    pub fn is_leaf_type(&self) -> bool {
        self.node_type == Some(NodeType::Usage)
    }

    pub fn type_str(&self) -> &'static str {
        self.node_type.map(NodeType::as_str).unwrap_or("")
    }
}

/// Detail payload of a template or an instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureDetail {
    pub id: i64,
    #[serde(default, alias = "templateCode", alias = "instanceCode")]
    pub code: Option<String>,
    #[serde(default, alias = "templateName", alias = "instanceName")]
    pub name: Option<String>,
    #[serde(default, alias = "instanceVersion")]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub node_tree: Vec<Node>,
}

// ========================
// Template / Instance Lists
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: i64,
    #[serde(default)]
    pub template_code: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub template_desc: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSummary {
    pub id: i64,
    #[serde(default)]
    pub instance_code: Option<String>,
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub instance_desc: Option<String>,
    #[serde(default)]
    pub series_id: Option<i64>,
    #[serde(default)]
    pub model_id: Option<i64>,
    #[serde(default)]
    pub instance_version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub effective_time: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
}

/// List payload that may be a bare array or wrapped in a page object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageList<T>(pub Vec<T>);

#[derive(Deserialize)]
#[serde(untagged)]
enum PageShape<T> {
    Bare(Vec<T>),
    Templates { templates: Vec<T> },
    Instances { instances: Vec<T> },
    Records { records: Vec<T> },
    List { list: Vec<T> },
    Data { data: Vec<T> },
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PageList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = match Option::<PageShape<T>>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(PageShape::Bare(items))
            | Some(PageShape::Templates { templates: items })
            | Some(PageShape::Instances { instances: items })
            | Some(PageShape::Records { records: items })
            | Some(PageShape::List { list: items })
            | Some(PageShape::Data { data: items }) => items,
        };
        Ok(PageList(items))
    }
}

// ========================
// Comparison
// ========================

/// One entry of a server-side diff set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEntry {
    #[serde(default)]
    pub node_id: Option<i64>,
    #[serde(default)]
    pub node_code: Option<String>,
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub diff_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changed_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub added: Vec<DiffEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub removed: Vec<DiffEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: Vec<DiffEntry>,
    #[serde(default)]
    pub total_added: Option<u32>,
    #[serde(default)]
    pub total_removed: Option<u32>,
    #[serde(default)]
    pub total_modified: Option<u32>,
}

// ========================
// Configuration Taxonomy
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigItem {
    pub id: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub item_code: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_name: String,
    #[serde(default)]
    pub item_value: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
}

impl ConfigItem {
    /// `"{itemName} ({itemValue})"`
    pub fn label(&self) -> String {
        format!("{} ({})", self.item_name, self.item_value.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigCategory {
    pub id: i64,
    #[serde(default)]
    pub category_code: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_name: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ConfigItem>,
}

// ========================
// Usages
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage_name: String,
    #[serde(default)]
    pub exploded_view_img: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub updated_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationDetail {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub combination_name: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config_items: Vec<ConfigItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub combinations: Vec<CombinationDetail>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePart {
    #[serde(default)]
    pub usage_id: Option<i64>,
    pub part_id: i64,
    #[serde(default)]
    pub part_code: Option<String>,
    #[serde(default)]
    pub part_name: Option<String>,
    #[serde(default)]
    pub count: Option<i32>,
}

// ========================
// Parts / Work Hours
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub part_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub part_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
}

impl Part {
    /// Case-insensitive match on code or name, plus optional exact status
    pub fn matches(&self, keyword: &str, status: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        let keyword_ok = keyword.is_empty()
            || self.part_code.to_lowercase().contains(&keyword)
            || self.part_name.to_lowercase().contains(&keyword);
        let status_ok = status.is_empty() || self.status.as_deref() == Some(status);
        keyword_ok && status_ok
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkHour {
    pub id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub standard_hours: Option<f64>,
    #[serde(default, rename = "type")]
    pub hour_type: Option<String>,
    #[serde(default)]
    pub type_description: Option<String>,
    #[serde(default)]
    pub step_order: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_description: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<WorkHour>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkHourTree {
    #[serde(default)]
    pub work_hour_vo: Option<WorkHour>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<WorkHour>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDetail {
    #[serde(default, rename = "partVO")]
    pub part: Option<Part>,
    #[serde(default, rename = "workHourTreeVOList", deserialize_with = "null_as_default")]
    pub work_hours: Vec<WorkHourTree>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_tolerates_nulls() {
        let node: Node = serde_json::from_value(json!({
            "id": 3,
            "nodeName": "Engine",
            "nodeType": "GROUP",
            "sortOrder": null,
            "children": null
        }))
        .unwrap();
        assert_eq!(node.id, Some(3));
        assert_eq!(node.node_type, Some(NodeType::Group));
        assert_eq!(node.sort_key(), 0);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_child_type_rule() {
        assert_eq!(NodeType::child_of(None), Some(NodeType::Group));
        assert_eq!(NodeType::child_of(Some(NodeType::Category)), Some(NodeType::Group));
        assert_eq!(NodeType::child_of(Some(NodeType::Group)), Some(NodeType::Usage));
        assert_eq!(NodeType::child_of(Some(NodeType::Usage)), None);
    }

    #[test]
    fn test_detail_accepts_template_and_instance_names() {
        let template: StructureDetail = serde_json::from_value(json!({
            "id": 1, "templateName": "Sedan", "nodeTree": []
        }))
        .unwrap();
        assert_eq!(template.name.as_deref(), Some("Sedan"));

        let instance: StructureDetail = serde_json::from_value(json!({
            "id": 2, "instanceName": "Sedan 2024", "instanceVersion": "V2", "isPublished": true, "nodeTree": null
        }))
        .unwrap();
        assert_eq!(instance.name.as_deref(), Some("Sedan 2024"));
        assert_eq!(instance.version.as_deref(), Some("V2"));
        assert!(instance.node_tree.is_empty());
    }

    #[test]
    fn test_page_list_shapes() {
        let bare: PageList<TemplateSummary> = serde_json::from_value(json!([{ "id": 1 }])).unwrap();
        assert_eq!(bare.0.len(), 1);

        let wrapped: PageList<TemplateSummary> =
            serde_json::from_value(json!({ "templates": [{ "id": 1 }, { "id": 2 }], "total": 2 })).unwrap();
        assert_eq!(wrapped.0.len(), 2);

        let records: PageList<InstanceSummary> =
            serde_json::from_value(json!({ "records": [{ "id": 5 }] })).unwrap();
        assert_eq!(records.0[0].id, 5);

        let empty: PageList<InstanceSummary> = serde_json::from_value(json!(null)).unwrap();
        assert!(empty.0.is_empty());
    }

    #[test]
    fn test_part_filter() {
        let part = Part {
            id: 1,
            part_code: "P-100".into(),
            part_name: "Oil Filter".into(),
            status: Some(STATUS_ENABLED.into()),
            ..Default::default()
        };
        assert!(part.matches("filter", ""));
        assert!(part.matches("p-1", STATUS_ENABLED));
        assert!(!part.matches("", STATUS_DISABLED));
        assert!(!part.matches("brake", ""));
    }

    #[test]
    fn test_part_detail_shape() {
        let detail: PartDetail = serde_json::from_value(json!({
            "partVO": { "id": 9, "partCode": "P-9", "partName": "Gasket" },
            "workHourTreeVOList": [{ "workHourVO": { "id": 1, "code": "WH-1" }, "children": [] }]
        }))
        .unwrap();
        assert_eq!(detail.part.map(|p| p.id), Some(9));
        assert_eq!(detail.work_hours.len(), 1);
    }
}
