//! Usage Form and Configuration Combinations
//!
//! Editing state for the usage create/edit dialog. A combination is a named
//! set of configuration item ids; the dialog also keeps, per combination,
//! the items already fetched for each category so the picker can label the
//! selected ids without another request.

use std::collections::BTreeMap;

use crate::error::EditorError;
use crate::models::{ConfigItem, UsageDetail};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Combination {
    pub combination_name: String,
    /// 1-based position, renumbered on removal
    pub sort_order: i32,
    /// Selection order is display order
    pub config_item_ids: Vec<i64>,
    /// Category tab currently shown in the picker
    pub active_category: Option<i64>,
    /// Items fetched per category, picker cache only
    pub category_items: BTreeMap<i64, Vec<ConfigItem>>,
}

impl Combination {
    pub fn new(sort_order: i32, active_category: Option<i64>) -> Self {
        Self {
            sort_order,
            active_category,
            ..Default::default()
        }
    }

    pub fn has_category(&self, category_id: i64) -> bool {
        self.category_items.contains_key(&category_id)
    }

    pub fn cache_items(&mut self, category_id: i64, items: Vec<ConfigItem>) {
        self.category_items.insert(category_id, items);
    }

    /// Add or remove an item from the selection
    pub fn toggle_item(&mut self, item_id: i64) {
        if let Some(pos) = self.config_item_ids.iter().position(|id| *id == item_id) {
            self.config_item_ids.remove(pos);
        } else {
            self.config_item_ids.push(item_id);
        }
    }

    pub fn remove_item(&mut self, item_id: i64) {
        self.config_item_ids.retain(|id| *id != item_id);
    }

    pub fn is_selected(&self, item_id: i64) -> bool {
        self.config_item_ids.contains(&item_id)
    }

    /// `"{itemName} ({itemValue})"`, or `配置项 {id}` when the item was never fetched
    pub fn item_label(&self, item_id: i64) -> String {
        self.category_items
            .values()
            .flatten()
            .find(|item| item.id == item_id)
            .map(ConfigItem::label)
            .unwrap_or_else(|| format!("配置项 {}", item_id))
    }
}

/// Ordered combinations of one usage form
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CombinationList {
    items: Vec<Combination>,
}

impl CombinationList {
    pub fn items(&self) -> &[Combination] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Combination> {
        self.items.get_mut(index)
    }

    /// Append an empty combination sorted last
    pub fn add(&mut self, first_category: Option<i64>) -> &mut Combination {
        let sort_order = self.items.len() as i32 + 1;
        self.items.push(Combination::new(sort_order, first_category));
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    /// Remove by position and renumber the rest from 1
    pub fn remove(&mut self, index: usize) -> Option<Combination> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        for (idx, combination) in self.items.iter_mut().enumerate() {
            combination.sort_order = idx as i32 + 1;
        }
        Some(removed)
    }

    /// Every combination needs a name and at least one item
    pub fn validate(&self) -> Result<(), EditorError> {
        for (idx, combination) in self.items.iter().enumerate() {
            let n = idx + 1;
            if combination.combination_name.trim().is_empty() {
                return Err(EditorError::Validation(format!("请输入第{}个配置组合的名称", n)));
            }
            if combination.config_item_ids.is_empty() {
                return Err(EditorError::Validation(format!("第{}个配置组合必须选择至少一个配置项", n)));
            }
        }
        Ok(())
    }

    /// Seed from a usage detail, with fetched items pre-cached by category
    pub fn from_detail(detail: &UsageDetail) -> Self {
        let mut items: Vec<Combination> = detail
            .combinations
            .iter()
            .map(|c| {
                let mut combination = Combination {
                    combination_name: c.combination_name.clone(),
                    sort_order: c.sort_order.unwrap_or(0),
                    config_item_ids: c.config_items.iter().map(|item| item.id).collect(),
                    ..Default::default()
                };
                for item in &c.config_items {
                    if let Some(category_id) = item.category_id {
                        combination
                            .category_items
                            .entry(category_id)
                            .or_default()
                            .push(item.clone());
                    }
                }
                combination.active_category = combination.category_items.keys().next().copied();
                combination
            })
            .collect();
        items.sort_by_key(|c| c.sort_order);
        for (idx, combination) in items.iter_mut().enumerate() {
            combination.sort_order = idx as i32 + 1;
        }
        Self { items }
    }

    /// Multipart fields `combinations[i].*`
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        for (i, combination) in self.items.iter().enumerate() {
            fields.push((
                format!("combinations[{}].combinationName", i),
                combination.combination_name.trim().to_string(),
            ));
            fields.push((format!("combinations[{}].sortOrder", i), combination.sort_order.to_string()));
            for (j, item_id) in combination.config_item_ids.iter().enumerate() {
                fields.push((format!("combinations[{}].configItemIds[{}]", i, j), item_id.to_string()));
            }
        }
        fields
    }
}

// ========================
// Usage Form
// ========================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsageForm {
    /// Set when editing an existing usage
    pub usage_id: Option<i64>,
    pub usage_name: String,
    pub instance_id: Option<i64>,
    pub parent_group_node_id: Option<i64>,
    pub group_id: Option<i64>,
    pub sort_order: i32,
    pub creator: String,
    pub combinations: CombinationList,
}

impl UsageForm {
    pub fn new_create(creator: &str) -> Self {
        Self {
            sort_order: 1,
            creator: creator.to_string(),
            ..Default::default()
        }
    }

    pub fn is_edit(&self) -> bool {
        self.usage_id.is_some()
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        let missing = |msg: &str| Err(EditorError::Validation(msg.to_string()));
        if self.usage_name.trim().is_empty() {
            return missing("请输入用法名称");
        }
        if !self.is_edit() {
            if self.instance_id.is_none() {
                return missing("请输入实例ID");
            }
            if self.parent_group_node_id.is_none() {
                return missing("请输入父组节点ID");
            }
            if self.group_id.is_none() {
                return missing("请输入系统分组ID");
            }
            if self.creator.trim().is_empty() {
                return missing("请输入创建人");
            }
        }
        self.combinations.validate()
    }

    /// Text fields of the multipart body, in submission order
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("usageName".to_string(), self.usage_name.trim().to_string())];
        if let Some(group_id) = self.group_id {
            fields.push(("groupId".into(), group_id.to_string()));
        }
        match self.usage_id {
            Some(usage_id) => fields.push(("usageId".into(), usage_id.to_string())),
            None => {
                if let Some(instance_id) = self.instance_id {
                    fields.push(("instanceId".into(), instance_id.to_string()));
                }
                if let Some(parent) = self.parent_group_node_id {
                    fields.push(("parentGroupNodeId".into(), parent.to_string()));
                }
                fields.push(("sortOrder".into(), self.sort_order.max(1).to_string()));
                fields.push(("creator".into(), self.creator.trim().to_string()));
            }
        }
        fields.extend(self.combinations.form_fields());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CombinationDetail;

    fn make_item(id: i64, category_id: i64, name: &str, value: &str) -> ConfigItem {
        ConfigItem {
            id,
            category_id: Some(category_id),
            item_name: name.to_string(),
            item_value: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn filled(list: &mut CombinationList, name: &str, ids: &[i64]) {
        let combination = list.add(Some(1));
        combination.combination_name = name.to_string();
        combination.config_item_ids = ids.to_vec();
    }

    #[test]
    fn test_remove_renumbers_sort_order() {
        let mut list = CombinationList::default();
        filled(&mut list, "A", &[1]);
        filled(&mut list, "B", &[2]);
        filled(&mut list, "C", &[3]);

        let removed = list.remove(0).unwrap();
        assert_eq!(removed.combination_name, "A");
        let orders: Vec<i32> = list.items().iter().map(|c| c.sort_order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(list.items()[0].combination_name, "B");
        assert!(list.remove(5).is_none());
    }

    #[test]
    fn test_validate_reports_position() {
        let mut list = CombinationList::default();
        filled(&mut list, "A", &[1]);
        list.add(None);
        assert_eq!(
            list.validate().unwrap_err().to_string(),
            "请输入第2个配置组合的名称"
        );

        list.get_mut(1).unwrap().combination_name = "B".into();
        assert_eq!(
            list.validate().unwrap_err().to_string(),
            "第2个配置组合必须选择至少一个配置项"
        );

        list.get_mut(1).unwrap().toggle_item(9);
        assert!(list.validate().is_ok());
    }

    #[test]
    fn test_item_label_uses_cache_or_fallback() {
        let mut combination = Combination::new(1, Some(10));
        combination.cache_items(10, vec![make_item(7, 10, "颜色", "红")]);
        assert_eq!(combination.item_label(7), "颜色 (红)");
        assert_eq!(combination.item_label(8), "配置项 8");
    }

    #[test]
    fn test_toggle_keeps_selection_order() {
        let mut combination = Combination::new(1, None);
        combination.toggle_item(3);
        combination.toggle_item(1);
        combination.toggle_item(2);
        combination.toggle_item(1);
        assert_eq!(combination.config_item_ids, vec![3, 2]);
    }

    #[test]
    fn test_create_form_fields() {
        let mut form = UsageForm::new_create("管理员");
        form.usage_name = "换机油".into();
        form.instance_id = Some(5);
        form.parent_group_node_id = Some(12);
        form.group_id = Some(3);
        filled(&mut form.combinations, "标准", &[7, 8]);
        assert!(form.validate().is_ok());

        let fields = form.form_fields();
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "usageName",
                "groupId",
                "instanceId",
                "parentGroupNodeId",
                "sortOrder",
                "creator",
                "combinations[0].combinationName",
                "combinations[0].sortOrder",
                "combinations[0].configItemIds[0]",
                "combinations[0].configItemIds[1]",
            ]
        );
        assert_eq!(fields[9].1, "8");
    }

    #[test]
    fn test_edit_form_skips_create_only_fields() {
        let form = UsageForm {
            usage_id: Some(42),
            usage_name: "换刹车片".into(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());
        let keys: Vec<String> = form.form_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["usageName".to_string(), "usageId".to_string()]);
    }

    #[test]
    fn test_create_form_requires_links() {
        let mut form = UsageForm::new_create("管理员");
        form.usage_name = "x".into();
        assert_eq!(form.validate().unwrap_err().to_string(), "请输入实例ID");
    }

    #[test]
    fn test_from_detail_caches_items_by_category() {
        let detail = UsageDetail {
            combinations: vec![
                CombinationDetail {
                    id: 2,
                    combination_name: "高配".into(),
                    sort_order: Some(5),
                    config_items: vec![make_item(3, 20, "轮毂", "18寸")],
                },
                CombinationDetail {
                    id: 1,
                    combination_name: "低配".into(),
                    sort_order: Some(1),
                    config_items: vec![make_item(1, 10, "颜色", "白"), make_item(2, 20, "轮毂", "16寸")],
                },
            ],
        };
        let list = CombinationList::from_detail(&detail);
        assert_eq!(list.items()[0].combination_name, "低配");
        assert_eq!(list.items()[1].sort_order, 2);
        assert_eq!(list.items()[0].config_item_ids, vec![1, 2]);
        assert_eq!(list.items()[0].item_label(2), "轮毂 (16寸)");
        assert_eq!(list.items()[0].active_category, Some(10));
    }
}
