//! Config Commands
//!
//! Configuration categories and their items.

use serde::Serialize;

use super::{q, ApiClient};
use crate::error::ApiError;
use crate::models::{ConfigCategory, ConfigItem};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryForm {
    #[serde(rename = "categoryId", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub category_code: String,
    pub category_name: String,
    pub sort_order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigItemForm {
    pub category_id: i64,
    pub item_code: String,
    pub item_name: String,
    pub item_value: String,
    pub creator: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategorySearch<'a> {
    category_code: Option<&'a str>,
    name_keyword: &'a str,
}

type Unit = Option<serde_json::Value>;

impl ApiClient {
    pub async fn get_categories(&self) -> Result<Vec<ConfigCategory>, ApiError> {
        let list: Option<Vec<ConfigCategory>> = self.get("/api/v1/config/get_categories", &[]).await?;
        Ok(list.unwrap_or_default())
    }

    /// Keyword search; an empty keyword lists everything
    pub async fn search_categories(&self, keyword: &str) -> Result<Vec<ConfigCategory>, ApiError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.get_categories().await;
        }
        let body = CategorySearch {
            category_code: None,
            name_keyword: keyword,
        };
        let list: Option<Vec<ConfigCategory>> = self.post_json("/api/v1/config/search_categories", &[], &body).await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn create_category(&self, form: &CategoryForm) -> Result<(), ApiError> {
        let form = CategoryForm {
            id: None,
            creator: Some(form.creator.clone().unwrap_or_else(|| self.operator().to_string())),
            ..form.clone()
        };
        let _: Unit = self.post_json("/api/v1/config/create_category", &[], &form).await?;
        Ok(())
    }

    pub async fn update_category(&self, form: &CategoryForm) -> Result<(), ApiError> {
        let form = CategoryForm {
            creator: None,
            ..form.clone()
        };
        let _: Unit = self.post_json("/api/v1/config/update_category", &[], &form).await?;
        Ok(())
    }

    pub async fn delete_category(&self, category_id: i64) -> Result<(), ApiError> {
        let _: Unit = self
            .post_empty("/api/v1/config/delete_category", &q("categoryId", category_id))
            .await?;
        Ok(())
    }

    pub async fn get_config_items(&self, category_id: i64) -> Result<Vec<ConfigItem>, ApiError> {
        let list: Option<Vec<ConfigItem>> = self
            .get("/api/v1/config/get_config_items", &q("categoryId", category_id))
            .await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn search_config_items(&self, keyword: &str) -> Result<Vec<ConfigItem>, ApiError> {
        let list: Option<Vec<ConfigItem>> = self
            .get("/api/v1/config/search_config_items", &q("keyword", keyword.trim()))
            .await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn create_config_item(&self, form: &ConfigItemForm) -> Result<(), ApiError> {
        let _: Unit = self.post_json("/api/v1/config/create_config_item", &[], form).await?;
        Ok(())
    }

    pub async fn delete_config_item(&self, item_id: i64) -> Result<(), ApiError> {
        let _: Unit = self
            .post_empty("/api/v1/config/delete_config_item", &q("itemId", item_id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_form_update_shape() {
        let form = CategoryForm {
            id: Some(3),
            category_code: "ENGINE".into(),
            category_name: "发动机".into(),
            sort_order: 2,
            creator: None,
        };
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({ "categoryId": 3, "categoryCode": "ENGINE", "categoryName": "发动机", "sortOrder": 2 })
        );
    }
}
