//! Template Commands

use serde::Serialize;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{PageList, TemplateSummary};

/// Page size used by every list query in the console
pub const LIST_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateQuery {
    pub template_code: Option<String>,
    pub status: Option<String>,
    pub name_keyword: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PagedTemplateQuery<'a> {
    #[serde(flatten)]
    filter: &'a TemplateQuery,
    page_no: u32,
    page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    pub template_code: String,
    pub template_name: String,
    pub template_desc: String,
    pub version: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTemplate<'a> {
    template_code: &'a str,
    template_name: &'a str,
    template_desc: &'a str,
    version: &'a str,
    creator: &'a str,
    nodes: Vec<serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTemplate<'a> {
    template_id: i64,
    template_name: &'a str,
    template_desc: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewVersion<'a> {
    template_id: i64,
    new_version: &'a str,
    creator: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateIdArgs {
    template_id: i64,
}

type Unit = Option<serde_json::Value>;

/// Blank filter fields are sent as null
pub fn none_if_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ApiClient {
    pub async fn query_templates(&self, filter: &TemplateQuery) -> Result<Vec<TemplateSummary>, ApiError> {
        let body = PagedTemplateQuery {
            filter,
            page_no: 1,
            page_size: LIST_PAGE_SIZE,
        };
        let page: PageList<TemplateSummary> = self
            .post_json("/api/v1/structure/template/query_templates", &[], &body)
            .await?;
        Ok(page.0)
    }

    pub async fn create_template(&self, form: &TemplateForm) -> Result<(), ApiError> {
        let body = CreateTemplate {
            template_code: form.template_code.trim(),
            template_name: form.template_name.trim(),
            template_desc: &form.template_desc,
            version: form.version.trim(),
            creator: self.operator(),
            nodes: Vec::new(),
        };
        let _: Unit = self.post_json("/api/v1/structure/template/create", &[], &body).await?;
        Ok(())
    }

    pub async fn update_template(&self, template_id: i64, form: &TemplateForm) -> Result<(), ApiError> {
        let body = UpdateTemplate {
            template_id,
            template_name: form.template_name.trim(),
            template_desc: &form.template_desc,
        };
        let _: Unit = self
            .post_json("/api/v1/structure/template/update_template", &[], &body)
            .await?;
        Ok(())
    }

    pub async fn create_template_version(&self, template_id: i64, new_version: &str) -> Result<(), ApiError> {
        let body = NewVersion {
            template_id,
            new_version: new_version.trim(),
            creator: self.operator(),
        };
        let _: Unit = self
            .post_json("/api/v1/structure/template/create_new_version", &[], &body)
            .await?;
        Ok(())
    }

    /// `enable_template` or `disable_template`
    pub async fn set_template_enabled(&self, template_id: i64, enabled: bool) -> Result<(), ApiError> {
        let path = if enabled {
            "/api/v1/structure/template/enable_template"
        } else {
            "/api/v1/structure/template/disable_template"
        };
        let _: Unit = self.post_json(path, &[], &TemplateIdArgs { template_id }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_body_is_flattened_with_paging() {
        let filter = TemplateQuery {
            template_code: none_if_blank("  "),
            status: Some("ENABLED".into()),
            name_keyword: none_if_blank(" 轿车 "),
        };
        let body = serde_json::to_value(PagedTemplateQuery {
            filter: &filter,
            page_no: 1,
            page_size: LIST_PAGE_SIZE,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "templateCode": null,
                "status": "ENABLED",
                "nameKeyword": "轿车",
                "pageNo": 1,
                "pageSize": 1000
            })
        );
    }
}
