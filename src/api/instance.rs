//! Instance Commands

use serde::Serialize;

use super::template::LIST_PAGE_SIZE;
use super::{q, ApiClient};
use crate::error::ApiError;
use crate::models::{InstanceSummary, PageList};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceQuery {
    pub instance_code: Option<String>,
    pub name_keyword: Option<String>,
    pub status: Option<String>,
    pub series_id: Option<i64>,
    pub model_id: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PagedInstanceQuery<'a> {
    #[serde(flatten)]
    filter: &'a InstanceQuery,
    page_no: u32,
    page_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceForm {
    pub instance_code: String,
    pub instance_name: String,
    pub instance_desc: String,
    pub series_id: Option<i64>,
    pub model_id: Option<i64>,
    pub instance_version: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateInstance<'a> {
    template_id: i64,
    instance_code: &'a str,
    instance_name: &'a str,
    instance_desc: &'a str,
    series_id: Option<i64>,
    model_id: Option<i64>,
    version: &'a str,
    creator: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateInstance<'a> {
    instance_id: i64,
    instance_name: &'a str,
    instance_desc: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewVersion<'a> {
    instance_id: i64,
    new_version: &'a str,
    instance_desc: Option<&'a str>,
    creator: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Publish {
    instance_id: i64,
    effective_time: String,
}

type Unit = Option<serde_json::Value>;

impl ApiClient {
    pub async fn query_instances(&self, filter: &InstanceQuery) -> Result<Vec<InstanceSummary>, ApiError> {
        let body = PagedInstanceQuery {
            filter,
            page_no: 1,
            page_size: LIST_PAGE_SIZE,
        };
        let page: PageList<InstanceSummary> = self
            .post_json("/api/v1/structure/instance/query_instances", &[], &body)
            .await?;
        Ok(page.0)
    }

    pub async fn create_instance(&self, template_id: i64, form: &InstanceForm) -> Result<(), ApiError> {
        let body = CreateInstance {
            template_id,
            instance_code: form.instance_code.trim(),
            instance_name: form.instance_name.trim(),
            instance_desc: &form.instance_desc,
            series_id: form.series_id,
            model_id: form.model_id,
            version: form.instance_version.trim(),
            creator: self.operator(),
        };
        let _: Unit = self
            .post_json("/api/v1/structure/instance/create_instance", &[], &body)
            .await?;
        Ok(())
    }

    pub async fn update_instance(&self, instance_id: i64, form: &InstanceForm) -> Result<(), ApiError> {
        let body = UpdateInstance {
            instance_id,
            instance_name: form.instance_name.trim(),
            instance_desc: &form.instance_desc,
        };
        let _: Unit = self
            .post_json("/api/v1/structure/instance/update_instance", &[], &body)
            .await?;
        Ok(())
    }

    pub async fn create_instance_version(
        &self,
        instance_id: i64,
        new_version: &str,
        instance_desc: Option<&str>,
    ) -> Result<(), ApiError> {
        let body = NewVersion {
            instance_id,
            new_version: new_version.trim(),
            instance_desc,
            creator: self.operator(),
        };
        let _: Unit = self
            .post_json("/api/v1/structure/instance/create_new_version", &[], &body)
            .await?;
        Ok(())
    }

    /// Publish effective immediately
    pub async fn publish_instance(&self, instance_id: i64) -> Result<(), ApiError> {
        let body = Publish {
            instance_id,
            effective_time: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        };
        let _: Unit = self
            .post_json("/api/v1/structure/instance/publish_instance", &[], &body)
            .await?;
        Ok(())
    }

    pub async fn unpublish_instance(&self, instance_id: i64) -> Result<(), ApiError> {
        let _: Unit = self
            .post_empty("/api/v1/structure/instance/unpublish_instance", &q("instanceId", instance_id))
            .await?;
        Ok(())
    }

    /// `enable_instance` or `disable_instance`
    pub async fn set_instance_enabled(&self, instance_id: i64, enabled: bool) -> Result<(), ApiError> {
        let path = if enabled {
            "/api/v1/structure/instance/enable_instance"
        } else {
            "/api/v1/structure/instance/disable_instance"
        };
        let _: Unit = self.post_empty(path, &q("instanceId", instance_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_body_keeps_series_and_model_null() {
        let filter = InstanceQuery {
            instance_code: Some("INS-1".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(PagedInstanceQuery {
            filter: &filter,
            page_no: 1,
            page_size: LIST_PAGE_SIZE,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "instanceCode": "INS-1",
                "nameKeyword": null,
                "status": null,
                "seriesId": null,
                "modelId": null,
                "pageNo": 1,
                "pageSize": 1000
            })
        );
    }
}
