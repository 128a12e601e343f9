//! Part Commands

use serde::Serialize;

use super::{q, ApiClient};
use crate::error::ApiError;
use crate::models::{Part, PartDetail};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartForm {
    pub id: Option<i64>,
    pub part_code: String,
    pub part_name: String,
    pub remark: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePart<'a> {
    part_code: &'a str,
    part_name: &'a str,
    creator: &'a str,
    remark: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePart<'a> {
    id: i64,
    part_name: &'a str,
    remark: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PartIdArgs {
    part_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnbindHourArgs {
    part_id: i64,
    hour_id: i64,
}

type Unit = Option<serde_json::Value>;

impl ApiClient {
    pub async fn list_parts(&self) -> Result<Vec<Part>, ApiError> {
        let list: Option<Vec<Part>> = self.get("/api/v1/part/list_parts", &[]).await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn get_part_detail(&self, part_id: i64) -> Result<PartDetail, ApiError> {
        let detail: Option<PartDetail> = self.get("/api/v1/part/get_part_detail", &q("partId", part_id)).await?;
        Ok(detail.unwrap_or_default())
    }

    /// Create when the form has no id, update otherwise
    pub async fn save_part(&self, form: &PartForm) -> Result<(), ApiError> {
        let _: Unit = match form.id {
            Some(id) => {
                let body = UpdatePart {
                    id,
                    part_name: form.part_name.trim(),
                    remark: &form.remark,
                };
                self.post_json("/api/v1/part/update_part", &[], &body).await?
            }
            None => {
                let body = CreatePart {
                    part_code: form.part_code.trim(),
                    part_name: form.part_name.trim(),
                    creator: self.operator(),
                    remark: &form.remark,
                };
                self.post_json("/api/v1/part/create_part", &[], &body).await?
            }
        };
        Ok(())
    }

    /// `enable_part` or `disable_part`
    pub async fn set_part_enabled(&self, part_id: i64, enabled: bool) -> Result<(), ApiError> {
        let path = if enabled {
            "/api/v1/part/enable_part"
        } else {
            "/api/v1/part/disable_part"
        };
        let _: Unit = self.post_json(path, &[], &PartIdArgs { part_id }).await?;
        Ok(())
    }

    pub async fn delete_part(&self, part_id: i64) -> Result<(), ApiError> {
        let _: Unit = self
            .post_json("/api/v1/part/delete_part", &[], &PartIdArgs { part_id })
            .await?;
        Ok(())
    }

    pub async fn unbind_hour(&self, part_id: i64, hour_id: i64) -> Result<(), ApiError> {
        let _: Unit = self
            .post_json("/api/v1/part/unbind_hour", &[], &UnbindHourArgs { part_id, hour_id })
            .await?;
        Ok(())
    }
}
