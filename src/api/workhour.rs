//! Work Hour Commands
//!
//! Main work hours form the top level; sub work hours hang off a main one
//! through `parentId` and carry a step order.

use serde::Serialize;

use super::{q, ApiClient};
use crate::error::ApiError;
use crate::models::WorkHour;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkHourForm {
    #[serde(skip)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub code: String,
    pub description: String,
    pub standard_hours: f64,
    #[serde(rename = "type")]
    pub hour_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_order: Option<i32>,
    pub creator: String,
}

impl WorkHourForm {
    pub fn new_main(creator: &str) -> Self {
        Self {
            id: None,
            parent_id: None,
            code: String::new(),
            description: String::new(),
            standard_hours: 1.0,
            hour_type: "MAIN".into(),
            step_order: None,
            creator: creator.to_string(),
        }
    }

    pub fn new_sub(parent_id: i64, creator: &str) -> Self {
        Self {
            parent_id: Some(parent_id),
            hour_type: "SUB".into(),
            step_order: Some(1),
            ..Self::new_main(creator)
        }
    }

    pub fn from_existing(hour: &WorkHour) -> Self {
        Self {
            id: Some(hour.id),
            parent_id: hour.parent_id,
            code: hour.code.clone(),
            description: hour.description.clone().unwrap_or_default(),
            standard_hours: hour.standard_hours.unwrap_or(0.0),
            hour_type: hour.hour_type.clone().unwrap_or_default(),
            step_order: hour.step_order,
            creator: hour.creator.clone().unwrap_or_default(),
        }
    }

    pub fn is_sub(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateWorkHour<'a> {
    work_hour_id: i64,
    description: &'a str,
    standard_hours: f64,
    step_order: Option<i32>,
}

type Unit = Option<serde_json::Value>;

impl ApiClient {
    pub async fn query_main_work_hours(&self) -> Result<Vec<WorkHour>, ApiError> {
        let list: Option<Vec<WorkHour>> = self.get("/api/v1/workhour/query_main", &[]).await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn query_sub_work_hours(&self, parent_id: i64) -> Result<Vec<WorkHour>, ApiError> {
        let list: Option<Vec<WorkHour>> = self
            .get("/api/v1/workhour/query_sub", &q("parentId", parent_id))
            .await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn get_work_hour_detail(&self, work_hour_id: i64) -> Result<Option<WorkHour>, ApiError> {
        self.get("/api/v1/workhour/detail", &q("workHourId", work_hour_id)).await
    }

    /// Create main/sub, or update an existing entry
    pub async fn save_work_hour(&self, form: &WorkHourForm) -> Result<(), ApiError> {
        let _: Unit = match form.id {
            Some(work_hour_id) => {
                let body = UpdateWorkHour {
                    work_hour_id,
                    description: &form.description,
                    standard_hours: form.standard_hours,
                    step_order: if form.is_sub() { form.step_order } else { None },
                };
                self.post_json("/api/v1/workhour/update", &[], &body).await?
            }
            None if form.is_sub() => self.post_json("/api/v1/workhour/create_sub", &[], form).await?,
            None => self.post_json("/api/v1/workhour/create_main", &[], form).await?,
        };
        Ok(())
    }

    pub async fn set_work_hour_enabled(&self, work_hour_id: i64, enabled: bool) -> Result<(), ApiError> {
        let path = if enabled {
            "/api/v1/workhour/enable"
        } else {
            "/api/v1/workhour/disable"
        };
        let _: Unit = self.post_empty(path, &q("workHourId", work_hour_id)).await?;
        Ok(())
    }

    pub async fn delete_work_hour(&self, work_hour_id: i64) -> Result<(), ApiError> {
        let _: Unit = self
            .post_empty("/api/v1/workhour/delete", &q("workHourId", work_hour_id))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sub_form_body() {
        let mut form = WorkHourForm::new_sub(8, "管理员");
        form.code = "WH-8-1".into();
        form.description = "拆卸".into();
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({
                "parentId": 8,
                "code": "WH-8-1",
                "description": "拆卸",
                "standardHours": 1.0,
                "type": "SUB",
                "stepOrder": 1,
                "creator": "管理员"
            })
        );
    }

    #[test]
    fn test_main_form_omits_parent_and_step() {
        let body = serde_json::to_value(WorkHourForm::new_main("ops")).unwrap();
        assert!(body.get("parentId").is_none());
        assert!(body.get("stepOrder").is_none());
        assert_eq!(body["type"], json!("MAIN"));
    }
}
