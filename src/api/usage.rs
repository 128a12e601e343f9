//! Usage Commands
//!
//! Usages live under the `/ap1/v1/usage/` prefix on the server; their
//! related-part links under `/api/v1/usage_part/`.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::{q, ApiClient};
use crate::combination::UsageForm;
use crate::error::ApiError;
use crate::models::{UsageDetail, UsagePart, UsageSummary, STATUS_DISABLED};

/// Status filter of the usage list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UsageStatusFilter {
    #[default]
    Enabled,
    All,
    /// Fetched as `All`, filtered locally
    Disabled,
}

impl UsageStatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            UsageStatusFilter::Enabled => "ENABLED",
            UsageStatusFilter::All => "ALL",
            UsageStatusFilter::Disabled => "DISABLED",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "ALL" => UsageStatusFilter::All,
            "DISABLED" => UsageStatusFilter::Disabled,
            _ => UsageStatusFilter::Enabled,
        }
    }

    /// Narrow a fetched list to what this filter shows
    pub fn apply(self, usages: Vec<UsageSummary>) -> Vec<UsageSummary> {
        match self {
            UsageStatusFilter::Disabled => usages
                .into_iter()
                .filter(|u| u.status.as_deref() == Some(STATUS_DISABLED))
                .collect(),
            _ => usages,
        }
    }
}

/// Exploded-view image picked in the usage dialog
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnbindArgs {
    usage_id: i64,
    part_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UsageIdArgs {
    usage_id: i64,
}

type Unit = Option<serde_json::Value>;

fn usage_form(form: &UsageForm, attachment: Option<Attachment>) -> Result<Form, ApiError> {
    let mut multipart = Form::new();
    for (key, value) in form.form_fields() {
        multipart = multipart.text(key, value);
    }
    if let Some(file) = attachment {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = file.mime.filter(|m| !m.is_empty()) {
            part = part.mime_str(&mime).map_err(ApiError::from)?;
        }
        multipart = multipart.part("explodedViewFile", part);
    }
    Ok(multipart)
}

impl ApiClient {
    pub async fn query_usages(
        &self,
        group_node_id: i64,
        filter: UsageStatusFilter,
    ) -> Result<Vec<UsageSummary>, ApiError> {
        let path = match filter {
            UsageStatusFilter::Enabled => "/ap1/v1/usage/query_usages",
            UsageStatusFilter::All | UsageStatusFilter::Disabled => "/ap1/v1/usage/query_all_usages",
        };
        let list: Option<Vec<UsageSummary>> = self.get(path, &q("groupNodeId", group_node_id)).await?;
        Ok(filter.apply(list.unwrap_or_default()))
    }

    pub async fn get_usage_detail(&self, usage_id: i64) -> Result<UsageDetail, ApiError> {
        let detail: Option<UsageDetail> = self
            .get("/ap1/v1/usage/get_usage_detail", &q("usageId", usage_id))
            .await?;
        Ok(detail.unwrap_or_default())
    }

    /// Create or update depending on whether the form carries a usage id
    pub async fn save_usage(&self, form: &UsageForm, attachment: Option<Attachment>) -> Result<(), ApiError> {
        let path = if form.is_edit() {
            "/ap1/v1/usage/update_usage"
        } else {
            "/ap1/v1/usage/create_usage"
        };
        let multipart = usage_form(form, attachment)?;
        let _: Unit = self.post_multipart(path, multipart).await?;
        Ok(())
    }

    pub async fn delete_usage(&self, usage_id: i64) -> Result<(), ApiError> {
        let _: Unit = self.post_empty("/ap1/v1/usage/delete_usage", &q("usageId", usage_id)).await?;
        Ok(())
    }

    pub async fn restore_usage(&self, usage_id: i64) -> Result<(), ApiError> {
        let _: Unit = self.post_empty("/ap1/v1/usage/restore_usage", &q("usageId", usage_id)).await?;
        Ok(())
    }

    pub async fn delete_combination(&self, combination_id: i64) -> Result<(), ApiError> {
        let _: Unit = self
            .post_empty("/ap1/v1/usage/delete_combination", &q("combinationId", combination_id))
            .await?;
        Ok(())
    }

    // ========================
    // Related Parts
    // ========================

    pub async fn list_usage_parts(&self, usage_id: i64) -> Result<Vec<UsagePart>, ApiError> {
        let list: Option<Vec<UsagePart>> = self.get("/api/v1/usage_part/list", &q("usageId", usage_id)).await?;
        Ok(list.unwrap_or_default())
    }

    pub async fn unbind_usage_part(&self, usage_id: i64, part_id: i64) -> Result<(), ApiError> {
        let _: Unit = self
            .post_json("/api/v1/usage_part/unbind", &[], &UnbindArgs { usage_id, part_id })
            .await?;
        Ok(())
    }

    pub async fn clear_usage_parts(&self, usage_id: i64) -> Result<(), ApiError> {
        let _: Unit = self
            .post_json("/api/v1/usage_part/clear", &[], &UsageIdArgs { usage_id })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(id: i64, status: &str) -> UsageSummary {
        UsageSummary {
            id,
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_disabled_filter_is_local() {
        let fetched = vec![usage(1, "ENABLED"), usage(2, "DISABLED"), usage(3, "DISABLED")];
        let ids: Vec<i64> = UsageStatusFilter::Disabled
            .apply(fetched.clone())
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(UsageStatusFilter::All.apply(fetched).len(), 3);
    }

    #[test]
    fn test_filter_parse_defaults_to_enabled() {
        assert_eq!(UsageStatusFilter::parse("ALL"), UsageStatusFilter::All);
        assert_eq!(UsageStatusFilter::parse("DISABLED"), UsageStatusFilter::Disabled);
        assert_eq!(UsageStatusFilter::parse(""), UsageStatusFilter::Enabled);
    }
}
