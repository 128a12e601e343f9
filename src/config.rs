//! Console Configuration
//!
//! Values fixed at process start. Overridable at build time through
//! `CONSOLE_API_BASE` and `CONSOLE_OPERATOR`.

pub const DEFAULT_API_BASE: &str = "http://localhost:8091";
pub const DEFAULT_OPERATOR: &str = "管理员";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// REST base URL without trailing slash
    pub api_base: String,
    /// Sent as `creator` on every create request
    pub operator: String,
    /// Lines kept by the in-memory log
    pub log_capacity: usize,
}

impl AppConfig {
    pub fn new(api_base: &str, operator: &str) -> Self {
        Self {
            api_base: api_base.trim().trim_end_matches('/').to_string(),
            operator: operator.to_string(),
            log_capacity: rolling_logger::DEFAULT_CAPACITY,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            option_env!("CONSOLE_API_BASE").unwrap_or(DEFAULT_API_BASE),
            option_env!("CONSOLE_OPERATOR").unwrap_or(DEFAULT_OPERATOR),
        )
    }

    /// Join an endpoint path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_OPERATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_normalized() {
        let config = AppConfig::new("http://api.local:9000/", "ops");
        assert_eq!(config.api_base, "http://api.local:9000");
        assert_eq!(
            config.url("/api/v1/part/list_parts"),
            "http://api.local:9000/api/v1/part/list_parts"
        );
    }

    #[test]
    fn test_default_points_at_local_backend() {
        let config = AppConfig::default();
        assert_eq!(config.url("api/v1/config/get_categories"), "http://localhost:8091/api/v1/config/get_categories");
        assert_eq!(config.operator, DEFAULT_OPERATOR);
    }
}
