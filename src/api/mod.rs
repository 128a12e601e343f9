//! REST API Client
//!
//! Frontend bindings to the backend REST API, organized by domain.
//! Every call goes through [`ApiClient::send`], which checks the HTTP status
//! and unwraps the `code == "0000"` envelope.

mod envelope;

pub mod config;
pub mod instance;
pub mod part;
pub mod structure;
pub mod template;
pub mod usage;
pub mod workhour;

pub use envelope::{Envelope, SUCCESS_CODE};
pub use structure::{AddNodeRequest, MoveNodeRequest, StructureApi, UpdateNodeRequest};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::ApiError;

/// Query string pairs
pub type Query<'a> = &'a [(&'a str, String)];

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: AppConfig,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    /// Name recorded as `creator` on create requests
    pub fn operator(&self) -> &str {
        &self.config.operator
    }

    // ========================
    // Request Helpers
    // ========================

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> Result<T, ApiError> {
        let url = self.config.url(path);
        let builder = self.http.get(&url).query(query);
        self.send("GET", &url, builder).await
    }

    pub async fn post_json<B, T>(&self, path: &str, query: Query<'_>, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.url(path);
        let builder = self.http.post(&url).query(query).json(body);
        self.send("POST", &url, builder).await
    }

    /// POST with parameters only in the query string
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> Result<T, ApiError> {
        let url = self.config.url(path);
        let builder = self
            .http
            .post(&url)
            .query(query)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.send("POST", &url, builder).await
    }

    /// POST an `application/x-www-form-urlencoded` body
    pub async fn post_urlencoded<T: DeserializeOwned>(&self, path: &str, fields: Query<'_>) -> Result<T, ApiError> {
        let url = self.config.url(path);
        let builder = self.http.post(&url).form(fields);
        self.send("POST", &url, builder).await
    }

    /// POST a multipart form. The boundary header is left to the runtime.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let url = self.config.url(path);
        let builder = self.http.post(&url).multipart(form);
        self.send("POST", &url, builder).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        tracing::debug!(method, url, "api request");

        let response = builder.send().await.map_err(|e| {
            tracing::error!(method, url, error = %e, "transport failure");
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(method, url, status = status.as_u16(), "http failure");
            return Err(ApiError::Status(status.as_u16()));
        }

        let envelope: Envelope = response.json().await.map_err(|e| {
            tracing::error!(method, url, error = %e, "unreadable response body");
            ApiError::Decode(e.to_string())
        })?;
        envelope.into_result()
    }
}

/// Single-entry query helper
pub(crate) fn q(key: &'static str, value: impl ToString) -> [(&'static str, String); 1] {
    [(key, value.to_string())]
}
