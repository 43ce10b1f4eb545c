//! Pexels API Client
//!
//! Thin typed wrapper over the three endpoints the bot uses. Requests carry
//! the raw API key in the `Authorization` header; there is no retry.

mod types;

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

pub use types::{Photo, PhotoPage, PhotoSrc};

/// Errors from the Pexels API.
#[derive(Error, Debug)]
pub enum PexelsError {
    /// Transport failure, timeout, or unparsable body.
    #[error("Pexels request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success HTTP status.
    #[error("Pexels returned {status} for {endpoint}")]
    Status {
        /// Endpoint path that failed.
        endpoint: String,
        /// Returned status.
        status: StatusCode,
    },
    /// Photo detail had no image URLs.
    #[error("Photo {0} has no image source")]
    MissingSource(u64),
}

/// HTTP client for the Pexels API.
#[derive(Debug, Clone)]
pub struct PexelsClient {
    http: reqwest::Client,
    base_url: String,
}

impl PexelsClient {
    /// Create a client for `base_url` (e.g. `https://api.pexels.com`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PexelsError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pexels-bot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, base_url))
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// `GET /v1/photos/{id}?per_page={per_page}`
    #[instrument(skip(self, token))]
    pub async fn photo(&self, token: &str, id: u64, per_page: u32) -> Result<Photo, PexelsError> {
        let endpoint = format!("/v1/photos/{id}");
        self.get_json(token, &endpoint, &[("per_page", per_page.to_string())])
            .await
    }

    /// `GET /v1/curated?per_page={per_page}`
    #[instrument(skip(self, token))]
    pub async fn curated(&self, token: &str, per_page: u32) -> Result<PhotoPage, PexelsError> {
        self.get_json(token, "/v1/curated", &[("per_page", per_page.to_string())])
            .await
    }

    /// `GET /v1/search?query={query}&per_page={per_page}`
    #[instrument(skip(self, token))]
    pub async fn search(
        &self,
        token: &str,
        query: &str,
        per_page: u32,
    ) -> Result<PhotoPage, PexelsError> {
        self.get_json(
            token,
            "/v1/search",
            &[("query", query.to_string()), ("per_page", per_page.to_string())],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, PexelsError> {
        let response = self
            .http
            .get(format!("{}{endpoint}", self.base_url))
            .header(AUTHORIZATION, token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PexelsError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        debug!(endpoint, %status, "Pexels request succeeded");
        Ok(response.json::<T>().await?)
    }
}
