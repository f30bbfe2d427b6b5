//! Upload collaborator boundary
//!
//! The reconciliation core hands a finished payload across this seam and
//! logs the returned import summary; authentication, retries, and backoff
//! live on the collaborator's side of the boundary.

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::models::{ImportSummary, ValueSetPayload};

/// Environment variable holding the backend API token
const TOKEN_ENV: &str = "HMIS_API_TOKEN";

/// Submission seam to the reporting backend
#[async_trait]
pub trait ValueSetApi: Send + Sync {
    async fn post_value_set(&self, payload: &ValueSetPayload) -> Result<ImportSummary>;
}

/// HTTP implementation against the backend's value-set endpoint
pub struct HttpValueSetApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpValueSetApi {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Build a client from config, reading the token from the environment
    pub fn from_env(base_url: &str) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .with_context(|| format!("{} is not set; cannot authenticate uploads", TOKEN_ENV))?;
        Ok(Self::new(base_url, &token))
    }

    fn endpoint_url(&self) -> String {
        format!("{}/api/dataValueSets", self.base_url)
    }
}

#[async_trait]
impl ValueSetApi for HttpValueSetApi {
    async fn post_value_set(&self, payload: &ValueSetPayload) -> Result<ImportSummary> {
        let url = self.endpoint_url();
        log::debug!(
            "posting value set: {} values to {}",
            payload.data_values.len(),
            url
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("ApiToken {}", self.token))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach value-set endpoint: {}", url))?;

        let response = response
            .error_for_status()
            .context("Value-set submission rejected by backend")?;

        let summary: ImportSummary = response
            .json()
            .await
            .context("Failed to decode import summary")?;

        Ok(summary)
    }
}
