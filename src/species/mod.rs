//! External species tier.
//!
//! A single lookup against the third-party species service, plus the pure
//! mapping from its vocabulary into [`Plant`](crate::models::Plant).

mod mapping;

pub use mapping::*;

use async_trait::async_trait;
use tracing::instrument;

use crate::errors::AppError;
use crate::models::{SpeciesRecord, SpeciesSearchResponse};

/// Source of species candidates for a free-text query.
#[async_trait]
pub trait SpeciesClient: Send + Sync {
    /// Return the first candidate for `query`, or `None` when the service has no match.
    async fn lookup(&self, query: &str) -> Result<Option<SpeciesRecord>, AppError>;
}

/// Species client speaking HTTP to the configured endpoint.
pub struct HttpSpeciesClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSpeciesClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl SpeciesClient for HttpSpeciesClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn lookup(&self, query: &str) -> Result<Option<SpeciesRecord>, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AppError::External(
                "Species API key is not configured".to_string(),
            ));
        };

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("key", api_key), ("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::External(format!(
                "Species API returned status {}",
                status
            )));
        }

        let body: SpeciesSearchResponse = response.json().await?;
        tracing::debug!("Species API returned {} candidates", body.data.len());

        Ok(body.data.into_iter().next())
    }
}
