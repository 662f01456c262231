//! Remote question source
//!
//! The fetcher talks to the source through the [`QuestionSource`] trait so the
//! HTTP client can be replaced by an in-memory fake in tests.

use async_trait::async_trait;

use crate::config::{ApiConfig, QueryFilters};
use crate::error::{Error, Result};
use crate::types::ApiResponse;

/// One page of questions from the remote source
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Request `amount` questions (1..=50)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the source answers with a non-success
    /// status, or [`Error::Network`] when it cannot be reached or its body is
    /// not a valid response. A non-zero `response_code` is *not* an error at
    /// this layer.
    async fn fetch_batch(&self, amount: u32) -> Result<ApiResponse>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// [`QuestionSource`] speaking HTTP to an Open Trivia DB compatible endpoint
#[derive(Debug, Clone)]
pub struct HttpQuestionSource {
    http_client: reqwest::Client,
    base_url: String,
    filters: QueryFilters,
}

impl HttpQuestionSource {
    /// Create a source for `api`, forwarding `filters` with every request
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(api: &ApiConfig, filters: &QueryFilters) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(api.user_agent.clone());
        if let Some(timeout) = api.request_timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: api.base_url.clone(),
            filters: filters.clone(),
        })
    }

    /// Endpoint this source requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn fetch_batch(&self, amount: u32) -> Result<ApiResponse> {
        tracing::debug!(url = %self.base_url, amount, "Requesting questions");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("amount", amount.to_string())])
            .query(&self.filters.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                url = %self.base_url,
                status = status.as_u16(),
                "Question source returned non-success status"
            );
            return Err(Error::Transport {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<ApiResponse>().await?)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
