//! Client for the collaborator service that stores volunteer feedback.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while fetching feedback from the collaborator service.
#[derive(Debug, Error)]
pub enum FeedbackClientError {
    /// The service could not be reached or timed out.
    #[error("Feedback service unavailable: {0}")]
    Unavailable(String),
    /// The service answered with a non-success status.
    #[error("Feedback service returned {status}: {body}")]
    Status {
        /// HTTP status returned by the service.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },
    /// The response body was not a list of feedback records.
    #[error("Malformed feedback response: {0}")]
    InvalidResponse(String),
}

/// A single feedback entry about a volunteer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    /// Numeric rating, when the service provides one.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Free-text comment.
    #[serde(default, alias = "feedback", alias = "text")]
    pub comment: Option<String>,
    /// Timestamp of the feedback as reported by the service.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Any other fields, passed through to the prompt.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeedbackRecord {
    /// Render the record as a single prompt line.
    pub(crate) fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(created_at) = self.created_at.as_deref() {
            parts.push(format!("[{created_at}]"));
        }
        if let Some(rating) = self.rating {
            parts.push(format!("rating {rating}"));
        }
        if let Some(comment) = self.comment.as_deref().map(str::trim) {
            if !comment.is_empty() {
                parts.push(comment.replace('\n', " "));
            }
        }
        if !self.extra.is_empty() {
            parts.push(Value::Object(self.extra.clone()).to_string());
        }
        parts.join(" ")
    }
}

/// Interface implemented by feedback sources.
#[async_trait]
pub trait FeedbackClient: Send + Sync {
    /// Fetch every feedback record stored for `volunteer_id`.
    async fn fetch_feedback(
        &self,
        volunteer_id: &str,
    ) -> Result<Vec<FeedbackRecord>, FeedbackClientError>;
}

/// Build the production feedback client from configuration.
pub fn get_feedback_client(config: &Config) -> Result<HttpFeedbackClient, FeedbackClientError> {
    HttpFeedbackClient::new(
        config.feedback_service_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
}

/// HTTP client for the feedback service.
pub struct HttpFeedbackClient {
    http: Client,
    base_url: String,
}

impl HttpFeedbackClient {
    /// Create a client targeting `base_url`.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, FeedbackClientError> {
        let http = Client::builder()
            .user_agent("pdfdigest/feedback")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                FeedbackClientError::Unavailable(format!("failed to build HTTP client: {error}"))
            })?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, volunteer_id: &str) -> String {
        format!(
            "{}/feedback/volunteer/{volunteer_id}",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl FeedbackClient for HttpFeedbackClient {
    async fn fetch_feedback(
        &self,
        volunteer_id: &str,
    ) -> Result<Vec<FeedbackRecord>, FeedbackClientError> {
        let response = self
            .http
            .get(self.endpoint(volunteer_id))
            .send()
            .await
            .map_err(|error| {
                FeedbackClientError::Unavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(volunteer_id, "No feedback stored for volunteer");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedbackClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|error| {
            FeedbackClientError::InvalidResponse(format!("failed to decode feedback list: {error}"))
        })
    }
}
