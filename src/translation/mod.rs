//! Translation of the combined summary into the caller's language.

pub mod languages;

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub use languages::{LanguageCode, LanguageRole, UnsupportedLanguage};

/// Errors raised by translation providers.
#[derive(Debug, Error)]
pub enum TranslationClientError {
    /// Provider could not be reached.
    #[error("Translation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider throttled the request.
    #[error("Translation provider rate limited the request")]
    RateLimited,
    /// Provider answered with a non-success status.
    #[error("Translation failed: {0}")]
    ServiceFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed translation response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by translation backends.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    /// Translate `text` from `source` into `destination`.
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        destination: &LanguageCode,
    ) -> Result<String, TranslationClientError>;
}

/// Build the production translation client from configuration.
pub fn get_translation_client(
    config: &Config,
) -> Result<GoogleTranslationClient, TranslationClientError> {
    GoogleTranslationClient::new(
        config.translate_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
}

/// Client for the public Google Translate web endpoint.
pub struct GoogleTranslationClient {
    http: Client,
    base_url: String,
}

impl GoogleTranslationClient {
    /// Create a client targeting `base_url`.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, TranslationClientError> {
        let http = Client::builder()
            .user_agent("pdfdigest/translate")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                TranslationClientError::ProviderUnavailable(format!(
                    "failed to build HTTP client: {error}"
                ))
            })?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self) -> String {
        format!("{}/translate_a/single", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TranslationClient for GoogleTranslationClient {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        destination: &LanguageCode,
    ) -> Result<String, TranslationClientError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        tracing::debug!(
            source = source.code,
            destination = destination.code,
            chars = text.chars().count(),
            "Requesting translation"
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[
                ("client", "gtx"),
                ("sl", source.code),
                ("tl", destination.code),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await
            .map_err(|error| {
                TranslationClientError::ProviderUnavailable(format!(
                    "failed to reach translation endpoint at {}: {error}",
                    self.base_url
                ))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslationClientError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationClientError::ServiceFailed(format!(
                "translation endpoint returned {status}: {body}"
            )));
        }

        let body: Value = response.json().await.map_err(|error| {
            TranslationClientError::InvalidResponse(format!("failed to decode response: {error}"))
        })?;

        join_segments(&body)
    }
}

/// Concatenate the translated segments of a `translate_a/single` response.
///
/// The payload is a positional array whose first element lists `[translated, original, ...]`
/// pairs, one per sentence.
fn join_segments(body: &Value) -> Result<String, TranslationClientError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationClientError::InvalidResponse("missing segment list".into()))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    const ENGLISH: LanguageCode = LanguageCode {
        name: "english",
        code: "en",
    };
    const FRENCH: LanguageCode = LanguageCode {
        name: "french",
        code: "fr",
    };

    fn client_for(server: &MockServer) -> GoogleTranslationClient {
        GoogleTranslationClient::new(server.base_url(), Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn translate_joins_segments_in_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/translate_a/single")
                    .query_param("sl", "en")
                    .query_param("tl", "fr")
                    .query_param("dt", "t");
                then.status(200).json_body(json!([
                    [
                        ["Bonjour. ", "Hello. ", null, null, 10],
                        ["Au revoir.", "Goodbye.", null, null, 10]
                    ],
                    null,
                    "en"
                ]));
            })
            .await;

        let translated = client_for(&server)
            .translate("Hello. Goodbye.", &ENGLISH, &FRENCH)
            .await
            .expect("translation");

        mock.assert_async().await;
        assert_eq!(translated, "Bonjour. Au revoir.");
    }

    #[tokio::test]
    async fn translate_maps_throttling_to_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/translate_a/single");
                then.status(429);
            })
            .await;

        let error = client_for(&server)
            .translate("Hello", &ENGLISH, &FRENCH)
            .await
            .expect_err("throttled");
        assert!(matches!(error, TranslationClientError::RateLimited));
    }

    #[tokio::test]
    async fn translate_reports_server_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/translate_a/single");
                then.status(503).body("unavailable");
            })
            .await;

        let error = client_for(&server)
            .translate("Hello", &ENGLISH, &FRENCH)
            .await
            .expect_err("server error");
        assert!(
            matches!(&error, TranslationClientError::ServiceFailed(message) if message.contains("503"))
        );
    }

    #[tokio::test]
    async fn blank_text_is_returned_without_a_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/translate_a/single");
                then.status(500);
            })
            .await;

        let translated = client_for(&server)
            .translate("  ", &ENGLISH, &FRENCH)
            .await
            .expect("blank passthrough");
        assert_eq!(translated, "  ");
        mock.assert_hits_async(0).await;
    }

    #[test]
    fn join_segments_rejects_unexpected_shapes() {
        let error = join_segments(&json!({"error": "nope"})).expect_err("not an array");
        assert!(matches!(error, TranslationClientError::InvalidResponse(_)));
    }
}
