//! Abstractive summarization backed by the Gemini generative language API.
//!
//! Requests use deterministic decoding (temperature 0) and a plain-text response format. The
//! response is consumed as a server-sent event stream and reassembled into one string before it
//! is handed back to the caller.

use crate::config::Config;
use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const SSE_DATA_PREFIX: &str = "data:";
const SSE_DONE_MARKER: &str = "[DONE]";

/// Errors surfaced while requesting a summary from the language model.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider could not be reached or the transport failed mid-stream.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response (auth, quota, bad request).
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by text generation providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Generate a response for the prompt and return it as a single string.
    async fn generate(&self, prompt: &str) -> Result<String, SummarizationClientError>;
}

/// Build the production summarization client from configuration.
pub fn get_summarization_client(
    config: &Config,
) -> Result<GeminiSummarizationClient, SummarizationClientError> {
    GeminiSummarizationClient::new(
        config.gemini_url.clone(),
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
}

/// Streaming Gemini client.
pub struct GeminiSummarizationClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiSummarizationClient {
    /// Create a client targeting `base_url` with the given credentials and model.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, SummarizationClientError> {
        let http = Client::builder()
            .user_agent("pdfdigest/summary")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to build HTTP client: {error}"
                ))
            })?;
        Ok(Self {
            http,
            base_url,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl SummarizationClient for GeminiSummarizationClient {
    async fn generate(&self, prompt: &str) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "temperature": 0,
                "responseMimeType": "text/plain",
            }
        });

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "Requesting summary"
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Gemini at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        let mut fragments = std::pin::pin!(fragment_stream(response));
        let mut summary = String::new();
        while let Some(fragment) = fragments.next().await {
            summary.push_str(&fragment?);
        }

        Ok(summary)
    }
}

fn fragment_stream(
    response: reqwest::Response,
) -> impl Stream<Item = Result<String, SummarizationClientError>> {
    async_stream::try_stream! {
        let mut lines = SseLineBuffer::default();
        let mut bytes = response.bytes_stream();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "stream interrupted: {error}"
                ))
            })?;
            for line in lines.push(&chunk) {
                if let Some(fragment) = parse_sse_line(&line)? {
                    yield fragment;
                }
            }
        }

        if let Some(line) = lines.finish() {
            if let Some(fragment) = parse_sse_line(&line)? {
                yield fragment;
            }
        }
    }
}

/// Splits a byte stream into complete lines, holding partial lines (and partial UTF-8
/// sequences) until the rest arrives.
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(position) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=position).collect();
            lines.push(String::from_utf8_lossy(&line[..position]).into_owned());
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: String,
}

/// Decode one SSE line into the text it carries, if any.
fn parse_sse_line(line: &str) -> Result<Option<String>, SummarizationClientError> {
    let Some(data) = line.trim_end_matches('\r').strip_prefix(SSE_DATA_PREFIX) else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() || data == SSE_DONE_MARKER {
        return Ok(None);
    }

    let event: StreamEvent = serde_json::from_str(data).map_err(|error| {
        SummarizationClientError::InvalidResponse(format!("failed to decode stream event: {error}"))
    })?;

    if let Some(error) = event.error {
        return Err(SummarizationClientError::GenerationFailed(error.message));
    }

    let text: String = event
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer) -> GeminiSummarizationClient {
        GeminiSummarizationClient::new(
            server.base_url(),
            "test-key".into(),
            "gemini-test".into(),
            Duration::from_secs(5),
        )
        .expect("client")
    }

    fn sse_event(text: &str) -> String {
        format!(
            "data: {}\r\n\r\n",
            json!({ "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }] })
        )
    }

    #[tokio::test]
    async fn gemini_client_reassembles_streamed_fragments() {
        let server = MockServer::start_async().await;
        let body = format!("{}{}{}", sse_event("First "), sse_event("second "), sse_event("third."));
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-test:streamGenerateContent")
                    .query_param("alt", "sse")
                    .header("x-goog-api-key", "test-key")
                    .json_body_partial(r#"{"generationConfig":{"temperature":0,"responseMimeType":"text/plain"}}"#);
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(body);
            })
            .await;

        let summary = client_for(&server)
            .generate("Summarize this")
            .await
            .expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "First second third.");
    }

    #[tokio::test]
    async fn gemini_client_reports_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-test:streamGenerateContent");
                then.status(429).body("quota exhausted");
            })
            .await;

        let error = client_for(&server)
            .generate("Summarize this")
            .await
            .expect_err("error response");

        assert!(
            matches!(&error, SummarizationClientError::GenerationFailed(message) if message.contains("429"))
        );
    }

    #[tokio::test]
    async fn gemini_client_rejects_malformed_events() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-test:streamGenerateContent");
                then.status(200).body("data: {not json}\n\n");
            })
            .await;

        let error = client_for(&server)
            .generate("Summarize this")
            .await
            .expect_err("malformed");

        assert!(matches!(error, SummarizationClientError::InvalidResponse(_)));
    }

    #[test]
    fn line_buffer_holds_partial_lines_across_reads() {
        let mut buffer = SseLineBuffer::default();
        assert!(buffer.push(b"data: {\"a\"").is_empty());
        let lines = buffer.push(b":1}\n\ndata: tail");
        assert_eq!(lines, vec!["data: {\"a\":1}".to_string(), String::new()]);
        assert_eq!(buffer.finish().as_deref(), Some("data: tail"));
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn line_buffer_keeps_split_utf8_sequences_intact() {
        let mut buffer = SseLineBuffer::default();
        let bytes = "data: é\n".as_bytes();
        let split = bytes.len() - 2;
        assert!(buffer.push(&bytes[..split]).is_empty());
        assert_eq!(buffer.push(&bytes[split..]), vec!["data: é".to_string()]);
    }

    #[test]
    fn parse_sse_line_ignores_comments_and_done_marker() {
        assert!(parse_sse_line(": keep-alive").expect("comment").is_none());
        assert!(parse_sse_line("data: [DONE]").expect("done").is_none());
        assert!(parse_sse_line("").expect("blank").is_none());
    }

    #[test]
    fn parse_sse_line_surfaces_provider_errors() {
        let error = parse_sse_line(r#"data: {"error": {"code": 403, "message": "denied"}}"#)
            .expect_err("provider error");
        assert!(matches!(error, SummarizationClientError::GenerationFailed(message) if message == "denied"));
    }
}
