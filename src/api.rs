//! HTTP surface for pdfdigest.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /upload-pdf` – Multipart upload of a PDF (`file`, declared as `application/pdf`) plus
//!   `source_lang` and `target_lang` form fields. Returns `{ "message", "result" }` where `result`
//!   is the summary translated into the target language.
//! - `GET /get-volunteer-information/:volunteer_id` – Summarize the feedback recorded for a
//!   volunteer; the summary is returned as plain text.
//! - `GET /metrics` – Observe pipeline counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.

use crate::metrics::MetricsSnapshot;
use crate::processing::{LanguageSelection, PipelineApi, ProcessingError};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::Instrument;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Build the HTTP router exposing the pipeline.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: PipelineApi + 'static,
{
    Router::new()
        .route("/upload-pdf", post(upload_pdf::<S>))
        .route(
            "/get-volunteer-information/:volunteer_id",
            get(volunteer_information::<S>),
        )
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(service)
}

/// Success response for `POST /upload-pdf`.
#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    result: String,
}

/// Fields collected from the upload form.
#[derive(Default)]
struct UploadForm {
    document: Option<Vec<u8>>,
    source_lang: Option<String>,
    target_lang: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ProcessingError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "file" => {
                    let content_type = field.content_type().unwrap_or_default().to_string();
                    if !content_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
                        return Err(ProcessingError::InvalidInput(format!(
                            "file must be uploaded as {PDF_CONTENT_TYPE}, got '{content_type}'"
                        )));
                    }
                    let bytes = field.bytes().await.map_err(invalid_multipart)?;
                    form.document = Some(bytes.to_vec());
                }
                "source_lang" => form.source_lang = Some(field.text().await.map_err(invalid_multipart)?),
                "target_lang" => form.target_lang = Some(field.text().await.map_err(invalid_multipart)?),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    fn into_parts(self) -> Result<(Vec<u8>, LanguageSelection), ProcessingError> {
        let document = self.document.ok_or_else(|| missing("file"))?;
        let source = self.source_lang.ok_or_else(|| missing("source_lang"))?;
        let target = self.target_lang.ok_or_else(|| missing("target_lang"))?;
        Ok((document, LanguageSelection { source, target }))
    }
}

fn missing(field: &str) -> ProcessingError {
    ProcessingError::InvalidInput(format!("missing form field '{field}'"))
}

fn invalid_multipart(error: MultipartError) -> ProcessingError {
    ProcessingError::InvalidInput(format!("malformed multipart body: {error}"))
}

/// Summarize and translate an uploaded PDF.
async fn upload_pdf<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError>
where
    S: PipelineApi,
{
    let span = tracing::info_span!("upload_pdf", request_id = %uuid::Uuid::new_v4());
    async move {
        let (document, languages) = UploadForm::read(multipart).await?.into_parts()?;
        let outcome = service.summarize_document(document, languages).await?;
        tracing::info!(
            chunks = outcome.chunk_count,
            batches = outcome.batch_count,
            "Upload request completed"
        );
        Ok(Json(UploadResponse {
            message: "PDF processed successfully",
            result: outcome.result,
        }))
    }
    .instrument(span)
    .await
}

/// Summarize the feedback recorded for one volunteer.
async fn volunteer_information<S>(
    State(service): State<Arc<S>>,
    Path(volunteer_id): Path<String>,
) -> Result<String, AppError>
where
    S: PipelineApi,
{
    let span = tracing::info_span!(
        "volunteer_information",
        request_id = %uuid::Uuid::new_v4(),
        volunteer_id = %volunteer_id
    );
    let summary = service
        .summarize_volunteer_feedback(&volunteer_id)
        .instrument(span)
        .await?;
    Ok(summary)
}

/// Return the pipeline counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: PipelineApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload_pdf",
                method: "POST",
                path: "/upload-pdf",
                description: "Multipart upload: `file` (application/pdf), `source_lang`, `target_lang`. Extracts, chunks and summarizes the PDF, then translates the summary. Response returns { \"message\": string, \"result\": string }.",
                request_example: Some(json!({
                    "file": "<report.pdf>",
                    "source_lang": "english",
                    "target_lang": "french"
                })),
            },
            CommandDescriptor {
                name: "volunteer_information",
                method: "GET",
                path: "/get-volunteer-information/:volunteer_id",
                description: "Summarize the feedback recorded for a volunteer. Responds with plain text.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return pipeline counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

struct AppError(ProcessingError);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0 {
            ProcessingError::InvalidInput(_) | ProcessingError::UnsupportedLanguage(_) => {
                StatusCode::BAD_REQUEST
            }
            ProcessingError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProcessingError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self(inner)
    }
}
