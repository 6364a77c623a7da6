//! Pipeline service coordinating extraction, chunking, summarization, and translation.

use crate::{
    config::{Config, get_config},
    extraction::{PdfTextExtractor, TextExtractor},
    feedback::{FeedbackClient, get_feedback_client},
    metrics::{MetricsSnapshot, PipelineMetrics},
    processing::{
        batch::summarize_batches,
        chunking::{normalize_newlines, split},
        prompts::build_feedback_prompt,
        trace::write_summary_trace,
        types::{LanguageSelection, PipelineOutcome, PipelineStage, ProcessingError},
    },
    summarization::{SummarizationClient, get_summarization_client},
    translation::{TranslationClient, get_translation_client, languages},
};
use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Maximum chunk length, in characters.
pub const CHUNK_SIZE: usize = 500;
/// Characters of the previous chunk repeated at the start of the next one.
pub const CHUNK_OVERLAP: usize = 50;
/// Split points, highest priority first: paragraph break, line break, space.
pub const CHUNK_SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];
/// Chunks summarized per language model call.
pub const SUMMARY_BATCH_SIZE: usize = 10;

const MAX_VOLUNTEER_ID_LEN: usize = 128;
const NO_FEEDBACK_MESSAGE: &str = "No feedback has been recorded for this volunteer yet.";

/// Per-process knobs for the pipeline that do not vary between requests.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Where the pre-translation summary is written; `None` disables the trace.
    pub trace_path: Option<PathBuf>,
    /// Upper bound for each external call.
    pub call_timeout: Duration,
    /// Chunks per summarization call.
    pub batch_size: usize,
}

impl PipelineSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            trace_path: Some(config.summary_trace_path.clone()),
            call_timeout: Duration::from_secs(config.request_timeout_secs),
            batch_size: SUMMARY_BATCH_SIZE,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            trace_path: None,
            call_timeout: Duration::from_secs(120),
            batch_size: SUMMARY_BATCH_SIZE,
        }
    }
}

/// Runs the document pipeline and the volunteer feedback summary.
///
/// The service owns long-lived handles to every external collaborator so that concurrent
/// requests share one HTTP client per provider. Construct it once near process start and share
/// it through an `Arc`; tests inject fakes through [`PipelineService::with_components`].
pub struct PipelineService {
    extractor: Arc<dyn TextExtractor>,
    summarizer: Arc<dyn SummarizationClient>,
    translator: Arc<dyn TranslationClient>,
    feedback: Arc<dyn FeedbackClient>,
    settings: PipelineSettings,
    metrics: Arc<PipelineMetrics>,
}

/// Abstraction over the pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Extract, chunk, summarize, and translate an uploaded PDF.
    async fn summarize_document(
        &self,
        document: Vec<u8>,
        languages: LanguageSelection,
    ) -> Result<PipelineOutcome, ProcessingError>;

    /// Fetch a volunteer's feedback and condense it with the language model.
    async fn summarize_volunteer_feedback(
        &self,
        volunteer_id: &str,
    ) -> Result<String, ProcessingError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PipelineService {
    /// Build the production service from the global configuration.
    pub fn new() -> Result<Self, ProcessingError> {
        Self::from_config(get_config())
    }

    /// Build the production service from an explicit configuration.
    pub fn from_config(config: &Config) -> Result<Self, ProcessingError> {
        tracing::info!(model = %config.gemini_model, "Initializing pipeline clients");
        Ok(Self::with_components(
            Arc::new(PdfTextExtractor::new()),
            Arc::new(get_summarization_client(config)?),
            Arc::new(get_translation_client(config)?),
            Arc::new(get_feedback_client(config)?),
            PipelineSettings::from_config(config),
        ))
    }

    /// Assemble a service from explicit collaborators.
    pub fn with_components(
        extractor: Arc<dyn TextExtractor>,
        summarizer: Arc<dyn SummarizationClient>,
        translator: Arc<dyn TranslationClient>,
        feedback: Arc<dyn FeedbackClient>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor,
            summarizer,
            translator,
            feedback,
            settings,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Extract, chunk, summarize, and translate an uploaded PDF.
    pub async fn summarize_document(
        &self,
        document: Vec<u8>,
        languages: LanguageSelection,
    ) -> Result<PipelineOutcome, ProcessingError> {
        match self.run_document(document, languages).await {
            Ok(outcome) => {
                self.metrics
                    .record_document(outcome.chunk_count as u64, outcome.batch_count as u64);
                Ok(outcome)
            }
            Err(error) => {
                self.metrics.record_failure();
                tracing::warn!(stage = %PipelineStage::Failed, error = %error, "Document pipeline failed");
                Err(error)
            }
        }
    }

    async fn run_document(
        &self,
        document: Vec<u8>,
        selection: LanguageSelection,
    ) -> Result<PipelineOutcome, ProcessingError> {
        let source = languages::resolve_source(&selection.source)?;
        let target = languages::resolve_target(&selection.target)?;
        tracing::info!(
            stage = %PipelineStage::Received,
            bytes = document.len(),
            source = source.code,
            target = target.code,
            "Processing document"
        );

        let text = self
            .bounded("extraction", self.extractor.extract_text(document))
            .await?;
        tracing::debug!(
            stage = %PipelineStage::Extracted,
            chars = text.chars().count(),
            "Extracted text"
        );

        let chunks: Vec<String> = split(&text, CHUNK_SIZE, CHUNK_OVERLAP, &CHUNK_SEPARATORS)?
            .iter()
            .map(|chunk| normalize_newlines(chunk))
            .collect();
        tracing::debug!(stage = %PipelineStage::Chunked, chunks = chunks.len(), "Chunked text");

        let summary = summarize_batches(&chunks, self.settings.batch_size, |prompt| async move {
            self.bounded("summarization", self.summarizer.generate(&prompt))
                .await
        })
        .await?;
        tracing::debug!(
            stage = %PipelineStage::Summarized,
            batches = summary.batch_count,
            chars = summary.combined.chars().count(),
            "Summarized chunks"
        );

        if let Some(path) = self.settings.trace_path.as_deref() {
            write_summary_trace(path, &summary.combined).await;
        }

        let result = self
            .bounded(
                "translation",
                self.translator
                    .translate(&summary.combined, &source, &target),
            )
            .await?;
        tracing::debug!(stage = %PipelineStage::Translated, chars = result.chars().count(), "Translated summary");

        tracing::info!(
            stage = %PipelineStage::Done,
            chunks = chunks.len(),
            batches = summary.batch_count,
            "Document processed"
        );
        Ok(PipelineOutcome {
            result,
            chunk_count: chunks.len(),
            batch_count: summary.batch_count,
        })
    }

    /// Fetch a volunteer's feedback and condense it with the language model.
    pub async fn summarize_volunteer_feedback(
        &self,
        volunteer_id: &str,
    ) -> Result<String, ProcessingError> {
        match self.run_feedback(volunteer_id).await {
            Ok(summary) => {
                self.metrics.record_feedback_summary();
                Ok(summary)
            }
            Err(error) => {
                self.metrics.record_failure();
                tracing::warn!(volunteer_id, error = %error, "Feedback summary failed");
                Err(error)
            }
        }
    }

    async fn run_feedback(&self, volunteer_id: &str) -> Result<String, ProcessingError> {
        validate_volunteer_id(volunteer_id)?;
        let records = self
            .bounded("feedback fetch", self.feedback.fetch_feedback(volunteer_id))
            .await?;
        tracing::info!(volunteer_id, records = records.len(), "Fetched volunteer feedback");

        if records.is_empty() {
            return Ok(NO_FEEDBACK_MESSAGE.to_string());
        }

        let prompt = build_feedback_prompt(volunteer_id, &records);
        self.bounded("summarization", self.summarizer.generate(&prompt))
            .await
    }

    /// Return the current pipeline metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn bounded<T, E>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, E>>,
    ) -> Result<T, ProcessingError>
    where
        E: Into<ProcessingError>,
    {
        match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(ProcessingError::Timeout {
                operation,
                seconds: self.settings.call_timeout.as_secs(),
            }),
        }
    }
}

fn validate_volunteer_id(volunteer_id: &str) -> Result<(), ProcessingError> {
    let valid = !volunteer_id.is_empty()
        && volunteer_id.len() <= MAX_VOLUNTEER_ID_LEN
        && volunteer_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ProcessingError::InvalidInput(format!(
            "volunteer id '{volunteer_id}' must be 1-{MAX_VOLUNTEER_ID_LEN} characters of letters, digits, '-' or '_'"
        )))
    }
}

#[async_trait]
impl PipelineApi for PipelineService {
    async fn summarize_document(
        &self,
        document: Vec<u8>,
        languages: LanguageSelection,
    ) -> Result<PipelineOutcome, ProcessingError> {
        PipelineService::summarize_document(self, document, languages).await
    }

    async fn summarize_volunteer_feedback(
        &self,
        volunteer_id: &str,
    ) -> Result<String, ProcessingError> {
        PipelineService::summarize_volunteer_feedback(self, volunteer_id).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        PipelineService::metrics_snapshot(self)
    }
}
