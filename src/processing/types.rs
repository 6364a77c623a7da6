//! Core data types and error definitions for the processing pipeline.

use crate::{
    extraction::ExtractionError, feedback::FeedbackClientError,
    summarization::SummarizationClientError,
    translation::{TranslationClientError, UnsupportedLanguage},
};
use std::fmt;
use thiserror::Error;

/// Errors produced while turning raw text into chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    /// The requested maximum chunk length was zero.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// The overlap would consume the whole chunk.
    #[error("chunk overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidOverlap {
        /// Requested maximum chunk length.
        chunk_size: usize,
        /// Requested overlap.
        overlap: usize,
    },
}

/// Errors emitted by the document and feedback pipelines.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The request itself was unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A language selector was not present in the supported-language table.
    #[error("Invalid input: {0}")]
    UnsupportedLanguage(#[from] UnsupportedLanguage),
    /// The uploaded bytes could not be turned into text.
    #[error("Failed to extract document text: {0}")]
    Extraction(#[from] ExtractionError),
    /// Chunking step failed to segment the document.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Batching was configured with a zero batch size.
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,
    /// The language model failed to produce a summary.
    #[error("Failed to summarize: {0}")]
    Summarization(#[from] SummarizationClientError),
    /// The translation provider failed.
    #[error("Failed to translate summary: {0}")]
    Translation(#[from] TranslationClientError),
    /// The feedback service failed.
    #[error("Upstream service error: {0}")]
    Upstream(#[from] FeedbackClientError),
    /// An external call exceeded its time budget.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// External call that was in flight when the budget ran out.
        operation: &'static str,
        /// Budget that was exceeded.
        seconds: u64,
    },
}

/// Steps of the document pipeline, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Raw bytes accepted.
    Received,
    /// Full text obtained from the extractor.
    Extracted,
    /// Text split into chunks.
    Chunked,
    /// Combined summary assembled.
    Summarized,
    /// Summary translated.
    Translated,
    /// Result handed back to the caller.
    Done,
    /// A step failed; nothing is returned.
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Extracted => "extracted",
            Self::Chunked => "chunked",
            Self::Summarized => "summarized",
            Self::Translated => "translated",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Raw language selectors supplied with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSelection {
    /// Language the document is written in (or `auto`).
    pub source: String,
    /// Language the summary should be translated into.
    pub target: String,
}

/// Result of a completed document pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Translated summary text.
    pub result: String,
    /// Number of chunks the document was split into.
    pub chunk_count: usize,
    /// Number of summarization calls made.
    pub batch_count: usize,
}
