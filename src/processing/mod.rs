//! Document pipeline: chunking, batched summarization, translation, and feedback summaries.

mod batch;
pub mod chunking;
mod prompts;
mod service;
mod trace;
pub mod types;

pub use batch::{BatchSummary, batch_count, summarize_batches};
pub use service::{
    CHUNK_OVERLAP, CHUNK_SEPARATORS, CHUNK_SIZE, PipelineApi, PipelineService, PipelineSettings,
    SUMMARY_BATCH_SIZE,
};
pub use types::{
    ChunkingError, LanguageSelection, PipelineOutcome, PipelineStage, ProcessingError,
};
