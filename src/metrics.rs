use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline activity.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_processed: AtomicU64,
    chunks_processed: AtomicU64,
    batches_summarized: AtomicU64,
    feedback_summaries: AtomicU64,
    failures: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document that made it through the whole pipeline.
    pub fn record_document(&self, chunk_count: u64, batch_count: u64) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        self.chunks_processed
            .fetch_add(chunk_count, Ordering::Relaxed);
        self.batches_summarized
            .fetch_add(batch_count, Ordering::Relaxed);
    }

    /// Record a completed volunteer feedback summary.
    pub fn record_feedback_summary(&self) {
        self.feedback_summaries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that ended in an error.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            chunks_processed: self.chunks_processed.load(Ordering::Relaxed),
            batches_summarized: self.batches_summarized.load(Ordering::Relaxed),
            feedback_summaries: self.feedback_summaries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents summarized and translated since startup.
    pub documents_processed: u64,
    /// Total chunks produced across all processed documents.
    pub chunks_processed: u64,
    /// Total summarization batches sent to the language model.
    pub batches_summarized: u64,
    /// Volunteer feedback summaries produced since startup.
    pub feedback_summaries: u64,
    /// Requests that failed at any stage.
    pub failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_chunks_and_batches() {
        let metrics = PipelineMetrics::new();
        metrics.record_document(12, 2);
        metrics.record_document(3, 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_processed, 2);
        assert_eq!(snapshot.chunks_processed, 15);
        assert_eq!(snapshot.batches_summarized, 3);
    }

    #[test]
    fn failures_and_feedback_are_counted_separately() {
        let metrics = PipelineMetrics::new();
        metrics.record_failure();
        metrics.record_feedback_summary();
        metrics.record_feedback_summary();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.feedback_summaries, 2);
        assert_eq!(snapshot.documents_processed, 0);
    }
}
