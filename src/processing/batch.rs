//! Batched summarization of document chunks.

use std::future::Future;

use super::{prompts::build_batch_prompt, types::ProcessingError};

/// Combined summary and the number of model calls it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Every batch fragment, each prefixed with a newline, in batch order.
    pub combined: String,
    /// Number of batches summarized.
    pub batch_count: usize,
}

/// Number of batches needed for `chunk_count` chunks.
pub fn batch_count(chunk_count: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    chunk_count.div_ceil(batch_size)
}

/// Summarize `chunks` in consecutive batches of `batch_size`.
///
/// `summarize` is invoked once per batch with the batch prompt, strictly one after another. The
/// first error aborts the run and nothing assembled so far is returned.
pub async fn summarize_batches<F, Fut>(
    chunks: &[String],
    batch_size: usize,
    mut summarize: F,
) -> Result<BatchSummary, ProcessingError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, ProcessingError>>,
{
    if batch_size == 0 {
        return Err(ProcessingError::InvalidBatchSize);
    }

    let mut combined = String::new();
    let mut batches = 0usize;
    for (index, batch) in chunks.chunks(batch_size).enumerate() {
        tracing::debug!(batch = index, chunks = batch.len(), "Summarizing batch");
        let fragment = summarize(build_batch_prompt(batch)).await?;
        combined.push('\n');
        combined.push_str(&fragment);
        batches += 1;
    }

    Ok(BatchSummary {
        combined,
        batch_count: batches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarization::SummarizationClientError;
    use std::sync::{Arc, Mutex};

    fn chunks(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("chunk-{i}")).collect()
    }

    #[tokio::test]
    async fn fragments_are_concatenated_in_batch_order() {
        let replies = Arc::new(Mutex::new(vec!["S2".to_string(), "S1".to_string()]));
        let summary = summarize_batches(&chunks(4), 2, |_prompt| {
            let replies = replies.clone();
            async move { Ok(replies.lock().expect("lock").pop().expect("reply")) }
        })
        .await
        .expect("summary");

        assert_eq!(summary.combined, "\nS1\nS2");
        assert_eq!(summary.batch_count, 2);
    }

    #[tokio::test]
    async fn batches_partition_chunks_without_gaps_or_duplicates() {
        for (count, size) in [(0, 3), (1, 3), (3, 3), (7, 3), (10, 1), (5, 10)] {
            let prompts = Arc::new(Mutex::new(Vec::new()));
            let input = chunks(count);
            let summary = summarize_batches(&input, size, |prompt| {
                let prompts = prompts.clone();
                async move {
                    prompts.lock().expect("lock").push(prompt);
                    Ok(String::new())
                }
            })
            .await
            .expect("summary");

            assert_eq!(summary.batch_count, batch_count(count, size));
            let prompts = prompts.lock().expect("lock");
            assert_eq!(prompts.len(), count.div_ceil(size));

            let seen: Vec<String> = prompts
                .iter()
                .flat_map(|prompt| {
                    prompt
                        .lines()
                        .filter_map(|line| line.strip_prefix("- "))
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .collect();
            assert_eq!(seen, input, "count={count} size={size}");
        }
    }

    #[tokio::test]
    async fn failure_on_second_batch_discards_everything() {
        let calls = Arc::new(Mutex::new(0usize));
        let result = summarize_batches(&chunks(3), 1, |_prompt| {
            let calls = calls.clone();
            async move {
                let mut calls = calls.lock().expect("lock");
                *calls += 1;
                if *calls == 2 {
                    Err(SummarizationClientError::GenerationFailed("quota".into()).into())
                } else {
                    Ok(format!("S{calls}"))
                }
            }
        })
        .await;

        assert!(matches!(result, Err(ProcessingError::Summarization(_))));
        assert_eq!(*calls.lock().expect("lock"), 2);
    }

    #[tokio::test]
    async fn zero_batch_size_is_rejected() {
        let result = summarize_batches(&chunks(2), 0, |_prompt| async { Ok(String::new()) }).await;
        assert!(matches!(result, Err(ProcessingError::InvalidBatchSize)));
    }

    #[test]
    fn batch_count_rounds_up() {
        assert_eq!(batch_count(0, 10), 0);
        assert_eq!(batch_count(10, 10), 1);
        assert_eq!(batch_count(11, 10), 2);
        assert_eq!(batch_count(5, 0), 0);
    }
}
