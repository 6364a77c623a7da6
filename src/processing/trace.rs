//! Best-effort debug trace of the latest pre-translation summary.

use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Overwrite `path` with `summary`.
///
/// Failures are logged and swallowed: the trace never affects the response.
pub(crate) async fn write_summary_trace(path: &Path, summary: &str) {
    match write_file(path, summary).await {
        Ok(()) => tracing::debug!(path = %path.display(), bytes = summary.len(), "Wrote summary trace"),
        Err(error) => tracing::warn!(
            path = %path.display(),
            error = %error,
            "Failed to write summary trace"
        ),
    }
}

async fn write_file(path: &Path, summary: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(summary.as_bytes()).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trace_overwrites_previous_contents() {
        let path = std::env::temp_dir().join(format!("pdfdigest-trace-{}.txt", uuid::Uuid::new_v4()));
        write_summary_trace(&path, "\nfirst run with a longer body").await;
        write_summary_trace(&path, "\nsecond").await;

        let contents = tokio::fs::read_to_string(&path).await.expect("trace file");
        assert_eq!(contents, "\nsecond");
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn unwritable_path_is_not_an_error() {
        let path = std::env::temp_dir()
            .join(format!("pdfdigest-missing-{}", uuid::Uuid::new_v4()))
            .join("result.txt");
        write_summary_trace(&path, "ignored").await;
        assert!(!path.exists());
    }
}
