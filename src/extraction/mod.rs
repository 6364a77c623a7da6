//! PDF text extraction.
//!
//! Parsing is CPU-bound and the underlying library may panic on malformed input, so the work runs
//! on a blocking worker and a panicked task is reported as an extraction failure.

use async_trait::async_trait;
use thiserror::Error;

const PAGE_SEPARATOR: &str = "\n\n";

/// Errors raised while turning uploaded bytes into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The upload contained no bytes.
    #[error("document is empty")]
    EmptyDocument,
    /// The bytes could not be parsed as a PDF.
    #[error("failed to parse PDF: {0}")]
    Malformed(String),
    /// The blocking extraction task did not complete.
    #[error("PDF extraction task failed: {0}")]
    TaskFailed(String),
}

/// Interface implemented by document text extractors.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Produce the full text of the document, pages in reading order.
    async fn extract_text(&self, document: Vec<u8>) -> Result<String, ExtractionError>;
}

/// Extractor backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Construct a new extractor.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, document: Vec<u8>) -> Result<String, ExtractionError> {
        if document.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        let size = document.len();
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&document)
                .map(join_pages)
                .map_err(|error| ExtractionError::Malformed(error.to_string()))
        })
        .await
        .map_err(|error| {
            if error.is_panic() {
                ExtractionError::Malformed("parser aborted on malformed input".into())
            } else {
                ExtractionError::TaskFailed(error.to_string())
            }
        })??;

        tracing::debug!(bytes = size, chars = text.chars().count(), "Extracted PDF text");
        Ok(text)
    }
}

/// Join page texts with a blank line so page breaks read as paragraph breaks.
fn join_pages(pages: Vec<String>) -> String {
    pages.join(PAGE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_separated_by_a_blank_line() {
        let text = join_pages(vec!["end of page one".into(), "start of page two".into()]);
        assert_eq!(text, "end of page one\n\nstart of page two");
    }

    #[test]
    fn single_page_is_unchanged() {
        assert_eq!(join_pages(vec!["only page".into()]), "only page");
        assert_eq!(join_pages(Vec::new()), "");
    }

    #[tokio::test]
    async fn empty_document_is_rejected() {
        let error = PdfTextExtractor::new()
            .extract_text(Vec::new())
            .await
            .expect_err("empty document");
        assert!(matches!(error, ExtractionError::EmptyDocument));
    }

    #[tokio::test]
    async fn non_pdf_bytes_fail_extraction() {
        let error = PdfTextExtractor::new()
            .extract_text(b"This is not a valid PDF file".to_vec())
            .await
            .expect_err("garbage input");
        assert!(matches!(error, ExtractionError::Malformed(_)));
    }
}
