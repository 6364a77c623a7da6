//! One-shot command line entrypoint.
//!
//! Runs the same document pipeline as `POST /upload-pdf` against a file on disk and prints the
//! translated summary to stdout.
use anyhow::{Context, Result};
use clap::Parser;
use pdfdigest::{
    config, logging,
    processing::{LanguageSelection, PipelineService},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "summarize-pdf",
    about = "Summarize a PDF and translate the summary"
)]
struct Cli {
    /// PDF file to summarize.
    path: PathBuf,
    /// Language the document is written in (name, code, or `auto`).
    #[arg(long, default_value = "auto")]
    source: String,
    /// Language the summary is translated into.
    #[arg(long)]
    target: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();
    logging::init_tracing();

    let document = tokio::fs::read(&cli.path)
        .await
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let service = PipelineService::new().context("failed to initialize pipeline clients")?;
    let outcome = service
        .summarize_document(
            document,
            LanguageSelection {
                source: cli.source,
                target: cli.target,
            },
        )
        .await
        .context("failed to summarize document")?;

    tracing::info!(
        chunks = outcome.chunk_count,
        batches = outcome.batch_count,
        "Summary ready"
    );
    println!("{}", outcome.result);
    Ok(())
}
