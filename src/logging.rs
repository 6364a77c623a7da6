//! Tracing configuration and log routing.
//!
//! Events go to stdout in compact form and are mirrored to a log file through a non-blocking
//! writer. The file is `PDFDIGEST_LOG_FILE` when set, else `logs/pdfdigest.log`. The file layer
//! also records span closes, so every upload's `request_id` span leaves a timing line.
use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, fmt::format::FmtSpan, prelude::*};

const LOG_FILE_ENV: &str = "PDFDIGEST_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/pdfdigest.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber.
///
/// Filtering honours `RUST_LOG` and defaults to `info`. A second call keeps the first subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = open_log_writer(&log_file_path()).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .compact()
    });

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
    if let Err(err) = installed {
        eprintln!("Tracing subscriber already installed: {err}");
    }
}

fn log_file_path() -> PathBuf {
    std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from)
}

fn open_log_writer(path: &Path) -> Option<NonBlocking> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(dir) {
            eprintln!("Failed to create log directory {}: {err}", dir.display());
            return None;
        }
    }
    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(writer)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_writer_creates_missing_directories() {
        let dir = std::env::temp_dir().join(format!("pdfdigest-logs-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("pdfdigest.log");

        assert!(open_log_writer(&path).is_some());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn log_writer_reports_unopenable_path() {
        let dir = std::env::temp_dir().join(format!("pdfdigest-logs-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("dir");

        assert!(open_log_writer(&dir).is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
