#![deny(missing_docs)]

//! Core library for the pdfdigest service: PDF summarization, translation, and volunteer
//! feedback digests.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// PDF text extraction.
pub mod extraction;
/// Volunteer feedback service client.
pub mod feedback;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline metrics helpers.
pub mod metrics;
/// Document pipeline orchestration.
pub mod processing;
/// Language model client abstraction and adapters.
pub mod summarization;
/// Translation client abstraction and supported languages.
pub mod translation;
