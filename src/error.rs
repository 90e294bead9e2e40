//! Error types for ragconsole
//!
//! This module defines all error types used throughout the console,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for ragconsole operations
///
/// Covers configuration loading, backend calls (chat and ingest),
/// and the interactive line editor. Errors raised by a single dispatcher
/// call never escape the session: they are logged and folded into the
/// transcript as a fixed notice.
#[derive(Error, Debug)]
pub enum RagConsoleError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat backend errors (transport, status, malformed body)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Document ingest errors (unreadable file, rejected upload)
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Request task ended without producing an outcome
    #[error("Request aborted: {0}")]
    Aborted(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Line editor errors
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for ragconsole operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
