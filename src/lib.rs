//! ragconsole - Interactive console for a RAG agent
//!
//! This library provides the core of the ragconsole client: the
//! conversation transcript, the request dispatchers that talk to the
//! retrieval-augmented generation backend, and the console that renders it
//! all in a terminal.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `conversation`: Append-only transcript and its observers
//! - `session`: Query and ingest dispatch, busy flags, auto-scroll
//! - `backend`: RAG backend abstraction, HTTP client and in-process fake
//! - `commands`: Console and one-shot command handlers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use ragconsole::backend::create_backend;
//! use ragconsole::{Config, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = create_backend(&config.backend)?;
//!     let mut session = Session::new();
//!     session.send_query(backend.as_ref(), "What is in the Q3 report?").await;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{RagConsoleError, Result};
pub use session::Session;
