//! Backend module for ragconsole
//!
//! This module contains the RAG backend abstraction, its HTTP
//! implementation, and an in-process fake used by tests.

pub mod base;
pub mod fake;
pub mod http;

pub use base::{ChatReply, ChatRequest, Document, HealthStatus, IngestReceipt, RagBackend};
pub use http::HttpBackend;

use crate::config::BackendConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the backend client used by a session
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn RagBackend>> {
    Ok(Arc::new(HttpBackend::new(config)?))
}
