//! Backend trait and wire types for the RAG service
//!
//! The backend answers queries (`POST /chat`), indexes documents
//! (`POST /ingest`) and reports liveness (`GET /health`). The console only
//! consumes these endpoints; it never implements them.

use crate::error::{RagConsoleError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Request body for `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// Query text exactly as the user submitted it
    pub message: String,
}

/// Success body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    /// Generated answer
    pub response: String,
    /// Documents the answer was grounded on
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

impl ChatReply {
    /// Creates a reply without sources
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            sources: None,
        }
    }

    /// Text shown in the transcript for this reply
    ///
    /// Non-empty source lists are listed after the answer.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragconsole::backend::ChatReply;
    ///
    /// let reply = ChatReply {
    ///     response: "Revenue grew 4%.".to_string(),
    ///     sources: Some(vec!["q3.pdf".to_string()]),
    /// };
    /// assert_eq!(reply.transcript_text(), "Revenue grew 4%.\n\nSources: q3.pdf");
    /// ```
    pub fn transcript_text(&self) -> String {
        match self.sources.as_deref() {
            Some(sources) if !sources.is_empty() => {
                format!("{}\n\nSources: {}", self.response, sources.join(", "))
            }
            _ => self.response.clone(),
        }
    }
}

/// A document ready to be sent as the single multipart `file` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name reported to the backend
    pub file_name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl Document {
    /// Creates a document from in-memory contents
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a document from disk
    ///
    /// # Errors
    ///
    /// Returns `RagConsoleError::Ingest` if the file cannot be read
    pub async fn read(path: &Path, file_name: impl Into<String>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            RagConsoleError::Ingest(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(Self::new(file_name, bytes))
    }
}

/// Success-shaped body of `POST /ingest`
///
/// A 2xx response is still a failed ingest unless `status` is `"success"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReceipt {
    /// `"success"` when the document was indexed
    pub status: String,
    /// Name the backend stored the document under
    #[serde(default)]
    pub filename: Option<String>,
    /// Number of indexed chunks
    #[serde(default)]
    pub chunks: Option<u64>,
}

impl IngestReceipt {
    /// Whether the backend reports the document as indexed
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// `"healthy"` when the backend is up
    pub status: String,
}

impl HealthStatus {
    /// Whether the backend reports itself healthy
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// RAG backend abstraction
///
/// Implementations must report every failure (transport, non-success
/// status, malformed body) as an `Err`; the dispatchers treat all of them
/// alike.
#[async_trait]
pub trait RagBackend: Send + Sync {
    /// Sends a query and returns the generated answer
    async fn chat(&self, message: &str) -> Result<ChatReply>;

    /// Uploads one document for indexing
    async fn ingest(&self, document: Document) -> Result<IngestReceipt>;

    /// Probes backend liveness
    async fn health(&self) -> Result<HealthStatus>;
}
