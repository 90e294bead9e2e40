//! In-process fake backend for unit and integration tests
//!
//! [`FakeBackend`] answers calls from scripted queues instead of the
//! network and records what it was asked. A scripted outcome can be
//! *gated*: the call stays pending until the test releases the returned
//! [`oneshot::Sender`], which lets tests decide the order in which
//! concurrent requests settle.
//!
//! # Example
//!
//! ```
//! use ragconsole::backend::fake::FakeBackend;
//! use ragconsole::backend::RagBackend;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = FakeBackend::new();
//! backend.push_chat_ok("42");
//!
//! let reply = backend.chat("meaning of life?").await.unwrap();
//! assert_eq!(reply.response, "42");
//! assert_eq!(backend.chat_calls(), vec!["meaning of life?".to_string()]);
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::backend::{ChatReply, Document, HealthStatus, IngestReceipt, RagBackend};
use crate::error::{RagConsoleError, Result};

struct Scripted<T> {
    outcome: std::result::Result<T, String>,
    gate: Option<oneshot::Receiver<()>>,
}

impl<T> Scripted<T> {
    async fn release(self, to_error: fn(String) -> RagConsoleError) -> Result<T> {
        if let Some(gate) = self.gate {
            // A dropped sender releases the call as well.
            let _ = gate.await;
        }
        self.outcome.map_err(|e| to_error(e).into())
    }
}

#[derive(Default)]
struct FakeState {
    chat: VecDeque<Scripted<ChatReply>>,
    ingest: VecDeque<Scripted<IngestReceipt>>,
    chat_calls: Vec<String>,
    ingest_calls: Vec<Document>,
    healthy: bool,
}

/// Scripted in-memory [`RagBackend`]
///
/// Calls with nothing scripted fail, like an unreachable server.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl std::fmt::Debug for FakeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("FakeBackend")
            .field("scripted_chat", &state.chat.len())
            .field("scripted_ingest", &state.ingest.len())
            .finish()
    }
}

impl FakeBackend {
    /// Creates a fake with empty scripts
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Next chat call succeeds with `response`
    pub fn push_chat_ok(&self, response: impl Into<String>) {
        self.push_chat(Ok(ChatReply::new(response)), None);
    }

    /// Next chat call succeeds with a full reply
    pub fn push_chat_reply(&self, reply: ChatReply) {
        self.push_chat(Ok(reply), None);
    }

    /// Next chat call fails with `message`
    pub fn push_chat_err(&self, message: impl Into<String>) {
        self.push_chat(Err(message.into()), None);
    }

    /// Next chat call settles with `response` only once the sender fires
    pub fn push_chat_gated(&self, response: impl Into<String>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push_chat(Ok(ChatReply::new(response)), Some(rx));
        tx
    }

    fn push_chat(
        &self,
        outcome: std::result::Result<ChatReply, String>,
        gate: Option<oneshot::Receiver<()>>,
    ) {
        self.lock().chat.push_back(Scripted { outcome, gate });
    }

    /// Next ingest call returns `status:"success"` for `filename`
    pub fn push_ingest_ok(&self, filename: impl Into<String>) {
        self.push_ingest(
            Ok(IngestReceipt {
                status: "success".to_string(),
                filename: Some(filename.into()),
                chunks: Some(1),
            }),
            None,
        );
    }

    /// Next ingest call returns a 2xx body with the given `status`
    pub fn push_ingest_status(&self, status: impl Into<String>) {
        self.push_ingest(
            Ok(IngestReceipt {
                status: status.into(),
                filename: None,
                chunks: None,
            }),
            None,
        );
    }

    /// Next ingest call fails with `message`
    pub fn push_ingest_err(&self, message: impl Into<String>) {
        self.push_ingest(Err(message.into()), None);
    }

    /// Next ingest call succeeds only once the sender fires
    pub fn push_ingest_gated(&self, filename: impl Into<String>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push_ingest(
            Ok(IngestReceipt {
                status: "success".to_string(),
                filename: Some(filename.into()),
                chunks: Some(1),
            }),
            Some(rx),
        );
        tx
    }

    fn push_ingest(
        &self,
        outcome: std::result::Result<IngestReceipt, String>,
        gate: Option<oneshot::Receiver<()>>,
    ) {
        self.lock().ingest.push_back(Scripted { outcome, gate });
    }

    /// Makes `/health` report healthy
    pub fn set_healthy(&self, healthy: bool) {
        self.lock().healthy = healthy;
    }

    /// Messages received by `chat`, in call order
    pub fn chat_calls(&self) -> Vec<String> {
        self.lock().chat_calls.clone()
    }

    /// Documents received by `ingest`, in call order
    pub fn ingest_calls(&self) -> Vec<Document> {
        self.lock().ingest_calls.clone()
    }
}

#[async_trait]
impl RagBackend for FakeBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply> {
        let scripted = {
            let mut state = self.lock();
            state.chat_calls.push(message.to_string());
            state.chat.pop_front()
        };
        match scripted {
            Some(scripted) => scripted.release(RagConsoleError::Backend).await,
            None => Err(RagConsoleError::Backend("connection refused".to_string()).into()),
        }
    }

    async fn ingest(&self, document: Document) -> Result<IngestReceipt> {
        let scripted = {
            let mut state = self.lock();
            state.ingest_calls.push(document);
            state.ingest.pop_front()
        };
        match scripted {
            Some(scripted) => scripted.release(RagConsoleError::Ingest).await,
            None => Err(RagConsoleError::Ingest("connection refused".to_string()).into()),
        }
    }

    async fn health(&self) -> Result<HealthStatus> {
        if self.lock().healthy {
            Ok(HealthStatus {
                status: "healthy".to_string(),
            })
        } else {
            Err(RagConsoleError::Backend("connection refused".to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unscripted_chat_fails() {
        let backend = FakeBackend::new();
        assert!(backend.chat("hello").await.is_err());
        assert_eq!(backend.chat_calls(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_scripted_outcomes_in_order() {
        let backend = FakeBackend::new();
        backend.push_chat_ok("first");
        backend.push_chat_err("boom");

        assert_eq!(backend.chat("a").await.unwrap().response, "first");
        let err = backend.chat("b").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_gated_chat_waits_for_release() {
        let backend = std::sync::Arc::new(FakeBackend::new());
        let gate = backend.push_chat_gated("late");

        let task = {
            let backend = backend.clone();
            tokio::spawn(async move { backend.chat("q").await })
        };
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        gate.send(()).unwrap();
        assert_eq!(task.await.unwrap().unwrap().response, "late");
    }

    #[tokio::test]
    async fn test_ingest_records_documents() {
        let backend = FakeBackend::new();
        backend.push_ingest_status("error");

        let receipt = backend
            .ingest(Document::new("doc.pdf", b"%PDF".to_vec()))
            .await
            .unwrap();
        assert!(!receipt.is_success());
        assert_eq!(backend.ingest_calls()[0].file_name, "doc.pdf");
    }

    #[tokio::test]
    async fn test_health_toggle() {
        let backend = FakeBackend::new();
        assert!(backend.health().await.is_err());
        backend.set_healthy(true);
        assert!(backend.health().await.unwrap().is_healthy());
    }
}
