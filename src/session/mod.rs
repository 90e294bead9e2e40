//! Session module for ragconsole
//!
//! A [`Session`] owns everything ephemeral about one console run: the
//! transcript store, the input draft, and both dispatchers. It is the only
//! writer of that state and is driven from a single task, so nothing in it
//! is locked.
//!
//! Two ways to drive a session:
//!
//! - `send_query` / `upload_document` run one operation end to end and
//!   await the backend inline. One-shot commands and tests use these.
//! - `dispatch_query` / `dispatch_upload` perform only the synchronous part
//!   and return an [`OutboundRequest`]; the caller sends it (typically with
//!   [`OutboundRequest::spawn`]) and later hands the [`Settlement`] to
//!   [`Session::settle`]. The interactive console uses this so several
//!   requests can be in flight while input stays live.

pub mod dispatch;
pub mod lifecycle;
pub mod scroll;
pub mod ui_state;

pub use dispatch::{
    IngestDispatcher, IngestRequest, OutboundRequest, QueryDispatcher, QueryRequest, QueryTicket,
    Settled, Settlement, CHAT_FAILURE_NOTICE, INGEST_FAILURE_NOTICE,
};
pub use lifecycle::RequestLifecycle;
pub use scroll::{AutoScroll, Viewport};
pub use ui_state::{IndicatorChange, UiState};

use crate::backend::RagBackend;
use crate::conversation::{ConversationStore, Transcript, TranscriptObserver};
use std::path::Path;

/// Conversation state for one console run
///
/// # Examples
///
/// ```
/// use ragconsole::backend::fake::FakeBackend;
/// use ragconsole::session::Session;
///
/// # #[tokio::main]
/// # async fn main() {
/// let backend = FakeBackend::new();
/// backend.push_chat_ok("X");
///
/// let mut session = Session::new();
/// session.send_query(&backend, "Q").await;
///
/// let contents: Vec<_> = session.transcript().iter().map(|e| e.content().to_string()).collect();
/// assert_eq!(contents, vec!["Q", "X"]);
/// assert!(!session.ui_state().typing);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Session {
    store: ConversationStore,
    draft: String,
    queries: QueryDispatcher,
    ingest: IngestDispatcher,
}

impl Session {
    /// Creates a session with an empty transcript and idle dispatchers
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transcript observer, e.g. an [`AutoScroll`]
    pub fn subscribe(&mut self, observer: Box<dyn TranscriptObserver>) {
        self.store.subscribe(observer);
    }

    /// Current transcript
    pub fn transcript(&self) -> &Transcript {
        self.store.transcript()
    }

    /// Current unsent input
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the unsent input
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Flags derived from in-flight requests and the draft
    pub fn ui_state(&self) -> UiState {
        UiState::derive(&self.queries, &self.ingest, &self.draft)
    }

    /// Number of requests that have not settled yet
    pub fn pending_requests(&self) -> usize {
        self.queries.in_flight() + usize::from(self.ingest.is_uploading())
    }

    /// Synchronous half of `send_query`
    pub fn dispatch_query(&mut self, raw: &str) -> Option<OutboundRequest> {
        self.queries
            .dispatch(raw, &mut self.store, &mut self.draft)
            .map(OutboundRequest::Query)
    }

    /// Dispatches the current draft as a query
    pub fn submit_draft(&mut self) -> Option<OutboundRequest> {
        let raw = self.draft.clone();
        self.dispatch_query(&raw)
    }

    /// Synchronous half of `upload_document`
    pub fn dispatch_upload(&mut self, file: Option<&Path>) -> Option<OutboundRequest> {
        self.ingest.dispatch(file).map(OutboundRequest::Ingest)
    }

    /// Folds a request outcome into the transcript and clears its flag
    pub fn settle(&mut self, settlement: Settlement) -> Option<Settled> {
        match settlement {
            Settlement::Query { ticket, outcome } => {
                self.queries.settle(ticket, outcome, &mut self.store)
            }
            Settlement::Ingest { outcome } => self.ingest.settle(outcome, &mut self.store),
        }
    }

    /// Submits `raw` as a query and waits for the reply
    ///
    /// Returns `None` when the input was blank and nothing was sent.
    pub async fn send_query(&mut self, backend: &dyn RagBackend, raw: &str) -> Option<Settled> {
        let request = self.dispatch_query(raw)?;
        let settlement = request.send(backend).await;
        self.settle(settlement)
    }

    /// Uploads `file` and waits for the receipt
    ///
    /// Returns `None` when no file was given or an upload is already in
    /// flight.
    pub async fn upload_document(
        &mut self,
        backend: &dyn RagBackend,
        file: Option<&Path>,
    ) -> Option<Settled> {
        let request = self.dispatch_upload(file)?;
        let settlement = request.send(backend).await;
        self.settle(settlement)
    }
}
