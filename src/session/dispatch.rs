//! Query and ingest dispatchers
//!
//! A dispatcher turns a user action into an outbound request and later
//! folds the request's outcome back into the transcript. Dispatch is
//! synchronous: it performs the optimistic transcript/draft updates and
//! hands back an [`OutboundRequest`]. The request is then sent (the only
//! suspension point) and its [`Settlement`] is fed back through `settle`,
//! in whatever order requests happen to finish.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::lifecycle::RequestLifecycle;
use crate::backend::{ChatReply, Document, IngestReceipt, RagBackend};
use crate::conversation::{ConversationStore, Message};
use crate::error::{RagConsoleError, Result};

/// Assistant text appended when a chat request fails for any reason
pub const CHAT_FAILURE_NOTICE: &str = "System error: the connection to the agent was lost.";

/// System text appended when an upload fails for any reason
pub const INGEST_FAILURE_NOTICE: &str = "Upload failed: the document could not be indexed.";

/// Identifies one chat request for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryTicket(u64);

impl fmt::Display for QueryTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Chat request ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Ticket to settle against
    pub ticket: QueryTicket,
    /// Text as submitted by the user
    pub text: String,
}

impl QueryRequest {
    /// Sends the query and wraps the outcome for `settle`
    pub async fn send(self, backend: &dyn RagBackend) -> Settlement {
        let outcome = backend.chat(&self.text).await;
        Settlement::Query {
            ticket: self.ticket,
            outcome,
        }
    }
}

/// Upload request ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    /// Selected file
    pub path: PathBuf,
    /// Name the file is uploaded and announced under
    pub file_name: String,
}

impl IngestRequest {
    /// Builds the single-file payload, uploads it, and wraps the outcome
    ///
    /// A file that cannot be read settles as a failed upload.
    pub async fn send(self, backend: &dyn RagBackend) -> Settlement {
        let outcome = match Document::read(&self.path, self.file_name).await {
            Ok(document) => backend.ingest(document).await,
            Err(e) => Err(e),
        };
        Settlement::Ingest { outcome }
    }
}

/// Any request produced by a dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundRequest {
    /// `POST /chat`
    Query(QueryRequest),
    /// `POST /ingest`
    Ingest(IngestRequest),
}

impl OutboundRequest {
    /// Sends the request on the current task
    pub async fn send(self, backend: &dyn RagBackend) -> Settlement {
        match self {
            Self::Query(request) => request.send(backend).await,
            Self::Ingest(request) => request.send(backend).await,
        }
    }

    /// Sends the request on its own task
    ///
    /// The returned future always yields a settlement: a task that panics
    /// or is aborted settles as a rejection, so the matching busy flag is
    /// still cleared.
    pub fn spawn(self, backend: Arc<dyn RagBackend>) -> BoxFuture<'static, Settlement> {
        let ticket = match &self {
            Self::Query(request) => Some(request.ticket),
            Self::Ingest(_) => None,
        };
        let handle = tokio::spawn(async move { self.send(backend.as_ref()).await });

        async move {
            match handle.await {
                Ok(settlement) => settlement,
                Err(e) => {
                    tracing::error!("Request task ended abnormally: {}", e);
                    let outcome = RagConsoleError::Aborted(e.to_string());
                    match ticket {
                        Some(ticket) => Settlement::Query {
                            ticket,
                            outcome: Err(outcome.into()),
                        },
                        None => Settlement::Ingest {
                            outcome: Err(outcome.into()),
                        },
                    }
                }
            }
        }
        .boxed()
    }
}

/// Outcome of a sent request, waiting to be folded into the session
#[derive(Debug)]
pub enum Settlement {
    /// A chat request finished
    Query {
        /// Request the outcome belongs to
        ticket: QueryTicket,
        /// Backend reply or failure
        outcome: Result<ChatReply>,
    },
    /// The upload finished
    Ingest {
        /// Backend receipt or failure
        outcome: Result<IngestReceipt>,
    },
}

/// What `settle` appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// A reply (answer or failure notice) for `ticket`
    Query {
        /// Settled request
        ticket: QueryTicket,
        /// `false` when the failure notice was appended
        answered: bool,
    },
    /// An ingest confirmation or failure notice
    Ingest {
        /// `false` when the failure notice was appended
        indexed: bool,
    },
}

impl Settled {
    /// Whether the request succeeded
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Query { answered, .. } => *answered,
            Self::Ingest { indexed } => *indexed,
        }
    }
}

#[derive(Debug)]
struct InFlightQuery {
    user_index: usize,
    lifecycle: RequestLifecycle<ChatReply>,
}

/// Turns submitted queries into chat requests
///
/// Queries are not mutually exclusive: several may be in flight, each with
/// its own lifecycle. `typing` holds while any of them is pending.
#[derive(Debug, Default)]
pub struct QueryDispatcher {
    next_ticket: u64,
    in_flight: BTreeMap<QueryTicket, InFlightQuery>,
}

impl QueryDispatcher {
    /// Creates an idle dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches `raw` as a query
    ///
    /// Whitespace-only input is ignored entirely. Otherwise the user
    /// message is appended, the draft is cleared, and the request is
    /// marked pending before it is returned for sending.
    pub fn dispatch(
        &mut self,
        raw: &str,
        store: &mut ConversationStore,
        draft: &mut String,
    ) -> Option<QueryRequest> {
        if raw.trim().is_empty() {
            tracing::trace!("Ignoring empty query");
            return None;
        }

        let user_index = store.transcript().len();
        store.append(Message::user(raw));
        draft.clear();

        let ticket = QueryTicket(self.next_ticket);
        self.next_ticket += 1;

        let mut lifecycle = RequestLifecycle::Idle;
        lifecycle.dispatch();
        self.in_flight.insert(
            ticket,
            InFlightQuery {
                user_index,
                lifecycle,
            },
        );

        tracing::debug!(
            "Dispatched query {} ({} in flight)",
            ticket,
            self.in_flight.len()
        );
        Some(QueryRequest {
            ticket,
            text: raw.to_string(),
        })
    }

    /// Folds the outcome of `ticket` into the transcript
    ///
    /// Appends exactly one assistant entry correlated with the query's user
    /// message, then retires the request. Unknown tickets are ignored.
    pub fn settle(
        &mut self,
        ticket: QueryTicket,
        outcome: Result<ChatReply>,
        store: &mut ConversationStore,
    ) -> Option<Settled> {
        let Some(query) = self.in_flight.get_mut(&ticket) else {
            tracing::warn!("Dropping outcome for unknown query {}", ticket);
            return None;
        };

        query.lifecycle.resolve(outcome);
        let (message, answered) = match query.lifecycle.complete() {
            Ok(reply) => (Message::assistant(reply.transcript_text()), true),
            Err(e) => {
                tracing::warn!("Query {} failed: {:#}", ticket, e);
                (Message::assistant(CHAT_FAILURE_NOTICE), false)
            }
        };
        store.append_reply(message, query.user_index);
        self.in_flight.remove(&ticket);

        tracing::debug!(
            "Settled query {} (answered={}, {} in flight)",
            ticket,
            answered,
            self.in_flight.len()
        );
        Some(Settled::Query { ticket, answered })
    }

    /// Whether any chat request is pending
    pub fn is_typing(&self) -> bool {
        self.in_flight.values().any(|q| q.lifecycle.is_pending())
    }

    /// Number of chat requests not yet settled
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Turns a selected file into an upload request
///
/// At most one upload is in flight; further attempts are ignored until it
/// settles.
#[derive(Debug, Default)]
pub struct IngestDispatcher {
    lifecycle: RequestLifecycle<IngestReceipt>,
    file_name: Option<String>,
}

impl IngestDispatcher {
    /// Creates an idle dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches an upload of `file`
    ///
    /// Returns `None` without touching any state when no file is selected
    /// or an upload is already in flight.
    pub fn dispatch(&mut self, file: Option<&Path>) -> Option<IngestRequest> {
        let path = file?;
        if !self.lifecycle.dispatch() {
            tracing::debug!("Upload already in flight; ignoring {}", path.display());
            return None;
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.file_name = Some(file_name.clone());

        tracing::debug!("Dispatched upload of {}", path.display());
        Some(IngestRequest {
            path: path.to_path_buf(),
            file_name,
        })
    }

    /// Folds the upload outcome into the transcript
    ///
    /// Appends exactly one system entry: a confirmation naming the file
    /// when the backend reports `status:"success"`, the fixed failure
    /// notice otherwise. Outcomes with no upload in flight are ignored.
    pub fn settle(
        &mut self,
        outcome: Result<IngestReceipt>,
        store: &mut ConversationStore,
    ) -> Option<Settled> {
        if !self.lifecycle.resolve(outcome) {
            tracing::warn!("Dropping ingest outcome with no upload in flight");
            return None;
        }

        let file_name = self.file_name.take().unwrap_or_default();
        let (message, indexed) = match self.lifecycle.complete() {
            Ok(receipt) if receipt.is_success() => (
                Message::system(format!("Document indexed: {}", file_name)),
                true,
            ),
            Ok(receipt) => {
                tracing::warn!(
                    status = %receipt.status,
                    "Backend did not index {}",
                    file_name
                );
                (Message::system(INGEST_FAILURE_NOTICE), false)
            }
            Err(e) => {
                tracing::warn!("Upload of {} failed: {:#}", file_name, e);
                (Message::system(INGEST_FAILURE_NOTICE), false)
            }
        };
        store.append(message);

        Some(Settled::Ingest { indexed })
    }

    /// Whether the upload is pending
    pub fn is_uploading(&self) -> bool {
        self.lifecycle.is_pending()
    }
}
