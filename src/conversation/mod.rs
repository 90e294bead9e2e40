//! Conversation module for ragconsole
//!
//! Message types and the append-only transcript store.

pub mod message;
pub mod store;

pub use message::{Message, Role};
pub use store::{ConversationStore, Entry, Transcript, TranscriptObserver};
