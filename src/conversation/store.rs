//! Append-only transcript and the store that owns it
//!
//! The [`ConversationStore`] is the single writer of the session
//! [`Transcript`]. Entries are only ever pushed to the end; nothing removes,
//! edits or reorders them. Observers registered with
//! [`ConversationStore::subscribe`] are told about every append, which is
//! how the auto-scroll controller follows transcript growth.

use super::message::{Message, Role};

/// One transcript position
///
/// `reply_to` correlates an assistant reply with the index of the user
/// message it answers. Replies are appended in the order their requests
/// settle, so with several queries in flight the answer to an earlier query
/// can land after the answer to a later one; the correlation keeps the
/// transcript unambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    message: Message,
    reply_to: Option<usize>,
}

impl Entry {
    /// The wrapped message
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Index of the user message this entry answers, if any
    pub fn reply_to(&self) -> Option<usize> {
        self.reply_to
    }

    /// Shorthand for `self.message().role()`
    pub fn role(&self) -> Role {
        self.message.role()
    }

    /// Shorthand for `self.message().content()`
    pub fn content(&self) -> &str {
        self.message.content()
    }
}

/// Ordered, append-only sequence of transcript entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript has no entries yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Newest entry
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Messages in insertion order
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().map(|e| &e.message)
    }

    /// Count of entries authored by `role`
    pub fn count_role(&self, role: Role) -> usize {
        self.entries.iter().filter(|e| e.role() == role).count()
    }

    fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }
}

/// Receives a notification after every transcript append
pub trait TranscriptObserver: Send {
    /// Called with the transcript as it stands after the append
    fn transcript_grew(&mut self, transcript: &Transcript);
}

/// Owner of the session transcript
///
/// # Examples
///
/// ```
/// use ragconsole::conversation::{ConversationStore, Message};
///
/// let mut store = ConversationStore::new();
/// store.append(Message::user("hello"));
/// let transcript = store.append(Message::assistant("hi"));
/// assert_eq!(transcript.len(), 2);
/// ```
#[derive(Default)]
pub struct ConversationStore {
    transcript: Transcript,
    observers: Vec<Box<dyn TranscriptObserver>>,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("transcript", &self.transcript)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ConversationStore {
    /// Creates a store with an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Current transcript
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Registers an observer for transcript growth
    pub fn subscribe(&mut self, observer: Box<dyn TranscriptObserver>) {
        self.observers.push(observer);
    }

    /// Appends a message as the new last entry
    ///
    /// Cannot fail. Prior entries are left untouched.
    pub fn append(&mut self, message: Message) -> &Transcript {
        self.push(Entry {
            message,
            reply_to: None,
        })
    }

    /// Appends a reply correlated with the user message at `reply_to`
    pub fn append_reply(&mut self, message: Message, reply_to: usize) -> &Transcript {
        self.push(Entry {
            message,
            reply_to: Some(reply_to),
        })
    }

    fn push(&mut self, entry: Entry) -> &Transcript {
        self.transcript.push(entry);
        for observer in self.observers.iter_mut() {
            observer.transcript_grew(&self.transcript);
        }
        &self.transcript
    }
}
