//! Derived UI state
//!
//! Nothing here is stored: `typing` and `uploading` are read straight off
//! the dispatchers' lifecycles, and control availability follows from them
//! and the draft.

use super::dispatch::{IngestDispatcher, QueryDispatcher};

/// Snapshot of the flags the presentation layer renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiState {
    /// A chat request is in flight
    pub typing: bool,
    /// An upload is in flight
    pub uploading: bool,
    /// The draft is empty after trimming
    pub draft_empty: bool,
}

/// A busy indicator appearing or disappearing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorChange {
    /// First chat request went out
    TypingStarted,
    /// Last pending chat request settled
    TypingStopped,
    /// Upload went out
    UploadStarted,
    /// Upload settled
    UploadFinished,
}

impl UiState {
    /// Derives the flags from dispatcher lifecycles and the draft
    pub fn derive(queries: &QueryDispatcher, ingest: &IngestDispatcher, draft: &str) -> Self {
        Self {
            typing: queries.is_typing(),
            uploading: ingest.is_uploading(),
            draft_empty: draft.trim().is_empty(),
        }
    }

    /// Whether the query-submit control accepts input
    pub fn submit_enabled(&self) -> bool {
        !self.draft_empty
    }

    /// Whether the upload control accepts a new file
    pub fn upload_enabled(&self) -> bool {
        !self.uploading
    }

    /// Indicator changes between `previous` and `self`
    ///
    /// # Examples
    ///
    /// ```
    /// use ragconsole::session::{IndicatorChange, UiState};
    ///
    /// let idle = UiState::default();
    /// let busy = UiState { typing: true, ..idle };
    /// assert_eq!(busy.changes_since(&idle), vec![IndicatorChange::TypingStarted]);
    /// assert_eq!(idle.changes_since(&busy), vec![IndicatorChange::TypingStopped]);
    /// ```
    pub fn changes_since(&self, previous: &UiState) -> Vec<IndicatorChange> {
        let mut changes = Vec::new();
        match (previous.typing, self.typing) {
            (false, true) => changes.push(IndicatorChange::TypingStarted),
            (true, false) => changes.push(IndicatorChange::TypingStopped),
            _ => {}
        }
        match (previous.uploading, self.uploading) {
            (false, true) => changes.push(IndicatorChange::UploadStarted),
            (true, false) => changes.push(IndicatorChange::UploadFinished),
            _ => {}
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationStore;
    use std::path::Path;

    #[test]
    fn test_idle_dispatchers_derive_idle_state() {
        let state = UiState::derive(&QueryDispatcher::new(), &IngestDispatcher::new(), "");
        assert!(!state.typing);
        assert!(!state.uploading);
        assert!(state.draft_empty);
        assert!(!state.submit_enabled());
        assert!(state.upload_enabled());
    }

    #[test]
    fn test_whitespace_draft_disables_submit() {
        let state = UiState::derive(&QueryDispatcher::new(), &IngestDispatcher::new(), "  \t");
        assert!(!state.submit_enabled());

        let state = UiState::derive(&QueryDispatcher::new(), &IngestDispatcher::new(), " hi ");
        assert!(state.submit_enabled());
    }

    #[test]
    fn test_flags_follow_dispatchers() {
        let mut queries = QueryDispatcher::new();
        let mut ingest = IngestDispatcher::new();
        let mut store = ConversationStore::new();
        let mut draft = String::new();

        queries.dispatch("Q", &mut store, &mut draft);
        ingest.dispatch(Some(Path::new("doc.pdf")));

        let state = UiState::derive(&queries, &ingest, &draft);
        assert!(state.typing);
        assert!(state.uploading);
        assert!(!state.upload_enabled());
    }

    #[test]
    fn test_no_changes_when_equal() {
        let state = UiState {
            typing: true,
            uploading: true,
            draft_empty: false,
        };
        assert!(state.changes_since(&state).is_empty());
    }

    #[test]
    fn test_upload_changes() {
        let idle = UiState::default();
        let uploading = UiState {
            uploading: true,
            ..idle
        };
        assert_eq!(
            uploading.changes_since(&idle),
            vec![IndicatorChange::UploadStarted]
        );
        assert_eq!(
            idle.changes_since(&uploading),
            vec![IndicatorChange::UploadFinished]
        );
    }
}
