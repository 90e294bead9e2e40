//! Auto-scroll controller
//!
//! [`AutoScroll`] subscribes to transcript growth and moves a [`Viewport`]
//! to the newest entry. It keeps no state of its own; whatever the viewport
//! needs to remember (what it has already shown) lives in the viewport.

use crate::conversation::{Transcript, TranscriptObserver};

/// A view over the transcript that can be scrolled to an entry
pub trait Viewport: Send {
    /// Makes the entry at `index` visible
    ///
    /// Must be idempotent: scrolling to the same index twice shows nothing
    /// new.
    fn scroll_to(&mut self, transcript: &Transcript, index: usize);
}

/// Keeps the newest transcript entry visible
#[derive(Debug)]
pub struct AutoScroll<V> {
    viewport: V,
}

impl<V: Viewport> AutoScroll<V> {
    /// Wraps `viewport`
    pub fn new(viewport: V) -> Self {
        Self { viewport }
    }
}

impl<V: Viewport> TranscriptObserver for AutoScroll<V> {
    fn transcript_grew(&mut self, transcript: &Transcript) {
        if let Some(newest) = transcript.len().checked_sub(1) {
            self.viewport.scroll_to(transcript, newest);
        }
    }
}
