//! Tagged request lifecycle
//!
//! Every dispatcher call walks `Idle → Pending → {Fulfilled, Rejected} →
//! Idle`. The busy flags shown to the user are derived from `Pending`, so a
//! flag cannot outlive the request that raised it: once the outcome has been
//! folded into the transcript the lifecycle is back at `Idle`.

use crate::error::{RagConsoleError, Result};

/// State of one outbound request
#[derive(Debug)]
pub enum RequestLifecycle<T> {
    /// No request issued
    Idle,
    /// Request issued, outcome not yet known
    Pending,
    /// Request returned a well-formed success
    Fulfilled(T),
    /// Request failed for any reason
    Rejected(anyhow::Error),
}

impl<T> Default for RequestLifecycle<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> RequestLifecycle<T> {
    /// Whether a request is in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether no request has been issued or the last one has been folded
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// `Idle → Pending`
    ///
    /// Returns `false` and leaves the state alone when the lifecycle is not
    /// idle.
    pub fn dispatch(&mut self) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = Self::Pending;
        true
    }

    /// `Pending → Fulfilled | Rejected`
    ///
    /// An outcome arriving while no request is pending is dropped and
    /// reported through the return value.
    pub fn resolve(&mut self, outcome: Result<T>) -> bool {
        if !self.is_pending() {
            return false;
        }
        *self = match outcome {
            Ok(value) => Self::Fulfilled(value),
            Err(error) => Self::Rejected(error),
        };
        true
    }

    /// `Fulfilled | Rejected → Idle`, yielding the settled outcome
    ///
    /// Always leaves the lifecycle at `Idle`. A lifecycle that never reached
    /// a terminal state yields a rejection.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragconsole::session::RequestLifecycle;
    ///
    /// let mut lifecycle: RequestLifecycle<u32> = RequestLifecycle::Idle;
    /// assert!(lifecycle.dispatch());
    /// assert!(lifecycle.is_pending());
    /// lifecycle.resolve(Ok(7));
    /// assert_eq!(lifecycle.complete().unwrap(), 7);
    /// assert!(lifecycle.is_idle());
    /// ```
    pub fn complete(&mut self) -> Result<T> {
        match std::mem::replace(self, Self::Idle) {
            Self::Fulfilled(value) => Ok(value),
            Self::Rejected(error) => Err(error),
            Self::Pending => {
                Err(RagConsoleError::Aborted("request completed while pending".to_string()).into())
            }
            Self::Idle => {
                Err(RagConsoleError::Aborted("request completed while idle".to_string()).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let lifecycle: RequestLifecycle<()> = RequestLifecycle::default();
        assert!(lifecycle.is_idle());
        assert!(!lifecycle.is_pending());
    }

    #[test]
    fn test_fulfilled_path_returns_to_idle() {
        let mut lifecycle = RequestLifecycle::Idle;
        assert!(lifecycle.dispatch());
        assert!(lifecycle.resolve(Ok("done")));
        assert!(matches!(lifecycle, RequestLifecycle::Fulfilled("done")));
        assert_eq!(lifecycle.complete().unwrap(), "done");
        assert!(lifecycle.is_idle());
    }

    #[test]
    fn test_rejected_path_returns_to_idle() {
        let mut lifecycle: RequestLifecycle<()> = RequestLifecycle::Idle;
        lifecycle.dispatch();
        lifecycle.resolve(Err(RagConsoleError::Backend("boom".to_string()).into()));
        assert!(matches!(lifecycle, RequestLifecycle::Rejected(_)));
        let err = lifecycle.complete().unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert!(lifecycle.is_idle());
    }

    #[test]
    fn test_dispatch_refused_while_pending() {
        let mut lifecycle: RequestLifecycle<()> = RequestLifecycle::Idle;
        assert!(lifecycle.dispatch());
        assert!(!lifecycle.dispatch());
        assert!(lifecycle.is_pending());
    }

    #[test]
    fn test_resolve_ignored_when_not_pending() {
        let mut lifecycle: RequestLifecycle<u8> = RequestLifecycle::Idle;
        assert!(!lifecycle.resolve(Ok(1)));
        assert!(lifecycle.is_idle());
    }

    #[test]
    fn test_complete_while_pending_rejects_and_resets() {
        let mut lifecycle: RequestLifecycle<u8> = RequestLifecycle::Idle;
        lifecycle.dispatch();
        assert!(lifecycle.complete().is_err());
        assert!(lifecycle.is_idle());
    }
}
