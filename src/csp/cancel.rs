use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Returned by a search that stopped because its token was cancelled.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("search was cancelled")]
pub struct Cancelled;

/// Cooperative cancellation checked by the search at every step.
/// Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Creates a token that is only cancelled explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that also cancels itself once the time limit passed.
    #[must_use]
    pub fn with_time_limit(limit: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Instant::now().checked_add(limit),
        }
    }

    /// Cancels every search observing this token or its clones.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clones_share_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn zero_time_limit_is_cancelled() {
        assert!(CancelToken::with_time_limit(Duration::ZERO).is_cancelled());
        assert!(!CancelToken::with_time_limit(Duration::from_secs(3600)).is_cancelled());
    }
}
