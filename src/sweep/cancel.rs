//! Cooperative cancellation: interrupt flag plus optional wall-clock deadline.
//!
//! The walker polls the token between entries. A blocking filesystem call
//! that hangs is not interrupted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared stop signal for one run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Token with no deadline that nothing has fired yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the walk once `limit` has elapsed from now.
    #[must_use]
    pub fn with_deadline(mut self, limit: Duration) -> Self {
        self.deadline = Instant::now().checked_add(limit);
        self
    }

    /// Request a stop. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once cancelled or past the deadline.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Route SIGINT/SIGTERM into this token.
    ///
    /// The first signal asks the walk to stop after the current entry; a
    /// second one terminates the process with status 130.
    #[cfg(feature = "signals")]
    pub fn register_signals(&self) -> std::io::Result<()> {
        use signal_hook::consts::TERM_SIGNALS;
        use signal_hook::flag;

        for &signal in TERM_SIGNALS {
            flag::register_conditional_shutdown(signal, 130, Arc::clone(&self.flag))?;
            flag::register(signal, Arc::clone(&self.flag))?;
        }
        Ok(())
    }
}
