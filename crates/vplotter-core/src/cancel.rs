//! Cooperative cancellation for plotting jobs
//!
//! The token is set asynchronously (typically from a signal handler) and
//! observed by the job runner only at line boundaries. Once set it stays
//! set for the lifetime of the job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Latched, cloneable cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::info!("Cancellation requested");
        }
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
