//! Real-time pacing
//!
//! Pulse widths depend on the caller actually blocking for each
//! half-period, so waiting is a capability of its own.

use std::time::Duration;

/// Blocks the caller for a given duration
pub trait Pacer {
    fn wait(&mut self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct RealtimePacer;

impl Pacer for RealtimePacer {
    fn wait(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Returns immediately, for dry runs and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPacer;

impl Pacer for NoopPacer {
    fn wait(&mut self, _duration: Duration) {}
}

impl<P: Pacer + ?Sized> Pacer for Box<P> {
    fn wait(&mut self, duration: Duration) {
        (**self).wait(duration)
    }
}
