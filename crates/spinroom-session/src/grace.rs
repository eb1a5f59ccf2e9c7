//! One-shot cancellable timers for disconnect grace periods.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A handle to an armed grace-period timer.
///
/// The timer sleeps for the configured delay and then runs its expiry
/// future — unless [`cancel`](GraceTimer::cancel) aborts it first. The
/// expiry future must re-validate everything it touches after waking:
/// the sleep is a suspension point and the world may have changed.
///
/// Cancellation is race-free as long as the expiry path claims its work
/// through an idempotent take (see `PresenceTracker::take_pending`):
/// either the cancel lands before the expiry future starts mutating, or
/// the take comes up empty and the expiry no-ops.
#[derive(Debug)]
pub struct GraceTimer {
    handle: JoinHandle<()>,
}

impl GraceTimer {
    /// Arms a timer that runs `on_expire` after `delay`.
    pub fn arm<F>(delay: Duration, on_expire: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_expire.await;
        });
        Self { handle }
    }

    /// Aborts the timer. If the expiry future is already past its
    /// idempotent claim, this is a harmless no-op.
    pub fn cancel(self) {
        self.handle.abort();
    }
}
