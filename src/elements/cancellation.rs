use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Cooperative, write-once cancellation flag shared between the owner of a sequence and the
/// sequence's number source.
///
/// Once set the signal is never cleared. Producers poll it before each generation step, and any
/// delay currently awaiting [`CancellationSignal::cancelled`] is woken when the signal is set.
#[derive(Clone, Default)]
pub struct CancellationSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a signal that is already set.
    pub fn cancelled_now() -> Self {
        let signal = Self::new();
        signal.cancel();
        signal
    }

    /// Requests cancellation. Returns `true` if this call set the flag.
    pub fn cancel(&self) -> bool {
        let first = !self.inner.cancelled.swap(true, Ordering::SeqCst);
        if first {
            tracing::debug!("cancellation requested");
        }
        self.inner.notify.notify_waiters();
        first
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Completes once cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            // registered before the flag check so a concurrent `cancel()` cannot be missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
