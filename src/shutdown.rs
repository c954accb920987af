use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A single-fire latch that moves the process from "serving" to
/// "terminating". Armed exactly once, never unset; arming it again is a
/// no-op. The accept loop waits on it, connection sessions arm it after a
/// SHUTDOWN reply has been flushed.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    armed: AtomicBool,
    waker: Notify,
}

impl Shutdown {
    pub fn new() -> Shutdown {
        Shutdown::default()
    }

    pub fn arm(&self) {
        if !self.inner.armed.swap(true, Ordering::SeqCst) {
            self.inner.waker.notify_waiters();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.inner.armed.load(Ordering::SeqCst)
    }

    /// Wait until the latch is armed. Returns immediately if it already is.
    pub async fn wait(&self) {
        loop {
            if self.is_armed() {
                return;
            }

            let notified = self.inner.waker.notified();

            // `notify_waiters` only wakes tasks already registered, so the
            // flag is re-checked after registering to close the race with a
            // concurrent `arm`.
            if self.is_armed() {
                return;
            }

            notified.await;
        }
    }
}
