//! Cooperative cancellation of fetches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

/// Checked by the fetcher before every ledger lookup.
#[async_trait]
pub trait CancellationToken: Send + Sync {
    /// Resolves once cancellation is requested.
    async fn cancelled(&self);

    /// Non-blocking check.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Token that never fires.
pub struct NeverCancel;

#[async_trait]
impl CancellationToken for NeverCancel {
    async fn cancelled(&self) {
        futures::future::pending::<()>().await;
    }
}

#[derive(Default)]
struct FlagInner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shareable token tripped by [`CancelFlag::cancel`]. Clones share state.
#[derive(Clone, Default)]
pub struct CancelFlag {
    inner: Arc<FlagInner>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }
}

#[async_trait]
impl CancellationToken for CancelFlag {
    async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for CancelFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelFlag")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
