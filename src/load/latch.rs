use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Count-down barrier the coordinator waits on until every worker exited.
#[derive(Debug)]
pub(crate) struct CompletionLatch {
    remaining: AtomicUsize,
    notify: Notify,
}

impl CompletionLatch {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            notify: Notify::new(),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub(crate) fn count_down(&self) {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            });
        if previous == Ok(1) {
            self.notify.notify_waiters();
        }
    }

    /// Token that counts the latch down when dropped, including on unwind.
    pub(crate) fn guard(latch: &Arc<Self>) -> LatchGuard {
        LatchGuard {
            latch: Arc::clone(latch),
        }
    }

    pub(crate) async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.remaining() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Returns `false` when `bound` elapsed before the count reached zero.
    pub(crate) async fn wait_timeout(&self, bound: Duration) -> bool {
        tokio::time::timeout(bound, self.wait()).await.is_ok()
    }
}

#[derive(Debug)]
pub(crate) struct LatchGuard {
    latch: Arc<CompletionLatch>,
}

impl Drop for LatchGuard {
    fn drop(&mut self) {
        self.latch.count_down();
    }
}
