use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{Semaphore, TryAcquireError};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::RunError;
use crate::shutdown::{ShutdownReceiver, ShutdownSender, shutdown_channel};

/// Fixed-size set of worker tasks sharing one shutdown signal.
///
/// Shutting the pool down wakes workers that are waiting on the signal (for
/// example during their ramp-up sleep) and gives the rest a grace period.
/// Tasks still running after that are detached, never aborted: an in-flight
/// request cannot be cancelled from here.
pub(crate) struct WorkerPool {
    capacity: usize,
    permits: Arc<Semaphore>,
    shutdown_tx: ShutdownSender,
    handles: Vec<JoinHandle<()>>,
    runtime: Handle,
}

impl WorkerPool {
    pub(crate) fn new(capacity: usize) -> Result<Self, RunError> {
        if capacity > Semaphore::MAX_PERMITS {
            return Err(RunError::PoolTooLarge { capacity });
        }
        let runtime = Handle::try_current().map_err(|_err| RunError::NoRuntime)?;
        let (shutdown_tx, _) = shutdown_channel();
        Ok(Self {
            capacity,
            permits: Arc::new(Semaphore::new(capacity)),
            shutdown_tx,
            handles: Vec::new(),
            runtime,
        })
    }

    pub(crate) fn shutdown_receiver(&self) -> ShutdownReceiver {
        self.shutdown_tx.subscribe()
    }

    pub(crate) fn spawn<F>(&mut self, task: F) -> Result<(), RunError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .try_acquire_owned()
            .map_err(|err| match err {
                TryAcquireError::Closed | TryAcquireError::NoPermits => RunError::PoolFull {
                    capacity: self.capacity,
                },
            })?;
        let handle = self.runtime.spawn(async move {
            let _permit = permit;
            task.await;
        });
        self.handles.push(handle);
        Ok(())
    }

    pub(crate) async fn shutdown(self, grace: Duration) {
        let Self {
            permits,
            shutdown_tx,
            mut handles,
            ..
        } = self;

        drop(shutdown_tx.send(()));
        permits.close();

        let drained = tokio::time::timeout(grace, async {
            for handle in &mut handles {
                if let Err(err) = handle.await {
                    error!("Worker task failed: {}", err);
                }
            }
        })
        .await;

        if drained.is_err() {
            let detached = handles.iter().filter(|handle| !handle.is_finished()).count();
            warn!(
                "Detaching {} worker(s) still in flight after {:?} shutdown grace.",
                detached, grace
            );
        } else {
            debug!("Worker pool drained ({} workers).", handles.len());
        }
    }
}
