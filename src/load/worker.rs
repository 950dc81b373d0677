use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::metrics::{MetricsAggregator, RequestOutcome};
use crate::shutdown::ShutdownReceiver;

use super::executor::RequestExecutor;
use super::latch::LatchGuard;
use super::progress::{ProgressSink, RequestProgress};
use super::types::RequestSpec;

/// Sends one request through `executor` and times it on the monotonic clock.
///
/// Executor errors become failed outcomes with status `0` and the error text;
/// they are never propagated.
pub async fn execute_attempt<E>(executor: &E, request: &RequestSpec) -> RequestOutcome
where
    E: RequestExecutor + ?Sized,
{
    let start = Instant::now();
    match executor.execute(request).await {
        Ok(status_code) => RequestOutcome::from_status(start, status_code),
        Err(err) => {
            debug!("Request to {} failed: {}", request.url, err);
            RequestOutcome::from_error(start, err.to_string())
        }
    }
}

/// One virtual user.
pub(crate) struct Worker<E> {
    pub(crate) user_index: usize,
    pub(crate) total_users: usize,
    pub(crate) requests_per_user: usize,
    pub(crate) start_delay: Duration,
    pub(crate) executor: E,
    pub(crate) request: Arc<RequestSpec>,
    pub(crate) metrics: Arc<MetricsAggregator>,
    pub(crate) progress: Arc<dyn ProgressSink>,
    pub(crate) completed_users: Arc<AtomicUsize>,
}

impl<E> Worker<E>
where
    E: RequestExecutor,
{
    /// Waits out the ramp-up delay, then issues every attempt in sequence.
    ///
    /// The completion guard is released on every exit. A shutdown signal only
    /// interrupts the ramp-up sleep; once attempts have started the user runs
    /// to the end.
    pub(crate) async fn run(self, mut shutdown_rx: ShutdownReceiver, completion: LatchGuard) {
        let _completion = completion;

        if !self.start_delay.is_zero() {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("User {} interrupted during ramp-up.", self.user_index);
                    return;
                }
                () = sleep(self.start_delay) => {}
            }
        }

        debug!(
            "User {} starting {} request(s).",
            self.user_index, self.requests_per_user
        );
        self.run_attempts().await;

        let completed_users = self
            .completed_users
            .fetch_add(1, Ordering::AcqRel)
            .saturating_add(1);
        self.progress
            .on_user_completed(self.user_index, completed_users, self.total_users);
    }

    async fn run_attempts(&self) {
        for attempt in 0..self.requests_per_user {
            let outcome = execute_attempt(&self.executor, &self.request).await;
            self.metrics.record(&outcome);
            self.progress.on_request_completed(RequestProgress {
                user_index: self.user_index,
                completed_requests: attempt.saturating_add(1),
                total_requests: self.requests_per_user,
                latency_ms: outcome.latency_ms,
                status_code: outcome.status_code,
                success: outcome.success,
            });
        }
    }
}
