use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::RunError;
use crate::metrics::MetricsAggregator;

use super::executor::RequestExecutorFactory;
use super::latch::CompletionLatch;
use super::pool::WorkerPool;
use super::progress::ProgressSink;
use super::types::{LoadTestConfig, LoadTestResult, RunState};
use super::worker::Worker;

/// Fixed slack added to `test_duration + ramp_up` when waiting for workers.
pub const WAIT_MARGIN: Duration = Duration::from_secs(30);
/// How long a finished run waits for workers to drain before detaching them.
pub const POOL_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
pub const TIMED_OUT_MESSAGE: &str = "Test timed out";

/// Drives a load test: spawns one worker per virtual user, staggers their
/// starts over the ramp-up window, and waits for them within a bounded time.
///
/// The current [`RunState`] is published on a watch channel so callers can
/// follow `Idle -> Running -> Completed | TimedOut | Failed`.
#[derive(Debug)]
pub struct LoadTestRunner {
    state_tx: watch::Sender<RunState>,
    shutdown_grace: Duration,
}

impl Default for LoadTestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadTestRunner {
    #[must_use]
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(RunState::Idle);
        Self {
            state_tx,
            shutdown_grace: POOL_SHUTDOWN_GRACE,
        }
    }

    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        *self.state_tx.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state_tx.subscribe()
    }

    /// Runs one load test to completion, timeout, or setup failure.
    ///
    /// Must be called from within a tokio runtime; without one the run is
    /// reported as failed. The returned metrics are finalized on every path.
    pub async fn run<F>(
        &self,
        config: &LoadTestConfig,
        progress: Arc<dyn ProgressSink>,
        factory: &F,
    ) -> LoadTestResult
    where
        F: RequestExecutorFactory,
    {
        let metrics = Arc::new(MetricsAggregator::new());
        self.transition(RunState::Running);
        metrics.start_test();
        info!(
            "Starting load test: {} {} with {} user(s) x {} request(s), {}s ramp-up.",
            config.request.method.as_str(),
            config.request.url,
            config.concurrent_users.get(),
            config.requests_per_user.get(),
            config.ramp_up_secs
        );

        let mut pool = match WorkerPool::new(config.concurrent_users.get()) {
            Ok(pool) => pool,
            Err(err) => {
                metrics.end_test();
                return self.fail(metrics, &err);
            }
        };

        let latch = Arc::new(CompletionLatch::new(config.concurrent_users.get()));
        let finished = match spawn_workers(config, &metrics, &progress, factory, &mut pool, &latch)
        {
            Ok(()) => Ok(latch.wait_timeout(config.wait_bound()).await),
            Err(err) => Err(err),
        };

        if !matches!(finished, Ok(true)) {
            metrics.stop_recording();
        }
        metrics.end_test();

        let result = match finished {
            Ok(true) => {
                progress.on_test_completed(&metrics);
                self.transition(RunState::Completed);
                info!(
                    "All users finished: {} request(s) in {} ms.",
                    metrics.total_requests(),
                    metrics.test_duration().as_millis()
                );
                LoadTestResult::completed(Arc::clone(&metrics))
            }
            Ok(false) => {
                self.transition(RunState::TimedOut);
                warn!(
                    "Load test timed out after {:?} with {} of {} user(s) unfinished.",
                    config.wait_bound(),
                    latch.remaining(),
                    config.concurrent_users.get()
                );
                LoadTestResult::incomplete(Arc::clone(&metrics), TIMED_OUT_MESSAGE.to_owned())
            }
            Err(err) => self.fail(Arc::clone(&metrics), &err),
        };

        pool.shutdown(self.shutdown_grace).await;
        result
    }

    fn fail(&self, metrics: Arc<MetricsAggregator>, err: &RunError) -> LoadTestResult {
        error!("Load test failed: {}", err);
        self.transition(RunState::Failed);
        LoadTestResult::incomplete(metrics, format!("Test failed: {}", err))
    }

    fn transition(&self, state: RunState) {
        self.state_tx.send_replace(state);
    }
}

fn spawn_workers<F>(
    config: &LoadTestConfig,
    metrics: &Arc<MetricsAggregator>,
    progress: &Arc<dyn ProgressSink>,
    factory: &F,
    pool: &mut WorkerPool,
    latch: &Arc<CompletionLatch>,
) -> Result<(), RunError>
where
    F: RequestExecutorFactory,
{
    let total_users = config.concurrent_users.get();
    let request = Arc::new(config.request.clone());
    let completed_users = Arc::new(AtomicUsize::new(0));

    for user_index in 0..total_users {
        let executor = factory
            .create(user_index)
            .map_err(|source| RunError::ExecutorFactory { user_index, source })?;
        let worker = Worker {
            user_index,
            total_users,
            requests_per_user: config.requests_per_user.get(),
            start_delay: config.start_delay(user_index),
            executor,
            request: Arc::clone(&request),
            metrics: Arc::clone(metrics),
            progress: Arc::clone(progress),
            completed_users: Arc::clone(&completed_users),
        };
        let shutdown_rx = pool.shutdown_receiver();
        let completion = CompletionLatch::guard(latch);
        pool.spawn(worker.run(shutdown_rx, completion))?;
    }

    Ok(())
}
