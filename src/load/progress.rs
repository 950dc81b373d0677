use tracing::{debug, info, trace};

use crate::metrics::{MetricsAggregator, format_fixed_x100};

/// One finished attempt, as reported to a [`ProgressSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestProgress {
    pub user_index: usize,
    /// 1-based count of attempts this user has finished.
    pub completed_requests: usize,
    pub total_requests: usize,
    pub latency_ms: u64,
    pub status_code: u16,
    pub success: bool,
}

/// Receives run progress.
///
/// `on_user_completed` and `on_request_completed` are called directly on the
/// worker tasks, concurrently and in no particular order; implementations
/// handle their own synchronization. `on_test_completed` is called once by
/// the coordinator when every worker finished in time.
pub trait ProgressSink: Send + Sync {
    fn on_user_completed(&self, user_index: usize, completed_users: usize, total_users: usize);

    fn on_request_completed(&self, progress: RequestProgress);

    fn on_test_completed(&self, metrics: &MetricsAggregator);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_user_completed(&self, _user_index: usize, _completed_users: usize, _total_users: usize) {
    }

    fn on_request_completed(&self, _progress: RequestProgress) {}

    fn on_test_completed(&self, _metrics: &MetricsAggregator) {}
}

/// Reports progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_user_completed(&self, user_index: usize, completed_users: usize, total_users: usize) {
        info!(
            "User {} finished ({}/{} users done)",
            user_index, completed_users, total_users
        );
    }

    fn on_request_completed(&self, progress: RequestProgress) {
        trace!(
            user = progress.user_index,
            request = progress.completed_requests,
            of = progress.total_requests,
            latency_ms = progress.latency_ms,
            status = progress.status_code,
            success = progress.success,
            "request finished"
        );
        if progress.completed_requests == progress.total_requests {
            debug!(
                "User {} sent its last request ({} total)",
                progress.user_index, progress.total_requests
            );
        }
    }

    fn on_test_completed(&self, metrics: &MetricsAggregator) {
        info!(
            "Load test completed: {} requests, {}% successful",
            metrics.total_requests(),
            format_fixed_x100(metrics.success_rate_x100())
        );
    }
}
