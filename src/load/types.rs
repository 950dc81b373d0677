use std::sync::Arc;
use std::time::Duration;

use crate::args::{HttpMethod, PositiveUsize};
use crate::metrics::MetricsAggregator;

use super::coordinator::WAIT_MARGIN;

/// Milliseconds per second.
const MS_PER_SEC: u64 = 1_000;

/// The request every attempt of a run sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Target and load profile of one run.
///
/// Without a timeout a run issues exactly
/// `concurrent_users * requests_per_user` attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTestConfig {
    pub request: RequestSpec,
    pub concurrent_users: PositiveUsize,
    pub requests_per_user: PositiveUsize,
    pub ramp_up_secs: u64,
    /// Only bounds how long the coordinator waits for workers.
    pub test_duration_secs: u64,
}

impl LoadTestConfig {
    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        let users = u64::try_from(self.concurrent_users.get()).unwrap_or(u64::MAX);
        let per_user = u64::try_from(self.requests_per_user.get()).unwrap_or(u64::MAX);
        users.saturating_mul(per_user)
    }

    /// Stagger between two consecutive user starts.
    #[must_use]
    pub fn ramp_up_delay(&self) -> Duration {
        if self.ramp_up_secs == 0 {
            return Duration::ZERO;
        }
        let users = u64::try_from(self.concurrent_users.get()).unwrap_or(u64::MAX);
        let delay_ms = self
            .ramp_up_secs
            .saturating_mul(MS_PER_SEC)
            .checked_div(users)
            .unwrap_or(0);
        Duration::from_millis(delay_ms)
    }

    /// Sleep before the first attempt of the zero-based `user_index`.
    #[must_use]
    pub fn start_delay(&self, user_index: usize) -> Duration {
        let index = u32::try_from(user_index).unwrap_or(u32::MAX);
        self.ramp_up_delay().saturating_mul(index)
    }

    /// Upper bound of the coordinator's wait for all workers.
    #[must_use]
    pub fn wait_bound(&self) -> Duration {
        Duration::from_secs(self.test_duration_secs.saturating_add(self.ramp_up_secs))
            .saturating_add(WAIT_MARGIN)
    }
}

/// Lifecycle of a [`super::LoadTestRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    TimedOut,
    Failed,
}

impl RunState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::TimedOut | RunState::Failed
        )
    }
}

/// Final outcome of a run. Failures are carried as data, never as `Err`.
#[derive(Debug, Clone)]
pub struct LoadTestResult {
    pub metrics: Arc<MetricsAggregator>,
    pub completed: bool,
    pub error_message: Option<String>,
}

impl LoadTestResult {
    pub(crate) const fn completed(metrics: Arc<MetricsAggregator>) -> Self {
        Self {
            metrics,
            completed: true,
            error_message: None,
        }
    }

    pub(crate) const fn incomplete(metrics: Arc<MetricsAggregator>, message: String) -> Self {
        Self {
            metrics,
            completed: false,
            error_message: Some(message),
        }
    }
}
