use std::collections::BTreeMap;

use serde::Serialize;
use tokio::time::Instant;

use crate::error::MetricsError;

/// Status code recorded for attempts that never produced an HTTP response.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

const SUCCESS_STATUS_RANGE: std::ops::RangeInclusive<u16> = 200..=299;

/// One completed request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub latency_ms: u64,
    pub status_code: u16,
    pub success: bool,
    pub error_message: Option<String>,
}

impl RequestOutcome {
    /// Outcome of an attempt that returned a status code, timed from `start`.
    #[must_use]
    pub fn from_status(start: Instant, status_code: u16) -> Self {
        Self {
            latency_ms: elapsed_ms(start),
            status_code,
            success: is_success_status(status_code),
            error_message: None,
        }
    }

    /// Outcome of an attempt whose executor failed, timed from `start`.
    #[must_use]
    pub fn from_error(start: Instant, message: String) -> Self {
        Self {
            latency_ms: elapsed_ms(start),
            status_code: TRANSPORT_FAILURE_STATUS,
            success: false,
            error_message: Some(message),
        }
    }
}

#[must_use]
pub fn is_success_status(status_code: u16) -> bool {
    SUCCESS_STATUS_RANGE.contains(&status_code)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Point-in-time snapshot of every derived statistic of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSummary {
    pub duration_ms: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Success rate in hundredths of a percent (`8000` is `80.00%`).
    pub success_rate_x100: u64,
    /// Throughput in hundredths of a request per second.
    pub requests_per_second_x100: u64,
    pub avg_latency_ms: u64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub p50_latency_ms: u64,
    pub p95_latency_ms: u64,
    pub p99_latency_ms: u64,
    pub status_codes: BTreeMap<u16, u64>,
    pub errors: BTreeMap<String, u64>,
}

impl MetricsSummary {
    /// Pretty-printed JSON form of the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization fails.
    pub fn to_json(&self) -> Result<String, MetricsError> {
        serde_json::to_string_pretty(self).map_err(|err| MetricsError::Serialize { source: err })
    }
}
