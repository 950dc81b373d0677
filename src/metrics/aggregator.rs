use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use super::report::report_lines;
use super::types::{MetricsSummary, RequestOutcome};

/// Sentinel held by the running minimum until the first sample lands.
const NO_MIN_SAMPLE: u64 = u64::MAX;
/// Percent divisor for nearest-rank indexing.
const PERCENT_DIVISOR: u64 = 100;
/// Hundredths of a percent in a whole ratio.
const RATE_SCALE_X100: u64 = 10_000;
/// Fixed-point scale for per-second throughput.
const RPS_SCALE_X100: u64 = 100;
/// Report percentiles.
const PERCENTILE_P50: u64 = 50;
const PERCENTILE_P95: u64 = 95;
const PERCENTILE_P99: u64 = 99;

#[derive(Debug, Default, Clone, Copy)]
struct TestClock {
    started: Option<Instant>,
    ended: Option<Instant>,
}

/// Shared accumulator written by every worker of a run.
///
/// Counters and extrema are plain atomics; the sample buffer and the two
/// histograms sit behind their own mutexes so a single `record_request` never
/// loses an update under arbitrary interleaving. The total request count is
/// derived from the successful and failed counters, so
/// `successful + failed == total` holds for every observation.
///
/// Once [`stop_recording`](Self::stop_recording) is called, further samples
/// are dropped until the next [`start_test`](Self::start_test).
#[derive(Debug)]
pub struct MetricsAggregator {
    recording: AtomicBool,
    successful: AtomicU64,
    failed: AtomicU64,
    latency_sum_ms: AtomicU64,
    min_latency_ms: AtomicU64,
    max_latency_ms: AtomicU64,
    samples: Mutex<Vec<u64>>,
    status_codes: Mutex<BTreeMap<u16, u64>>,
    errors: Mutex<BTreeMap<String, u64>>,
    clock: Mutex<TestClock>,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsAggregator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            recording: AtomicBool::new(true),
            successful: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            latency_sum_ms: AtomicU64::new(0),
            min_latency_ms: AtomicU64::new(NO_MIN_SAMPLE),
            max_latency_ms: AtomicU64::new(0),
            samples: Mutex::new(Vec::new()),
            status_codes: Mutex::new(BTreeMap::new()),
            errors: Mutex::new(BTreeMap::new()),
            clock: Mutex::new(TestClock {
                started: None,
                ended: None,
            }),
        }
    }

    /// Clears every counter, histogram and sample, then stamps the start instant.
    pub fn start_test(&self) {
        self.successful.store(0, Ordering::Release);
        self.failed.store(0, Ordering::Release);
        self.latency_sum_ms.store(0, Ordering::Release);
        self.min_latency_ms.store(NO_MIN_SAMPLE, Ordering::Release);
        self.max_latency_ms.store(0, Ordering::Release);
        lock(&self.samples).clear();
        lock(&self.status_codes).clear();
        lock(&self.errors).clear();

        let mut clock = lock(&self.clock);
        clock.started = Some(Instant::now());
        clock.ended = None;
        self.recording.store(true, Ordering::Release);
    }

    /// Drops every sample recorded from now on, until the next `start_test`.
    pub fn stop_recording(&self) {
        self.recording.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// Stamps the end instant. Statistics read after this point are final once
    /// every worker has stopped.
    pub fn end_test(&self) {
        lock(&self.clock).ended = Some(Instant::now());
    }

    /// Records one finished attempt.
    pub fn record_request(
        &self,
        latency_ms: u64,
        status_code: u16,
        success: bool,
        error_message: Option<&str>,
    ) {
        if !self.is_recording() {
            return;
        }
        self.latency_sum_ms.fetch_add(latency_ms, Ordering::AcqRel);
        self.min_latency_ms.fetch_min(latency_ms, Ordering::AcqRel);
        self.max_latency_ms.fetch_max(latency_ms, Ordering::AcqRel);
        lock(&self.samples).push(latency_ms);
        increment(&mut lock(&self.status_codes), status_code);

        if success {
            self.successful.fetch_add(1, Ordering::AcqRel);
        } else {
            if let Some(message) = error_message.filter(|message| !message.is_empty()) {
                let mut errors = lock(&self.errors);
                match errors.get_mut(message) {
                    Some(count) => *count = count.saturating_add(1),
                    None => {
                        errors.insert(message.to_owned(), 1);
                    }
                }
            }
            self.failed.fetch_add(1, Ordering::AcqRel);
        }
    }

    pub fn record(&self, outcome: &RequestOutcome) {
        self.record_request(
            outcome.latency_ms,
            outcome.status_code,
            outcome.success,
            outcome.error_message.as_deref(),
        );
    }

    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.successful_requests()
            .saturating_add(self.failed_requests())
    }

    #[must_use]
    pub fn successful_requests(&self) -> u64 {
        self.successful.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn failed_requests(&self) -> u64 {
        self.failed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn average_response_time(&self) -> u64 {
        average(
            self.latency_sum_ms.load(Ordering::Acquire),
            self.total_requests(),
        )
    }

    #[must_use]
    pub fn min_response_time(&self) -> u64 {
        match self.min_latency_ms.load(Ordering::Acquire) {
            NO_MIN_SAMPLE => 0,
            value => value,
        }
    }

    #[must_use]
    pub fn max_response_time(&self) -> u64 {
        self.max_latency_ms.load(Ordering::Acquire)
    }

    /// Success rate in hundredths of a percent, rounded half-up.
    #[must_use]
    pub fn success_rate_x100(&self) -> u64 {
        let successful = self.successful_requests();
        success_rate_x100(
            successful,
            successful.saturating_add(self.failed_requests()),
        )
    }

    /// Elapsed time between `start_test` and `end_test`, or until now while
    /// the run is still open. Zero before the first `start_test`.
    #[must_use]
    pub fn test_duration(&self) -> Duration {
        let clock = *lock(&self.clock);
        match (clock.started, clock.ended) {
            (Some(started), Some(ended)) => ended.saturating_duration_since(started),
            (Some(started), None) => started.elapsed(),
            (None, Some(_) | None) => Duration::ZERO,
        }
    }

    /// Requests per whole second of test duration (at least one second), in
    /// hundredths.
    #[must_use]
    pub fn requests_per_second_x100(&self) -> u64 {
        requests_per_second_x100(self.total_requests(), self.test_duration())
    }

    /// Nearest-rank percentile of every recorded latency; `0` when nothing was
    /// recorded. The shared sample buffer is never reordered.
    #[must_use]
    pub fn percentile(&self, percentile: u64) -> u64 {
        nearest_rank(&self.sorted_samples(), percentile)
    }

    #[must_use]
    pub fn status_code_distribution(&self) -> BTreeMap<u16, u64> {
        lock(&self.status_codes).clone()
    }

    #[must_use]
    pub fn error_distribution(&self) -> BTreeMap<String, u64> {
        lock(&self.errors).clone()
    }

    /// Snapshot of all derived statistics, computed from a single read of the
    /// counters.
    #[must_use]
    pub fn summary(&self) -> MetricsSummary {
        let successful = self.successful_requests();
        let failed = self.failed_requests();
        let total = successful.saturating_add(failed);
        let duration = self.test_duration();
        let sorted = self.sorted_samples();

        MetricsSummary {
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            total_requests: total,
            successful_requests: successful,
            failed_requests: failed,
            success_rate_x100: success_rate_x100(successful, total),
            requests_per_second_x100: requests_per_second_x100(total, duration),
            avg_latency_ms: average(self.latency_sum_ms.load(Ordering::Acquire), total),
            min_latency_ms: self.min_response_time(),
            max_latency_ms: self.max_response_time(),
            p50_latency_ms: nearest_rank(&sorted, PERCENTILE_P50),
            p95_latency_ms: nearest_rank(&sorted, PERCENTILE_P95),
            p99_latency_ms: nearest_rank(&sorted, PERCENTILE_P99),
            status_codes: self.status_code_distribution(),
            errors: self.error_distribution(),
        }
    }

    /// Human-readable report. The layout is stable and consumed verbatim by
    /// exporters.
    #[must_use]
    pub fn generate_report(&self) -> String {
        let mut report = report_lines(&self.summary()).join("\n");
        report.push('\n');
        report
    }

    fn sorted_samples(&self) -> Vec<u64> {
        let mut sorted = lock(&self.samples).clone();
        sorted.sort_unstable();
        sorted
    }
}

/// Value at zero-based index `clamp(ceil(len * p / 100) - 1, 0, len - 1)` of
/// an ascending slice.
#[must_use]
pub fn nearest_rank(sorted: &[u64], percentile: u64) -> u64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return 0;
    };
    let len = u64::try_from(sorted.len()).unwrap_or(u64::MAX);
    let rank = len
        .saturating_mul(percentile)
        .div_ceil(PERCENT_DIVISOR);
    let index = usize::try_from(rank.saturating_sub(1))
        .unwrap_or(last)
        .min(last);
    sorted.get(index).copied().unwrap_or(0)
}

fn average(sum: u64, count: u64) -> u64 {
    sum.checked_div(count).unwrap_or(0)
}

fn success_rate_x100(successful: u64, total: u64) -> u64 {
    rounded_ratio(
        u128::from(successful).saturating_mul(u128::from(RATE_SCALE_X100)),
        u128::from(total),
    )
}

fn requests_per_second_x100(total: u64, duration: Duration) -> u64 {
    let seconds = duration.as_secs().max(1);
    rounded_ratio(
        u128::from(total).saturating_mul(u128::from(RPS_SCALE_X100)),
        u128::from(seconds),
    )
}

fn rounded_ratio(numerator: u128, denominator: u128) -> u64 {
    let half = denominator.checked_div(2).unwrap_or(0);
    let scaled = numerator
        .saturating_add(half)
        .checked_div(denominator)
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

fn increment(counts: &mut BTreeMap<u16, u64>, key: u16) {
    let count = counts.entry(key).or_insert(0);
    *count = count.saturating_add(1);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
