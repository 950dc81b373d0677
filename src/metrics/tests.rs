use super::*;
use crate::error::{AppError, AppResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| AppError::metrics(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn expect_eq<T>(label: &'static str, actual: T, expected: T) -> AppResult<()>
where
    T: PartialEq + std::fmt::Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(AppError::metrics(format!(
            "{}: expected {:?}, got {:?}",
            label, expected, actual
        )))
    }
}

fn aggregator_with(latencies: &[u64]) -> MetricsAggregator {
    let metrics = MetricsAggregator::new();
    metrics.start_test();
    for latency in latencies {
        metrics.record_request(*latency, 200, true, None);
    }
    metrics
}

#[test]
fn empty_aggregator_reports_zeroes() -> AppResult<()> {
    let metrics = MetricsAggregator::new();
    metrics.start_test();

    expect_eq("total", metrics.total_requests(), 0)?;
    expect_eq("average", metrics.average_response_time(), 0)?;
    expect_eq("min", metrics.min_response_time(), 0)?;
    expect_eq("max", metrics.max_response_time(), 0)?;
    expect_eq("success rate", metrics.success_rate_x100(), 0)?;
    for percentile in [1, 50, 95, 99, 100] {
        expect_eq("percentile", metrics.percentile(percentile), 0)?;
    }
    Ok(())
}

#[test]
fn nearest_rank_uses_ceiling_index() -> AppResult<()> {
    let sorted: Vec<u64> = (1..=10).collect();

    expect_eq("p95 of 10", nearest_rank(&sorted, 95), 10)?;
    expect_eq("p90 of 10", nearest_rank(&sorted, 90), 9)?;
    expect_eq("p50 of 10", nearest_rank(&sorted, 50), 5)?;
    expect_eq("p1 of 10", nearest_rank(&sorted, 1), 1)?;
    expect_eq("p100 of 10", nearest_rank(&sorted, 100), 10)?;
    expect_eq("p0 clamps to first", nearest_rank(&sorted, 0), 1)?;
    expect_eq("empty", nearest_rank(&[], 50), 0)?;
    Ok(())
}

#[test]
fn nearest_rank_p95_of_twenty_picks_nineteenth() -> AppResult<()> {
    let sorted: Vec<u64> = (1..=20).map(|value| value * 10).collect();
    expect_eq("p95 of 20", nearest_rank(&sorted, 95), 190)
}

#[test]
fn percentile_is_monotonic_in_p() -> AppResult<()> {
    let metrics = aggregator_with(&[40, 7, 300, 12, 12, 95, 61, 5, 230, 18, 77]);
    let mut previous = 0;
    for percentile in 1..=100 {
        let value = metrics.percentile(percentile);
        if value < previous {
            return Err(AppError::metrics(format!(
                "p{} = {} dropped below previous {}",
                percentile, value, previous
            )));
        }
        previous = value;
    }
    expect_eq("p100 is max", previous, metrics.max_response_time())
}

#[test]
fn percentile_does_not_reorder_samples() -> AppResult<()> {
    let metrics = aggregator_with(&[30, 10, 20]);
    expect_eq("p50", metrics.percentile(50), 20)?;
    metrics.record_request(5, 200, true, None);
    expect_eq("p1 after append", metrics.percentile(1), 5)?;
    expect_eq("p100 after append", metrics.percentile(100), 30)
}

#[test]
fn mixed_outcomes_update_counts_and_extrema() -> AppResult<()> {
    let metrics = MetricsAggregator::new();
    metrics.start_test();
    for _ in 0..40 {
        metrics.record_request(100, 200, true, None);
    }
    for _ in 0..10 {
        metrics.record_request(200, 503, false, None);
    }

    expect_eq("total", metrics.total_requests(), 50)?;
    expect_eq("successful", metrics.successful_requests(), 40)?;
    expect_eq("failed", metrics.failed_requests(), 10)?;
    expect_eq("success rate", metrics.success_rate_x100(), 8_000)?;
    expect_eq("min", metrics.min_response_time(), 100)?;
    expect_eq("max", metrics.max_response_time(), 200)?;
    expect_eq("average", metrics.average_response_time(), 120)?;
    let statuses = metrics.status_code_distribution();
    expect_eq("200 count", statuses.get(&200).copied(), Some(40))?;
    expect_eq("503 count", statuses.get(&503).copied(), Some(10))?;
    expect_eq("no error messages", metrics.error_distribution().len(), 0)
}

#[test]
fn error_messages_are_counted_only_for_failures() -> AppResult<()> {
    let metrics = MetricsAggregator::new();
    metrics.start_test();
    metrics.record_request(3, 0, false, Some("Connection refused"));
    metrics.record_request(4, 0, false, Some("Connection refused"));
    metrics.record_request(5, 0, false, Some(""));
    metrics.record_request(6, 0, false, None);
    metrics.record_request(7, 200, true, Some("ignored"));

    let errors = metrics.error_distribution();
    expect_eq("distinct messages", errors.len(), 1)?;
    expect_eq(
        "refused count",
        errors.get("Connection refused").copied(),
        Some(2),
    )?;
    expect_eq("status 0", metrics.status_code_distribution().get(&0).copied(), Some(4))
}

#[test]
fn start_test_resets_previous_run() -> AppResult<()> {
    let metrics = aggregator_with(&[1, 2, 3]);
    metrics.record_request(9, 0, false, Some("boom"));
    metrics.end_test();

    metrics.start_test();
    let mut summary = metrics.summary();
    summary.duration_ms = 0;
    expect_eq("summary after reset", summary, MetricsSummary::default())
}

#[test]
fn stopped_aggregator_drops_late_samples() -> AppResult<()> {
    let metrics = aggregator_with(&[10, 20]);
    metrics.stop_recording();
    metrics.record_request(5, 200, true, None);
    metrics.record_request(900, 0, false, Some("Request timed out"));
    metrics.end_test();

    expect_eq("recording", metrics.is_recording(), false)?;
    expect_eq("total", metrics.total_requests(), 2)?;
    expect_eq("min", metrics.min_response_time(), 10)?;
    expect_eq("max", metrics.max_response_time(), 20)?;
    expect_eq("no errors", metrics.error_distribution().len(), 0)?;

    metrics.start_test();
    metrics.record_request(7, 200, true, None);
    expect_eq("recording after restart", metrics.is_recording(), true)?;
    expect_eq("total after restart", metrics.total_requests(), 1)
}

#[test]
fn throughput_uses_at_least_one_second() -> AppResult<()> {
    run_async_test(async {
        let metrics = aggregator_with(&[5, 5, 5, 5, 5]);
        tokio::time::advance(Duration::from_millis(400)).await;
        metrics.end_test();
        expect_eq("sub-second rps", metrics.requests_per_second_x100(), 500)?;

        metrics.start_test();
        for _ in 0..9 {
            metrics.record_request(1, 200, true, None);
        }
        tokio::time::advance(Duration::from_millis(2_500)).await;
        metrics.end_test();
        expect_eq("duration", metrics.test_duration(), Duration::from_millis(2_500))?;
        expect_eq("two whole seconds", metrics.requests_per_second_x100(), 450)
    })
}

#[test]
fn open_run_measures_duration_until_now() -> AppResult<()> {
    run_async_test(async {
        let metrics = MetricsAggregator::new();
        expect_eq("before start", metrics.test_duration(), Duration::ZERO)?;
        metrics.start_test();
        tokio::time::advance(Duration::from_secs(3)).await;
        expect_eq("open duration", metrics.test_duration(), Duration::from_secs(3))
    })
}

#[test]
fn concurrent_recording_loses_no_updates() -> AppResult<()> {
    const THREADS: u64 = 16;
    const PER_THREAD: u64 = 500;

    let metrics = Arc::new(MetricsAggregator::new());
    metrics.start_test();

    let handles: Vec<_> = (0..THREADS)
        .map(|thread_index| {
            let metrics = Arc::clone(&metrics);
            std::thread::spawn(move || {
                for attempt in 0..PER_THREAD {
                    let latency = thread_index * PER_THREAD + attempt + 1;
                    let success = attempt % 2 == 0;
                    let status = if success { 200 } else { 500 };
                    metrics.record_request(latency, status, success, None);
                }
            })
        })
        .collect();
    for handle in handles {
        handle
            .join()
            .map_err(|_panic| AppError::metrics("recorder thread panicked"))?;
    }

    let expected = THREADS * PER_THREAD;
    let summary = metrics.summary();
    expect_eq("total", summary.total_requests, expected)?;
    expect_eq(
        "successful + failed",
        summary.successful_requests + summary.failed_requests,
        summary.total_requests,
    )?;
    expect_eq("min", summary.min_latency_ms, 1)?;
    expect_eq("max", summary.max_latency_ms, expected)?;
    expect_eq("p100", metrics.percentile(100), expected)?;
    let status_total: u64 = summary.status_codes.values().sum();
    expect_eq("status histogram total", status_total, expected)
}

#[test]
fn report_layout_is_stable() -> AppResult<()> {
    run_async_test(async {
        let metrics = MetricsAggregator::new();
        metrics.start_test();
        for _ in 0..3 {
            metrics.record_request(100, 200, true, None);
        }
        metrics.record_request(300, 0, false, Some("Request timed out"));
        tokio::time::advance(Duration::from_millis(2_004)).await;
        metrics.end_test();

        let expected = "\
=== Performance Test Report ===
Test Duration: 2004 ms (2.00 seconds)
Total Requests: 4
Successful: 3 (75.00%)
Failed: 1 (25.00%)
Requests/Second: 2.00

=== Response Times ===
Average: 150 ms
Min: 100 ms
Max: 300 ms
50th Percentile: 100 ms
95th Percentile: 300 ms
99th Percentile: 300 ms

=== Status Code Distribution ===
Status 0: 1 requests
Status 200: 3 requests

=== Error Distribution ===
Request timed out: 1 occurrences
";
        expect_eq("report", metrics.generate_report().as_str(), expected)
    })
}

#[test]
fn report_omits_error_section_without_errors() -> AppResult<()> {
    let metrics = aggregator_with(&[10]);
    metrics.end_test();
    let report = metrics.generate_report();
    if report.contains("Error Distribution") {
        return Err(AppError::metrics("Unexpected error section"));
    }
    if !report.ends_with("Status 200: 1 requests\n") {
        return Err(AppError::metrics(format!("Unexpected report tail: {}", report)));
    }
    Ok(())
}

#[test]
fn formats_fixed_point_values() -> AppResult<()> {
    expect_eq("zero", format_fixed_x100(0).as_str(), "0.00")?;
    expect_eq("fraction", format_fixed_x100(8_005).as_str(), "80.05")?;
    expect_eq("whole", format_fixed_x100(10_000).as_str(), "100.00")
}

#[test]
fn outcome_classifies_status_range() -> AppResult<()> {
    run_async_test(async {
        let start = tokio::time::Instant::now();
        tokio::time::advance(Duration::from_millis(42)).await;

        let ok = RequestOutcome::from_status(start, 204);
        expect_eq("latency", ok.latency_ms, 42)?;
        expect_eq("204 success", ok.success, true)?;
        expect_eq("299 success", RequestOutcome::from_status(start, 299).success, true)?;
        expect_eq("300 failure", RequestOutcome::from_status(start, 300).success, false)?;
        expect_eq("199 failure", RequestOutcome::from_status(start, 199).success, false)?;

        let failed = RequestOutcome::from_error(start, "Connection refused".to_owned());
        expect_eq("transport status", failed.status_code, 0)?;
        expect_eq("transport success", failed.success, false)?;
        expect_eq(
            "transport message",
            failed.error_message.as_deref(),
            Some("Connection refused"),
        )
    })
}

#[test]
fn summary_serializes_histograms_as_json() -> AppResult<()> {
    let metrics = MetricsAggregator::new();
    metrics.start_test();
    metrics.record_request(12, 201, true, None);
    metrics.record_request(40, 0, false, Some("Request timed out"));
    metrics.end_test();

    let json = metrics.summary().to_json()?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    expect_eq("total", value.get("total_requests").cloned(), Some(2.into()))?;
    expect_eq(
        "status 201",
        value.pointer("/status_codes/201").cloned(),
        Some(1.into()),
    )?;
    expect_eq(
        "timeout errors",
        value.pointer("/errors/Request timed out").cloned(),
        Some(1.into()),
    )?;
    expect_eq("p99", value.get("p99_latency_ms").cloned(), Some(40.into()))
}
