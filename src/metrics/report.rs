use super::types::MetricsSummary;

/// Whole percent in hundredths.
const FULL_RATE_X100: u64 = 10_000;
/// Divisor between a fixed-point value and its integer part.
const FIXED_POINT_DIVISOR: u64 = 100;
/// Milliseconds per hundredth of a second.
const MS_PER_CENTISECOND: u64 = 10;
/// Rounding offset when converting milliseconds to centiseconds.
const CENTISECOND_ROUNDING: u64 = 5;

/// Renders a hundredths fixed-point value as `<int>.<frac>`.
#[must_use]
pub fn format_fixed_x100(value: u64) -> String {
    format!(
        "{}.{:02}",
        value / FIXED_POINT_DIVISOR,
        value % FIXED_POINT_DIVISOR
    )
}

/// Report lines in their fixed order.
///
/// Status codes are listed in ascending order and error messages in
/// lexicographic order; the error section is omitted when no error was
/// recorded.
#[must_use]
pub fn report_lines(summary: &MetricsSummary) -> Vec<String> {
    let duration_x100 = summary
        .duration_ms
        .saturating_add(CENTISECOND_ROUNDING)
        / MS_PER_CENTISECOND;
    let failed_rate_x100 = FULL_RATE_X100.saturating_sub(summary.success_rate_x100);

    let mut lines = vec![
        "=== Performance Test Report ===".to_owned(),
        format!(
            "Test Duration: {} ms ({} seconds)",
            summary.duration_ms,
            format_fixed_x100(duration_x100)
        ),
        format!("Total Requests: {}", summary.total_requests),
        format!(
            "Successful: {} ({}%)",
            summary.successful_requests,
            format_fixed_x100(summary.success_rate_x100)
        ),
        format!(
            "Failed: {} ({}%)",
            summary.failed_requests,
            format_fixed_x100(failed_rate_x100)
        ),
        format!(
            "Requests/Second: {}",
            format_fixed_x100(summary.requests_per_second_x100)
        ),
        String::new(),
        "=== Response Times ===".to_owned(),
        format!("Average: {} ms", summary.avg_latency_ms),
        format!("Min: {} ms", summary.min_latency_ms),
        format!("Max: {} ms", summary.max_latency_ms),
        format!("50th Percentile: {} ms", summary.p50_latency_ms),
        format!("95th Percentile: {} ms", summary.p95_latency_ms),
        format!("99th Percentile: {} ms", summary.p99_latency_ms),
        String::new(),
        "=== Status Code Distribution ===".to_owned(),
    ];

    lines.extend(
        summary
            .status_codes
            .iter()
            .map(|(code, count)| format!("Status {}: {} requests", code, count)),
    );

    if !summary.errors.is_empty() {
        lines.push(String::new());
        lines.push("=== Error Distribution ===".to_owned());
        lines.extend(
            summary
                .errors
                .iter()
                .map(|(message, count)| format!("{}: {} occurrences", message, count)),
        );
    }

    lines
}
