#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let summary = loadburst::fuzzing::record_samples(data);
    let samples = (data.len() / 3) as u64;
    debug_assert_eq!(summary.total_requests, samples);
    debug_assert_eq!(
        summary.successful_requests + summary.failed_requests,
        summary.total_requests
    );
    debug_assert!(summary.success_rate_x100 <= 10_000);
    debug_assert!(summary.min_latency_ms <= summary.p50_latency_ms);
    debug_assert!(summary.p50_latency_ms <= summary.p95_latency_ms);
    debug_assert!(summary.p95_latency_ms <= summary.p99_latency_ms);
    debug_assert!(summary.p99_latency_ms <= summary.max_latency_ms);
    debug_assert_eq!(summary.status_codes.values().sum::<u64>(), samples);
});
