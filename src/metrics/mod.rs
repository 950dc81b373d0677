//! Metrics aggregation, nearest-rank percentiles, and the text report.
mod aggregator;
mod report;
mod types;

#[cfg(test)]
mod tests;

pub use aggregator::{MetricsAggregator, nearest_rank};
pub use report::{format_fixed_x100, report_lines};
pub use types::{MetricsSummary, RequestOutcome, TRANSPORT_FAILURE_STATUS, is_success_status};
