//! Entry points exposed to the fuzz targets under `fuzz/`.
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};

use crate::args::{TesterArgs, parse_header};
use crate::config::types::ConfigFile;
use crate::config::{apply_config, parse_duration_value};
use crate::error::{AppError, AppResult};
use crate::metrics::{MetricsAggregator, MetricsSummary};

/// Parses a header string in `Key: Value` format.
///
/// # Errors
///
/// Returns an error when the header is malformed.
pub fn parse_header_input(input: &str) -> AppResult<(String, String)> {
    parse_header(input).map_err(AppError::from)
}

/// Parses a duration value from config or the CLI.
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_value_input(input: &str) -> AppResult<Duration> {
    parse_duration_value(input).map_err(AppError::from)
}

/// Parses a TOML config and applies it on top of default arguments.
///
/// # Errors
///
/// Returns an error when the config cannot be parsed or holds invalid values.
pub fn apply_config_from_toml(input: &str) -> AppResult<TesterArgs> {
    let config: ConfigFile = toml::from_str(input).map_err(|err| {
        AppError::config(crate::error::ConfigError::ParseToml {
            path: "fuzz.toml".into(),
            source: err,
        })
    })?;
    let matches = TesterArgs::command().try_get_matches_from(["loadburst"])?;
    let mut args = TesterArgs::from_arg_matches(&matches)?;
    apply_config(&mut args, &matches, &config)?;
    Ok(args)
}

/// Feeds `(latency, status)` samples decoded from `data` into a fresh
/// aggregator and returns its summary.
///
/// Every three bytes form one sample: a latency byte and two status bytes.
#[must_use]
pub fn record_samples(data: &[u8]) -> MetricsSummary {
    let metrics = MetricsAggregator::new();
    metrics.start_test();
    for chunk in data.chunks_exact(3) {
        if let [latency, high, low] = *chunk {
            let status = u16::from_be_bytes([high, low]);
            let success = crate::metrics::is_success_status(status);
            let message = (!success).then_some("fuzz failure");
            metrics.record_request(u64::from(latency), status, success, message);
        }
    }
    metrics.end_test();
    metrics.summary()
}
