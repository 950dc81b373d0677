use clap::Parser;
use std::time::Duration;

use super::defaults::{
    DEFAULT_DURATION_SECS, DEFAULT_REQUEST_TIMEOUT, DEFAULT_REQUESTS_PER_USER, DEFAULT_USERS,
};
use super::parsers::{parse_duration_arg, parse_header, parse_positive_usize};
use super::types::{HttpMethod, OutputFormat, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP load generator: ramps up virtual users, records every request, and prints latency percentiles."
)]
pub struct TesterArgs {
    /// Target URL for the load test
    #[arg(long, short)]
    pub url: Option<String>,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body data
    #[arg(long, short, default_value = "")]
    pub data: String,

    /// Number of concurrent virtual users
    #[arg(
        long,
        short = 'c',
        alias = "concurrency",
        default_value = DEFAULT_USERS,
        value_parser = parse_positive_usize
    )]
    pub users: PositiveUsize,

    /// Sequential requests issued by each user
    #[arg(
        long = "requests",
        short = 'n',
        default_value = DEFAULT_REQUESTS_PER_USER,
        value_parser = parse_positive_usize
    )]
    pub requests_per_user: PositiveUsize,

    /// Seconds over which users are started (0 starts all at once)
    #[arg(long = "ramp-up", short = 'r', default_value_t = 0)]
    pub ramp_up_secs: u64,

    /// Nominal test duration in seconds; bounds how long the run may take
    #[arg(long = "duration", short = 't', default_value = DEFAULT_DURATION_SECS)]
    pub duration_secs: u64,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "request-timeout",
        alias = "timeout",
        default_value = DEFAULT_REQUEST_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Path to a TOML or JSON config file
    #[arg(long)]
    pub config: Option<String>,

    /// Report format written to stdout
    #[arg(long = "output-format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
