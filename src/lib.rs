//! Core library for the `loadburst` CLI.
//!
//! The crate drives a fixed number of virtual users against one HTTP
//! endpoint: each user sends its requests sequentially, users are started
//! over a ramp-up window, and every attempt lands in a shared
//! [`metrics::MetricsAggregator`]. The coordinator in [`load`] is independent
//! of HTTP; any [`load::RequestExecutor`] can be plugged in, and the
//! `reqwest` adapter lives in [`http`].
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod load;
pub mod metrics;
pub mod shutdown;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
