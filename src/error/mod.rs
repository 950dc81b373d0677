mod app;
mod config;
mod executor;
mod metrics;
mod run;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use executor::ExecutorError;
pub use metrics::MetricsError;
pub use run::RunError;
pub use validation::ValidationError;
