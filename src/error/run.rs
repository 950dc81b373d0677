use thiserror::Error;

use super::ExecutorError;

/// Setup failures of a load test run.
///
/// Individual request failures never surface here; they are recorded as
/// failed outcomes by the worker that issued them.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("No tokio runtime available to spawn workers.")]
    NoRuntime,
    #[error("Cannot run {capacity} users: exceeds the worker pool limit.")]
    PoolTooLarge { capacity: usize },
    #[error("Worker pool is full ({capacity} workers).")]
    PoolFull { capacity: usize },
    #[error("Failed to create request executor for user {user_index}: {source}")]
    ExecutorFactory {
        user_index: usize,
        #[source]
        source: ExecutorError,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
