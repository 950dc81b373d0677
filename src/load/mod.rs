//! Load generation: configuration, workers, and the run coordinator.
mod coordinator;
mod executor;
mod latch;
mod pool;
mod progress;
mod types;
mod worker;


pub use coordinator::{LoadTestRunner, POOL_SHUTDOWN_GRACE, TIMED_OUT_MESSAGE, WAIT_MARGIN};
pub use executor::{RequestExecutor, RequestExecutorFactory};
pub use progress::{LogProgress, NoopProgress, ProgressSink, RequestProgress};
pub use types::{LoadTestConfig, LoadTestResult, RequestSpec, RunState};
pub use worker::execute_attempt;
