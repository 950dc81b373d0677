use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExecutorError;

use super::types::RequestSpec;

/// Sends one request and reports its status code.
///
/// Timing is measured by the caller around `execute`; response bodies are
/// not interpreted.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Executes the request once.
    ///
    /// # Errors
    ///
    /// Returns an error when no HTTP response was obtained.
    async fn execute(&self, request: &RequestSpec) -> Result<u16, ExecutorError>;
}

#[async_trait]
impl<T> RequestExecutor for Arc<T>
where
    T: RequestExecutor + ?Sized,
{
    async fn execute(&self, request: &RequestSpec) -> Result<u16, ExecutorError> {
        (**self).execute(request).await
    }
}

/// Builds the executor owned by each virtual user.
pub trait RequestExecutorFactory: Send + Sync {
    type Executor: RequestExecutor + 'static;

    /// Creates the executor for the zero-based `user_index`.
    ///
    /// # Errors
    ///
    /// Returns an error when the executor cannot be constructed; the run is
    /// then reported as failed.
    fn create(&self, user_index: usize) -> Result<Self::Executor, ExecutorError>;
}

impl<F, E> RequestExecutorFactory for F
where
    F: Fn(usize) -> Result<E, ExecutorError> + Send + Sync,
    E: RequestExecutor + 'static,
{
    type Executor = E;

    fn create(&self, user_index: usize) -> Result<E, ExecutorError> {
        self(user_index)
    }
}
