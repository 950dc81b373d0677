use thiserror::Error;

/// Failures raised by a request executor.
///
/// The `Display` text of the error is what ends up in the error histogram of
/// the metrics aggregator, so variants keep their messages short and stable.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid header name '{header}'")]
    InvalidHeaderName { header: String },
    #[error("Invalid header value for '{header}'")]
    InvalidHeaderValue { header: String },
    #[error("Request timed out")]
    Timeout,
    #[error("Connection failed: {source}")]
    Connect {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body: {source}")]
    Body {
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Other { message: String },
}

impl ExecutorError {
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        ExecutorError::Other {
            message: message.into(),
        }
    }

    /// Classifies a transport error the way the per-attempt accounting expects.
    #[must_use]
    pub fn from_transport(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ExecutorError::Timeout
        } else if source.is_connect() {
            ExecutorError::Connect { source }
        } else if source.is_body() || source.is_decode() {
            ExecutorError::Body { source }
        } else {
            ExecutorError::Request { source }
        }
    }
}
