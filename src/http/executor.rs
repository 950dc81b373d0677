use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{
    Client, Method,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use tracing::{debug, error};

use crate::args::{DEFAULT_USER_AGENT, HttpMethod};
use crate::error::ExecutorError;
use crate::load::{RequestExecutor, RequestExecutorFactory, RequestSpec};

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }
}

/// Executor owned by one virtual user. Each user gets its own connection pool.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &RequestSpec) -> Result<u16, ExecutorError> {
        let mut builder = self
            .client
            .request(Method::from(request.method), request.url.as_str());
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await.map_err(ExecutorError::from_transport)?;
        let status = response.status().as_u16();

        // Drain the body so the connection can be reused.
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            chunk.map_err(ExecutorError::from_transport)?;
        }

        Ok(status)
    }
}

/// Builds one [`HttpExecutor`] per user.
///
/// Headers are validated when each client is built. A malformed header makes
/// the first `create` fail, which the runner reports as a failed run before
/// any request is sent.
#[derive(Debug, Clone)]
pub struct HttpExecutorFactory {
    headers: Vec<(String, String)>,
    request_timeout: Duration,
}

impl HttpExecutorFactory {
    #[must_use]
    pub fn new(request: &RequestSpec, request_timeout: Duration) -> Self {
        Self {
            headers: request.headers.clone(),
            request_timeout,
        }
    }

    fn header_map(&self) -> Result<HeaderMap, ExecutorError> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (key, value) in &self.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_invalid| {
                ExecutorError::InvalidHeaderName {
                    header: key.clone(),
                }
            })?;
            let val = HeaderValue::from_str(value).map_err(|_invalid| {
                ExecutorError::InvalidHeaderValue {
                    header: key.clone(),
                }
            })?;
            headers.append(name, val);
        }
        Ok(headers)
    }
}

impl RequestExecutorFactory for HttpExecutorFactory {
    type Executor = HttpExecutor;

    fn create(&self, user_index: usize) -> Result<HttpExecutor, ExecutorError> {
        let headers = self.header_map()?;
        let client = Client::builder()
            .timeout(self.request_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|err| {
                error!("Failed to build HTTP client for user {}: {}", user_index, err);
                ExecutorError::BuildClient { source: err }
            })?;
        debug!("Built HTTP client for user {}", user_index);
        Ok(HttpExecutor { client })
    }
}
