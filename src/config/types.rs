use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, OutputFormat};
use crate::error::ValidationError;

/// On-disk run configuration. Every field is optional; values given on the
/// command line win over values read here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    #[serde(alias = "concurrency", alias = "concurrent_users")]
    pub users: Option<usize>,
    #[serde(alias = "requests_per_user")]
    pub requests: Option<usize>,
    #[serde(alias = "ramp_up_secs")]
    pub ramp_up: Option<u64>,
    #[serde(alias = "test_duration")]
    pub duration: Option<u64>,
    #[serde(alias = "request_timeout")]
    pub timeout: Option<DurationValue>,
    pub output_format: Option<OutputFormat>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
