pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!("loadburst/", env!("CARGO_PKG_VERSION"));

pub(super) const DEFAULT_USERS: &str = "10";
pub(super) const DEFAULT_REQUESTS_PER_USER: &str = "10";
pub(super) const DEFAULT_DURATION_SECS: &str = "60";
/// Per-request timeout applied by the HTTP executor unless overridden.
pub(super) const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
