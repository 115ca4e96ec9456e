use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_MAX_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Server root; endpoints are resolved below its path.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request ceiling. `None` waits for the server indefinitely.
    pub request_timeout: Option<Duration>,
    pub redirect_limit: usize,
    /// Ceiling for any single response body.
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            redirect_limit: 5,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}
