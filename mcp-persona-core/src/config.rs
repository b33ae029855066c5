use std::time::Duration;

/// Base URL used when neither `--api-url` nor `PERSONA_API_URL` is given.
pub const DEFAULT_API_URL: &str = "http://localhost:5050/api/v1";

/// Connection settings for the persona REST API. Fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL the `/personas` and `/field-config` paths are appended to.
    pub base_url: String,
    /// Applied to every request. There is no per-call override.
    pub timeout: Duration,
    /// Sent as `Authorization: Bearer <token>` when set.
    pub auth_token: Option<String>,
}

impl ApiConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
