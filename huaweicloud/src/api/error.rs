use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("authentication failed, check the configured credentials")]
    Auth,

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("too many requests, rate limited")]
    RateLimited,

    #[error("service unavailable, retry later")]
    ServiceUnavailable,

    #[error("timeout waiting for state `{target}`, last seen `{last}`")]
    WaitTimeout { target: String, last: String },

    #[error("unexpected state `{state}` while waiting: {reason}")]
    UnexpectedState { state: String, reason: String },
}

impl ApiError {
    /// Whether the error is an HTTP 404, used to map "gone on the remote
    /// side" to removal from Terraform state.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Api { status: 404, .. })
    }
}
