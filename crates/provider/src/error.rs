#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed model output: {0}")]
    Decode(String),

    #[error("gateway misconfigured: {0}")]
    Config(String),
}

impl GatewayError {
    /// The transient/fatal partition the agent retry loop keys on.
    /// Decode failures count as transient: a resample usually fixes them.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(_) | GatewayError::RateLimited { .. } => true,
            GatewayError::Decode(_) => true,
            GatewayError::Http { status, .. } => *status == 408 || *status >= 500,
            GatewayError::Config(_) => false,
        }
    }

    pub fn from_http(status: u16, body: String, retry_after: Option<&str>) -> Self {
        if status == 429 {
            let retry_after_ms = retry_after
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return GatewayError::RateLimited { retry_after_ms };
        }
        GatewayError::Http { status, body }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}
