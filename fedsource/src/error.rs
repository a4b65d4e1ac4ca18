//! Error types shared by every source adapter

/// Result type alias for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that can occur while talking to a provider
///
/// None of these ever reach the caller of the aggregation engine: they are
/// logged and turned into "no results" (or fallback content).
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Provider answered with a non-2xx status
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },

    /// Provider refused the request because of rate limiting or missing auth
    #[error("Rate limited by {0}")]
    RateLimited(String),

    /// Every candidate endpoint failed
    #[error("All {tried} mirror(s) failed, last error: {last}")]
    AllMirrorsFailed { tried: usize, last: String },

    /// Host discovery failed
    #[error("Host discovery failed: {0}")]
    Discovery(String),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Source is not configured or temporarily disabled
    #[error("Source not available: {0}")]
    Unavailable(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl SourceError {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Builds the error matching an HTTP status code
    pub fn from_status(status: u16, url: impl Into<String>) -> Self {
        match status {
            401 | 429 => Self::RateLimited(url.into()),
            _ => Self::Status {
                status,
                url: url.into(),
            },
        }
    }

    /// Whether the error is a rate limiting refusal
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}
