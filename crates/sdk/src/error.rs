/// Error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// RPC error.
    #[error("rpc: {0}")]
    Rpc(#[from] loyalty_rpc::Error),
    /// Protocol bridge error.
    #[error("bridge error {status}: {message}")]
    Bridge {
        /// HTTP status returned by the bridge.
        status: u16,
        /// Error message or body snippet.
        message: String,
    },
    /// Requested program, pass or leaderboard does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Invalid address.
    #[error("invalid address `{0}`")]
    InvalidAddress(String),
    /// Invalid parameters.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// The signing key is not configured.
    #[error("SECRET_KEY is not configured")]
    MissingSecretKey,
    /// The signing key cannot be decoded.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),
    /// Leaderboard aggregation failed.
    #[error("Failed to fetch leaderboard")]
    Leaderboard(#[source] Box<Error>),
    /// Reqwest error.
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// JSON error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Parse url error.
    #[error("parse url: {0}")]
    ParseUrl(#[from] url::ParseError),
    /// Custom error.
    #[error("custom: {0}")]
    Custom(String),
}

impl Error {
    /// Create a custom error.
    pub fn custom(msg: impl ToString) -> Self {
        Self::Custom(msg.to_string())
    }

    /// Returns `true` if the error means the requested entity is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Leaderboard(inner) => inner.is_not_found(),
            _ => false,
        }
    }

    /// Returns `true` if the error was caused by bad caller input.
    pub fn is_bad_request(&self) -> bool {
        match self {
            Self::InvalidAddress(_) | Self::InvalidParams(_) => true,
            Self::Rpc(loyalty_rpc::Error::ParseNetwork(_)) => true,
            Self::Leaderboard(inner) => inner.is_bad_request(),
            _ => false,
        }
    }
}
