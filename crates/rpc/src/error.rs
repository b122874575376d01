/// Error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Parse url error.
    #[error("parse url: {0}")]
    ParseUrl(#[from] url::ParseError),
    /// Parse network error.
    #[error("parse network: {0}")]
    ParseNetwork(String),
    /// Missing RPC endpoint for the network.
    #[error("no RPC endpoint configured for {0}")]
    MissingEndpoint(crate::Network),
    /// JSON-RPC error object returned by the server.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// Error code.
        code: i64,
        /// Error message.
        message: String,
    },
    /// HTTP status error.
    #[error("http status {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Response body snippet.
        body: String,
    },
    /// Custom error.
    #[error("custom: {0}")]
    Custom(String),
    /// JSON error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Reqwest error.
    #[cfg(feature = "reqwest")]
    #[error("reqwest: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    /// Create a custom error.
    pub fn custom(msg: impl ToString) -> Self {
        Self::Custom(msg.to_string())
    }
}
