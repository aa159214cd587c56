//! Error types for the registry client

use std::time::Duration;
use thiserror::Error;

/// Result type for registry client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the registry
#[derive(Debug, Error)]
pub enum ClientError {
    /// Websocket transport failure
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The server closed the channel
    #[error("connection closed")]
    Closed,

    /// No message arrived within the request timeout
    #[error("timeout after {0:?} waiting for a message")]
    Timeout(Duration),

    /// An outgoing command could not be encoded
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The access token was rejected
    #[error("authentication failed: {0}")]
    AuthInvalid(String),
}
