//! Lavalink adapter errors.

use encore_core::error::DomainError;
use thiserror::Error;

/// Failures talking to the Lavalink node.
#[derive(Debug, Error)]
pub enum LavalinkError {
    /// REST transport or status failure.
    #[error("lavalink request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Websocket transport failure.
    #[error("lavalink websocket failed: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The configured node address is unusable.
    #[error("invalid lavalink url: {0}")]
    Url(String),

    /// A websocket handshake header could not be encoded.
    #[error("invalid lavalink header: {0}")]
    Header(String),

    /// The node has not sent its `ready` frame yet.
    #[error("lavalink session not established")]
    NoSession,
}

impl From<url::ParseError> for LavalinkError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err.to_string())
    }
}

impl From<LavalinkError> for DomainError {
    fn from(err: LavalinkError) -> Self {
        Self::ExternalService(err.to_string())
    }
}
