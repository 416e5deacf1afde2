//! Domain error types.

use thiserror::Error;

use crate::ids::GuildId;

/// Top-level domain error type.
///
/// A query that resolves to nothing is not an error: it is reported as
/// `Resolution::NotFound` by the resolver and drives auto-advance.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A command argument (index, volume, input) was rejected. No state was
    /// mutated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The playback node or the music catalog failed. Queue bookkeeping is
    /// left untouched and the call is not retried.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Voice permission, capacity or channel-membership failure. Aborts only
    /// the current command.
    #[error("voice error: {0}")]
    Voice(String),

    /// The guild has no voice session.
    #[error("not connected to voice in guild {0}")]
    NotConnected(GuildId),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
