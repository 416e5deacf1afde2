//! Store-level errors.

use encore_core::error::DomainError;
use encore_core::ids::GuildId;
use thiserror::Error;

/// Failures inside the PostgreSQL store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The query itself failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A field value could not be encoded as JSON.
    #[error("document encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The guild id does not fit the BIGINT key.
    #[error("guild id {0} is out of range for the store key")]
    GuildIdOutOfRange(GuildId),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        Self::Infrastructure(err.to_string())
    }
}
