//! Catalog adapter errors.

use encore_core::error::DomainError;
use thiserror::Error;

/// Failures talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport, status or decode failure.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// No catalog token is configured.
    #[error("catalog credentials are not configured")]
    MissingCredentials,

    /// The catalog returned something unusable.
    #[error("unexpected catalog response: {0}")]
    InvalidResponse(String),

    /// The configured base URL cannot be extended.
    #[error("invalid catalog url: {0}")]
    Url(#[from] url::ParseError),
}

impl From<CatalogError> for DomainError {
    fn from(err: CatalogError) -> Self {
        Self::ExternalService(err.to_string())
    }
}
