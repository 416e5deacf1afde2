//! Encore — Spotify music catalog.

pub mod error;
pub mod spotify;
mod wire;

pub use error::CatalogError;
pub use spotify::SpotifyCatalog;
