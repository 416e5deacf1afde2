//! Music catalog abstraction.
//!
//! Only consulted at enqueue time, never on the node-event path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A track as described by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    /// Track name.
    pub name: String,
    /// Primary artist name.
    pub artist: String,
    /// Catalog id.
    pub id: String,
    /// Length in milliseconds.
    pub duration_ms: u64,
}

/// Track-list entity kinds that expand to many tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogListKind {
    /// An album.
    Album,
    /// A user playlist.
    Playlist,
}

impl CatalogListKind {
    /// Path segment used by the catalog for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Playlist => "playlist",
        }
    }
}

/// An album or playlist with its tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogList {
    /// List name.
    pub name: String,
    /// Album artist or playlist owner.
    pub author: String,
    /// Tracks in list order.
    pub tracks: Vec<CatalogTrack>,
}

/// The external music catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Looks up one track.
    async fn get_track(&self, id: &str) -> Result<CatalogTrack, DomainError>;

    /// Looks up an album or playlist and all of its tracks.
    async fn get_tracks(&self, kind: CatalogListKind, id: &str)
    -> Result<CatalogList, DomainError>;

    /// Recommendations seeded by `seed_track_id`, personalised when the
    /// user's authorization is supplied.
    async fn get_recommendations(
        &self,
        seed_track_id: &str,
        user_auth: Option<&str>,
    ) -> Result<Vec<CatalogTrack>, DomainError>;
}
