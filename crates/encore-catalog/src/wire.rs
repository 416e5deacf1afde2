//! Spotify Web API response shapes, reduced to what the catalog reads.

use encore_core::catalog::CatalogTrack;
use serde::Deserialize;

use crate::error::CatalogError;

#[derive(Debug, Deserialize)]
pub(crate) struct NamedEntity {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<NamedEntity>,
    pub duration_ms: u64,
}

impl TrackObject {
    /// Local files and removed tracks have no id and cannot be played.
    pub(crate) fn into_catalog_track(self) -> Result<Option<CatalogTrack>, CatalogError> {
        let Some(id) = self.id else {
            return Ok(None);
        };
        let artist = self
            .artists
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::InvalidResponse(format!("track {id} has no artist")))?;
        Ok(Some(CatalogTrack {
            name: self.name,
            artist: artist.name,
            id,
            duration_ms: self.duration_ms,
        }))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Album {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<NamedEntity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Owner {
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Playlist {
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistItem {
    pub track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Recommendations {
    pub tracks: Vec<TrackObject>,
}
