//! Stub catalog — canned `Catalog` lookups for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use encore_core::catalog::{Catalog, CatalogList, CatalogListKind, CatalogTrack};
use encore_core::error::DomainError;

/// A catalog answering from in-memory tables. Unknown ids fail with
/// `ExternalService`, the way a 404 from the real catalog does.
#[derive(Debug, Default)]
pub struct StubCatalog {
    tracks: HashMap<String, CatalogTrack>,
    lists: HashMap<(CatalogListKind, String), CatalogList>,
    recommendations: Vec<CatalogTrack>,
    recommendation_auth: Mutex<Vec<Option<String>>>,
}

impl StubCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single track.
    #[must_use]
    pub fn with_track(mut self, track: CatalogTrack) -> Self {
        self.tracks.insert(track.id.clone(), track);
        self
    }

    /// Adds an album or playlist.
    #[must_use]
    pub fn with_list(mut self, kind: CatalogListKind, id: &str, list: CatalogList) -> Self {
        self.lists.insert((kind, id.to_owned()), list);
        self
    }

    /// Sets the recommendations returned for any seed.
    #[must_use]
    pub fn with_recommendations(mut self, tracks: Vec<CatalogTrack>) -> Self {
        self.recommendations = tracks;
        self
    }

    /// User authorizations passed to `get_recommendations`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recommendation_auth(&self) -> Vec<Option<String>> {
        self.recommendation_auth.lock().unwrap().clone()
    }
}

/// Builds a catalog track whose fields derive from `id`.
#[must_use]
pub fn catalog_track(id: &str) -> CatalogTrack {
    CatalogTrack {
        name: format!("Song {id}"),
        artist: format!("Artist {id}"),
        id: id.to_owned(),
        duration_ms: 200_000,
    }
}

#[async_trait]
impl Catalog for StubCatalog {
    async fn get_track(&self, id: &str) -> Result<CatalogTrack, DomainError> {
        self.tracks
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::ExternalService(format!("catalog track {id} not found")))
    }

    async fn get_tracks(
        &self,
        kind: CatalogListKind,
        id: &str,
    ) -> Result<CatalogList, DomainError> {
        self.lists.get(&(kind, id.to_owned())).cloned().ok_or_else(|| {
            DomainError::ExternalService(format!("catalog {} {id} not found", kind.as_str()))
        })
    }

    async fn get_recommendations(
        &self,
        _seed_track_id: &str,
        user_auth: Option<&str>,
    ) -> Result<Vec<CatalogTrack>, DomainError> {
        self.recommendation_auth
            .lock()
            .unwrap()
            .push(user_auth.map(str::to_owned));
        Ok(self.recommendations.clone())
    }
}
