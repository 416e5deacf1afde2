//! `Catalog` backed by the Spotify Web API.

use std::time::Duration;

use async_trait::async_trait;
use encore_core::catalog::{Catalog, CatalogList, CatalogListKind, CatalogTrack};
use encore_core::error::DomainError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::CatalogError;
use crate::wire::{Album, NamedEntity, Page, Playlist, PlaylistItem, Recommendations, TrackObject};

const DEFAULT_BASE_URL: &str = "https://api.spotify.com/v1/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ALBUM_PAGE_SIZE: usize = 50;
const PLAYLIST_PAGE_SIZE: usize = 100;
const RECOMMENDATION_LIMIT: usize = 30;
const PERSONAL_SEED_TRACKS: usize = 2;
const PERSONAL_SEED_ARTISTS: usize = 1;

/// Spotify catalog client.
///
/// The app token is obtained outside this crate and supplied as-is; without
/// one every lookup fails with `ExternalService`.
#[derive(Debug, Clone)]
pub struct SpotifyCatalog {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl SpotifyCatalog {
    /// Client for the public Spotify API.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the HTTP client cannot be built.
    pub fn new(token: Option<String>) -> Result<Self, CatalogError> {
        Self::with_base_url(Url::parse(DEFAULT_BASE_URL)?, token)
    }

    /// Client for a Spotify-compatible API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the HTTP client cannot be built.
    pub fn with_base_url(base_url: Url, token: Option<String>) -> Result<Self, CatalogError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        auth: Option<&str>,
    ) -> Result<T, CatalogError> {
        let token = auth
            .or(self.token.as_deref())
            .ok_or(CatalogError::MissingCredentials)?;
        let url = self.base_url.join(path)?;
        let body = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(path, "catalog request succeeded");
        Ok(body)
    }

    async fn track_object(&self, id: &str) -> Result<TrackObject, CatalogError> {
        self.get(&format!("tracks/{id}"), &[], None).await
    }

    async fn list_header(
        &self,
        kind: CatalogListKind,
        id: &str,
    ) -> Result<(String, String), CatalogError> {
        match kind {
            CatalogListKind::Album => {
                let album: Album = self.get(&format!("albums/{id}"), &[], None).await?;
                let author = album
                    .artists
                    .into_iter()
                    .next()
                    .map(|a| a.name)
                    .unwrap_or_default();
                Ok((album.name, author))
            }
            CatalogListKind::Playlist => {
                let playlist: Playlist = self
                    .get(
                        &format!("playlists/{id}"),
                        &[("fields", "name,owner.display_name".to_owned())],
                        None,
                    )
                    .await?;
                Ok((
                    playlist.name,
                    playlist.owner.display_name.unwrap_or_default(),
                ))
            }
        }
    }

    async fn list_tracks(
        &self,
        kind: CatalogListKind,
        id: &str,
    ) -> Result<Vec<CatalogTrack>, CatalogError> {
        let mut tracks = Vec::new();
        let mut offset = 0;
        loop {
            let (objects, has_next, fetched) = match kind {
                CatalogListKind::Album => {
                    let page: Page<TrackObject> = self
                        .get(
                            &format!("albums/{id}/tracks"),
                            &[
                                ("offset", offset.to_string()),
                                ("limit", ALBUM_PAGE_SIZE.to_string()),
                            ],
                            None,
                        )
                        .await?;
                    let fetched = page.items.len();
                    (page.items, page.next.is_some(), fetched)
                }
                CatalogListKind::Playlist => {
                    let page: Page<PlaylistItem> = self
                        .get(
                            &format!("playlists/{id}/tracks"),
                            &[
                                ("offset", offset.to_string()),
                                ("limit", PLAYLIST_PAGE_SIZE.to_string()),
                                ("additional_types", "track".to_owned()),
                            ],
                            None,
                        )
                        .await?;
                    let fetched = page.items.len();
                    let objects: Vec<TrackObject> =
                        page.items.into_iter().filter_map(|i| i.track).collect();
                    (objects, page.next.is_some(), fetched)
                }
            };
            for object in objects {
                if let Some(track) = object.into_catalog_track()? {
                    tracks.push(track);
                }
            }
            offset += fetched;
            if fetched == 0 || !has_next {
                break;
            }
        }
        Ok(tracks)
    }

    async fn personal_seeds(&self, user_auth: &str) -> Result<(Vec<String>, Vec<String>), CatalogError> {
        let tracks: Page<TrackObject> = self
            .get(
                "me/top/tracks",
                &[("limit", PERSONAL_SEED_TRACKS.to_string())],
                Some(user_auth),
            )
            .await?;
        let artists: Page<NamedEntity> = self
            .get(
                "me/top/artists",
                &[("limit", PERSONAL_SEED_ARTISTS.to_string())],
                Some(user_auth),
            )
            .await?;
        Ok((
            tracks.items.into_iter().filter_map(|t| t.id).collect(),
            artists.items.into_iter().filter_map(|a| a.id).collect(),
        ))
    }
}

#[async_trait]
impl Catalog for SpotifyCatalog {
    #[instrument(skip(self))]
    async fn get_track(&self, id: &str) -> Result<CatalogTrack, DomainError> {
        self.track_object(id)
            .await?
            .into_catalog_track()?
            .ok_or_else(|| {
                CatalogError::InvalidResponse(format!("track {id} is unavailable")).into()
            })
    }

    #[instrument(skip(self))]
    async fn get_tracks(
        &self,
        kind: CatalogListKind,
        id: &str,
    ) -> Result<CatalogList, DomainError> {
        let (name, author) = self.list_header(kind, id).await?;
        let tracks = self.list_tracks(kind, id).await?;
        Ok(CatalogList {
            name,
            author,
            tracks,
        })
    }

    #[instrument(skip(self, user_auth))]
    async fn get_recommendations(
        &self,
        seed_track_id: &str,
        user_auth: Option<&str>,
    ) -> Result<Vec<CatalogTrack>, DomainError> {
        let seed = self.track_object(seed_track_id).await?;
        let mut seed_tracks = vec![seed_track_id.to_owned()];
        let mut seed_artists: Vec<String> = seed
            .artists
            .into_iter()
            .take(1)
            .filter_map(|a| a.id)
            .collect();

        if let Some(user_auth) = user_auth {
            match self.personal_seeds(user_auth).await {
                Ok((tracks, artists)) => {
                    seed_tracks.extend(tracks);
                    seed_artists.extend(artists);
                }
                Err(e) => warn!(error = %e, "personal seeds unavailable, using track seed only"),
            }
        }

        let recommendations: Recommendations = self
            .get(
                "recommendations",
                &[
                    ("seed_tracks", seed_tracks.join(",")),
                    ("seed_artists", seed_artists.join(",")),
                    ("limit", RECOMMENDATION_LIMIT.to_string()),
                ],
                None,
            )
            .await?;

        let mut tracks = Vec::with_capacity(recommendations.tracks.len());
        for object in recommendations.tracks {
            if let Some(track) = object.into_catalog_track()? {
                tracks.push(track);
            }
        }
        Ok(tracks)
    }
}
