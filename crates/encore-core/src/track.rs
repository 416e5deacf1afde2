//! Playable tracks returned by the node, and the now-playing marker.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::queue::QueueItem;

/// Descriptive metadata of a resolved track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// Source-specific identifier (e.g. a video id).
    pub identifier: String,
    /// Track title.
    pub title: String,
    /// Track author / uploader.
    pub author: String,
    /// Canonical URI, when the source has one.
    pub uri: Option<String>,
    /// Length in milliseconds. Meaningless for streams.
    pub length_ms: u64,
    /// Whether the track is a live stream.
    pub is_stream: bool,
}

/// A concrete, playable track as understood by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Node-encoded track blob, handed back verbatim on play.
    pub encoded: String,
    /// Track metadata.
    pub info: TrackInfo,
}

/// Outcome classification of a node search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadType {
    /// A single track (direct URL).
    TrackLoaded,
    /// A playlist URL.
    PlaylistLoaded,
    /// A prefixed search query.
    SearchResult,
    /// The query yielded nothing.
    NoMatches,
    /// The node failed to load the source.
    LoadFailed,
}

/// Result of `PlaybackNode::search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    /// How the node classified the query.
    pub load_type: LoadType,
    /// Candidate tracks, best match first.
    pub tracks: Vec<Track>,
}

impl LoadResult {
    /// A result carrying no tracks.
    #[must_use]
    pub fn empty(load_type: LoadType) -> Self {
        Self {
            load_type,
            tracks: Vec::new(),
        }
    }

    /// Returns the track to play, if the load produced one.
    #[must_use]
    pub fn into_first_playable(self) -> Option<Track> {
        match self.load_type {
            LoadType::TrackLoaded | LoadType::PlaylistLoaded | LoadType::SearchResult => {
                self.tracks.into_iter().next()
            }
            LoadType::NoMatches | LoadType::LoadFailed => None,
        }
    }
}

/// Persisted recovery token for the track handed to the node last.
///
/// Survives a process restart so that a bare `play` can pick up where the
/// guild left off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlayingMarker {
    /// Node-encoded track.
    pub encoded: String,
    /// Source identifier of the track.
    pub identifier: String,
    /// Track title at the time it started.
    pub title: String,
    /// Canonical URI, when known.
    pub uri: Option<String>,
    /// The node query that produced the track.
    pub query: String,
}

impl NowPlayingMarker {
    /// Builds a marker for `track`, resolved from `query`.
    #[must_use]
    pub fn new(track: &Track, query: impl Into<String>) -> Self {
        Self {
            encoded: track.encoded.clone(),
            identifier: track.info.identifier.clone(),
            title: track.info.title.clone(),
            uri: track.info.uri.clone(),
            query: query.into(),
        }
    }

    /// Whether this marker identifies `track`.
    #[must_use]
    pub fn matches(&self, track: &Track) -> bool {
        self.encoded == track.encoded
    }

    /// Reconstructs a resolvable request for the marked track.
    #[must_use]
    pub fn to_request(&self, requester: UserId) -> QueueItem {
        match &self.uri {
            Some(uri) => QueueItem::url(requester, uri.clone()),
            None => QueueItem::search(requester, self.query.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::ItemSource;

    fn track(uri: Option<&str>) -> Track {
        Track {
            encoded: "QAAAjQIAJFJpY2s".to_owned(),
            info: TrackInfo {
                identifier: "dQw4w9WgXcQ".to_owned(),
                title: "Never Gonna Give You Up".to_owned(),
                author: "Rick Astley".to_owned(),
                uri: uri.map(str::to_owned),
                length_ms: 212_000,
                is_stream: false,
            },
        }
    }

    #[test]
    fn test_first_playable_ignores_tracks_of_failed_loads() {
        let result = LoadResult {
            load_type: LoadType::LoadFailed,
            tracks: vec![track(None)],
        };

        assert!(result.into_first_playable().is_none());
    }

    #[test]
    fn test_first_playable_takes_head_of_playlist() {
        let mut second = track(None);
        second.encoded = "second".to_owned();
        let result = LoadResult {
            load_type: LoadType::PlaylistLoaded,
            tracks: vec![track(None), second],
        };

        assert_eq!(result.into_first_playable().unwrap().encoded, "QAAAjQIAJFJpY2s");
    }

    #[test]
    fn test_marker_request_prefers_uri() {
        let marker = NowPlayingMarker::new(
            &track(Some("https://youtube.com/watch?v=dQw4w9WgXcQ")),
            "ytsearch:rick astley",
        );

        let item = marker.to_request(UserId(7));

        assert_eq!(
            item.source,
            ItemSource::Url {
                url: "https://youtube.com/watch?v=dQw4w9WgXcQ".to_owned()
            }
        );
        assert_eq!(item.requester, UserId(7));
    }

    #[test]
    fn test_marker_request_falls_back_to_query() {
        let marker = NowPlayingMarker::new(&track(None), "ytsearch:rick astley");

        let item = marker.to_request(UserId(7));

        assert_eq!(
            item.source,
            ItemSource::Search {
                expression: "ytsearch:rick astley".to_owned()
            }
        );
    }
}
