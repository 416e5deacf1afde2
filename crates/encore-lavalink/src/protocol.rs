//! Lavalink v4 wire types.

use encore_core::event::TrackEndReason;
use encore_core::track::{LoadResult, LoadType, Track, TrackInfo};
use serde::{Deserialize, Serialize};

/// A track as Lavalink encodes it.
#[derive(Debug, Clone, Deserialize)]
pub struct WireTrack {
    /// Opaque track blob.
    pub encoded: String,
    /// Track metadata.
    pub info: WireTrackInfo,
}

/// Track metadata as Lavalink encodes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTrackInfo {
    /// Source identifier.
    pub identifier: String,
    /// Uploader / artist.
    pub author: String,
    /// Length in milliseconds.
    pub length: u64,
    /// Live stream flag.
    pub is_stream: bool,
    /// Title.
    pub title: String,
    /// Canonical URI.
    pub uri: Option<String>,
}

impl From<WireTrack> for Track {
    fn from(wire: WireTrack) -> Self {
        Self {
            encoded: wire.encoded,
            info: TrackInfo {
                identifier: wire.info.identifier,
                title: wire.info.title,
                author: wire.info.author,
                uri: wire.info.uri,
                length_ms: wire.info.length,
                is_stream: wire.info.is_stream,
            },
        }
    }
}

/// Exception details attached to failed loads and track exceptions.
#[derive(Debug, Clone, Deserialize)]
pub struct WireException {
    /// Message, when the node exposes one.
    pub message: Option<String>,
    /// `common`, `suspicious` or `fault`.
    pub severity: String,
}

/// A playlist load.
#[derive(Debug, Clone, Deserialize)]
pub struct WirePlaylist {
    /// Playlist tracks.
    pub tracks: Vec<WireTrack>,
}

/// Response of `GET /v4/loadtracks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "loadType", content = "data", rename_all = "camelCase")]
pub enum LoadResponse {
    /// A single track.
    Track(WireTrack),
    /// A playlist.
    Playlist(WirePlaylist),
    /// Search results.
    Search(Vec<WireTrack>),
    /// Nothing matched.
    Empty(serde_json::Value),
    /// The load failed.
    Error(WireException),
}

impl From<LoadResponse> for LoadResult {
    fn from(response: LoadResponse) -> Self {
        let (load_type, tracks) = match response {
            LoadResponse::Track(track) => (LoadType::TrackLoaded, vec![track]),
            LoadResponse::Playlist(playlist) => (LoadType::PlaylistLoaded, playlist.tracks),
            LoadResponse::Search(tracks) => (LoadType::SearchResult, tracks),
            LoadResponse::Empty(_) => (LoadType::NoMatches, Vec::new()),
            LoadResponse::Error(_) => (LoadType::LoadFailed, Vec::new()),
        };
        Self {
            load_type,
            tracks: tracks.into_iter().map(Track::from).collect(),
        }
    }
}

/// Track end reason as Lavalink spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireEndReason {
    /// Played to the end.
    Finished,
    /// Failed to load.
    LoadFailed,
    /// Stopped by a player update.
    Stopped,
    /// Replaced by another track.
    Replaced,
    /// Player cleaned up.
    Cleanup,
}

impl From<WireEndReason> for TrackEndReason {
    fn from(reason: WireEndReason) -> Self {
        match reason {
            WireEndReason::Finished => Self::Finished,
            WireEndReason::LoadFailed => Self::LoadFailed,
            WireEndReason::Stopped => Self::Stopped,
            WireEndReason::Replaced => Self::Replaced,
            WireEndReason::Cleanup => Self::Cleanup,
        }
    }
}

/// Player events carried by `op: event` frames.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum WireEvent {
    /// A track started.
    #[serde(rename_all = "camelCase")]
    TrackStartEvent {
        /// Guild id as a string.
        guild_id: String,
        /// The track.
        track: WireTrack,
    },
    /// A track ended.
    #[serde(rename_all = "camelCase")]
    TrackEndEvent {
        /// Guild id as a string.
        guild_id: String,
        /// The track.
        track: WireTrack,
        /// Why it ended.
        reason: WireEndReason,
    },
    /// A track threw while playing.
    #[serde(rename_all = "camelCase")]
    TrackExceptionEvent {
        /// Guild id as a string.
        guild_id: String,
        /// The failure.
        exception: WireException,
    },
    /// A track stopped producing audio.
    #[serde(rename_all = "camelCase")]
    TrackStuckEvent {
        /// Guild id as a string.
        guild_id: String,
        /// How long it was stuck.
        threshold_ms: u64,
    },
    /// The node's voice websocket to the chat platform closed.
    #[serde(rename_all = "camelCase")]
    WebSocketClosedEvent {
        /// Guild id as a string.
        guild_id: String,
        /// Close code.
        code: u16,
        /// Close reason.
        reason: String,
    },
    /// Anything newer than this adapter.
    #[serde(other)]
    Unknown,
}

/// One frame of the node websocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Frame {
    /// Session established.
    #[serde(rename_all = "camelCase")]
    Ready {
        /// Whether a previous session was resumed.
        resumed: bool,
        /// Session id used in REST paths.
        session_id: String,
    },
    /// Periodic player position update.
    PlayerUpdate,
    /// Node statistics.
    Stats,
    /// A player event.
    Event(WireEvent),
    /// Anything newer than this adapter.
    #[serde(other)]
    Unknown,
}

/// Body of `PATCH /v4/sessions/{session}/players/{guild}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    /// Track to load. `encoded: null` stops the player.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackUpdate>,
    /// Pause state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    /// Volume, 0 to 1000.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u16>,
    /// Voice connection details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceUpdate>,
}

impl PlayerUpdate {
    /// Loads `encoded`, or stops the player with `None`.
    #[must_use]
    pub fn track(encoded: Option<String>) -> Self {
        Self {
            track: Some(TrackUpdate { encoded }),
            ..Self::default()
        }
    }
}

/// Track part of a player update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackUpdate {
    /// Encoded track, or null to stop.
    pub encoded: Option<String>,
}

/// Voice part of a player update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceUpdate {
    /// Voice server token.
    pub token: String,
    /// Voice server endpoint.
    pub endpoint: String,
    /// The bot's voice session id.
    pub session_id: String,
}
