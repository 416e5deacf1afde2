//! Events emitted by the playback node.

use serde::{Deserialize, Serialize};

use crate::ids::GuildId;
use crate::track::Track;

/// Why the node stopped playing a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackEndReason {
    /// The track played to its end.
    Finished,
    /// The track failed while loading or playing.
    LoadFailed,
    /// Playback was stopped explicitly.
    Stopped,
    /// Another track replaced it (e.g. a user skip).
    Replaced,
    /// The player was cleaned up.
    Cleanup,
}

impl TrackEndReason {
    /// Whether the end of the track should start the next queue entry.
    #[must_use]
    pub fn may_start_next(self) -> bool {
        matches!(self, Self::Finished | Self::LoadFailed)
    }
}

/// Closed set of node events. Handled by one dispatcher, one branch per
/// variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// The node began playing `track`.
    TrackStart {
        /// Guild of the player.
        guild_id: GuildId,
        /// The track that started.
        track: Track,
    },
    /// The node stopped playing `track`.
    TrackEnd {
        /// Guild of the player.
        guild_id: GuildId,
        /// The track that ended.
        track: Track,
        /// Why it ended.
        reason: TrackEndReason,
    },
    /// The node's own player queue ran dry.
    QueueEnd {
        /// Guild of the player.
        guild_id: GuildId,
    },
}

impl NodeEvent {
    /// Guild the event belongs to.
    #[must_use]
    pub fn guild_id(&self) -> GuildId {
        match self {
            Self::TrackStart { guild_id, .. }
            | Self::TrackEnd { guild_id, .. }
            | Self::QueueEnd { guild_id } => *guild_id,
        }
    }

    /// Event type name for logging.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TrackStart { .. } => "node.track_start",
            Self::TrackEnd { .. } => "node.track_end",
            Self::QueueEnd { .. } => "node.queue_end",
        }
    }
}
