//! Playback node abstraction.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::ids::GuildId;
use crate::track::{LoadResult, Track};

/// What the node reports about a guild's player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// The track being played, if any.
    pub current: Option<Track>,
    /// Whether playback is paused.
    pub paused: bool,
    /// Current volume.
    pub volume: u16,
    /// Whether the current track repeats.
    pub repeat: bool,
}

impl PlayerSnapshot {
    /// Whether a track is loaded (playing or paused).
    #[must_use]
    pub fn has_track(&self) -> bool {
        self.current.is_some()
    }

    /// Whether a track is audibly playing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.is_some() && !self.paused
    }
}

/// What `PlaybackNode::play` does with a track that is already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Cut the loaded track and anything queued behind it.
    Replace,
    /// Start at once on an idle player, otherwise play after the loaded track.
    Enqueue,
}

/// The external stateful playback engine.
///
/// The node may keep a short player queue of its own, fed by
/// `PlayMode::Enqueue` and drained as tracks finish.
#[async_trait]
pub trait PlaybackNode: Send + Sync {
    /// Searches the node's sources for `query`.
    async fn search(&self, query: &str) -> Result<LoadResult, DomainError>;

    /// Hands `track` to the guild's player as `mode` says.
    ///
    /// Either the hand-off takes effect or the player is left exactly as it
    /// was and an error is returned.
    async fn play(&self, guild_id: GuildId, track: Track, mode: PlayMode)
    -> Result<(), DomainError>;

    /// Pauses or unpauses the player.
    async fn pause(&self, guild_id: GuildId, paused: bool) -> Result<(), DomainError>;

    /// Stops playback and drops the player's own queue.
    async fn stop(&self, guild_id: GuildId) -> Result<(), DomainError>;

    /// Sets the player volume.
    async fn set_volume(&self, guild_id: GuildId, volume: u16) -> Result<(), DomainError>;

    /// Enables or disables repeating the current track.
    async fn set_repeat(&self, guild_id: GuildId, repeat: bool) -> Result<(), DomainError>;

    /// Returns the guild's player, or `None` when the node has none.
    async fn player(&self, guild_id: GuildId) -> Result<Option<PlayerSnapshot>, DomainError>;
}
