//! The voice session of one guild.

use chrono::{DateTime, Utc};
use encore_core::chat::CorrelationToken;
use encore_core::ids::{ChannelId, GuildId};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// A user stopped playback. The queue is kept.
    Stopped,
    /// A user reset the player. The whole guild document is deleted.
    Reset,
    /// Nothing played for the inactivity window.
    Inactive,
    /// Everyone else left the voice channel.
    Alone,
    /// The queue ran out of playable entries.
    QueueFinished,
    /// The bot was removed from voice from outside.
    Forced,
}

impl DisconnectReason {
    /// Human-readable reason posted to the chat.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped by request",
            Self::Reset => "Player reset",
            Self::Inactive => "Inactive for too long",
            Self::Alone => "Everyone left the voice channel",
            Self::QueueFinished => "Queue finished",
            Self::Forced => "Disconnected from voice",
        }
    }

    /// Whether the durable queue is deleted as well.
    #[must_use]
    pub fn clears_queue(self) -> bool {
        matches!(self, Self::Reset)
    }

    /// Whether the bot still has to leave voice itself.
    #[must_use]
    pub fn leaves_voice(self) -> bool {
        !matches!(self, Self::Forced)
    }
}

/// An active voice connection. At most one per guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The guild.
    pub guild_id: GuildId,
    /// The voice channel the bot is bound to.
    pub voice_channel_id: ChannelId,
    /// Where replies go.
    pub correlation: CorrelationToken,
    /// Last time a command touched the session.
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// A session created at `now`.
    #[must_use]
    pub fn new(
        guild_id: GuildId,
        voice_channel_id: ChannelId,
        correlation: CorrelationToken,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            guild_id,
            voice_channel_id,
            correlation,
            last_activity: now,
        }
    }

    /// Refreshes the reply context after another command.
    pub fn touch(&mut self, correlation: CorrelationToken, now: DateTime<Utc>) {
        self.correlation = correlation;
        self.last_activity = now;
    }
}
