//! Chat-platform collaborator.
//!
//! Rendering is the platform's job: this crate only says *what* to show and
//! *where*, via a persisted correlation token.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ChannelId, GuildId, MessageId, UserId};

/// Persisted ids that locate the chat context of a guild's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationToken {
    /// Text channel commands arrive in.
    pub channel_id: ChannelId,
    /// The last command message, for threaded replies.
    pub last_command_message_id: Option<MessageId>,
}

/// One row of a queue listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueLine {
    /// Logical (play-order) position, zero-based.
    pub position: usize,
    /// Item title.
    pub title: String,
    /// Item subtitle (artist, "Direct link", ...).
    pub subtitle: String,
    /// Whether this is the current item.
    pub current: bool,
}

/// Status updates posted to the guild's text channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusMessage {
    /// A track is playing or paused.
    NowPlaying {
        /// Display title.
        title: String,
        /// Display artist.
        artist: String,
        /// Link to the track.
        uri: Option<String>,
        /// Length in milliseconds.
        length_ms: u64,
        /// Whether the track is a live stream.
        is_stream: bool,
        /// Who asked for it, when known.
        requester: Option<UserId>,
        /// Whether playback is paused.
        paused: bool,
    },
    /// Nothing is playing.
    NotPlaying,
    /// Items were added to the queue.
    Enqueued {
        /// What was added (the query, or a count for lists).
        description: String,
        /// Number of items added.
        count: usize,
    },
    /// The queue listing in play order.
    QueueListing {
        /// Rows in logical order.
        lines: Vec<QueueLine>,
        /// Whether a shuffle permutation is active.
        shuffled: bool,
        /// Whether the queue loops.
        loop_all: bool,
    },
    /// A bare `play` is resuming an interrupted queue.
    ResumingQueue,
    /// The queue wrapped back to the start.
    LoopingBack,
    /// The bot left voice.
    Disconnected {
        /// Human-readable reason.
        reason: String,
    },
}

/// The chat platform: messages, voice and interactive prompts.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Posts `message` to `channel_id` and returns the new message id.
    async fn send(
        &self,
        channel_id: ChannelId,
        message: StatusMessage,
    ) -> Result<MessageId, DomainError>;

    /// Deletes a previously posted message.
    async fn delete(&self, channel_id: ChannelId, message_id: MessageId)
    -> Result<(), DomainError>;

    /// Joins (or moves to) a voice channel. Fails with `DomainError::Voice`
    /// when the bot lacks permission or the channel is full.
    async fn join_voice(&self, guild_id: GuildId, channel_id: ChannelId)
    -> Result<(), DomainError>;

    /// Leaves voice in the guild.
    async fn leave_voice(&self, guild_id: GuildId) -> Result<(), DomainError>;

    /// Number of members in the voice channel other than the bot.
    async fn voice_occupants(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<usize, DomainError>;

    /// Offers `options` to `user_id` and waits up to `timeout` for a choice.
    /// `None` means nothing was chosen.
    async fn prompt_choice(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
        options: Vec<String>,
        timeout: Duration,
    ) -> Result<Option<usize>, DomainError>;
}
