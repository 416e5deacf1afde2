//! Queue store abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::CorrelationToken;
use crate::error::DomainError;
use crate::ids::{GuildId, MessageId};
use crate::queue::{GuildQueueState, QueueItem};
use crate::track::NowPlayingMarker;

/// JSON keys of the persisted per-guild document.
pub mod fields {
    /// Ordered queue items.
    pub const QUEUE: &str = "queue";
    /// Current physical index.
    pub const QUEUE_INDEX: &str = "queueIndex";
    /// Loop-all flag.
    pub const LOOP_ALL: &str = "loopAll";
    /// Shuffle permutation.
    pub const SHUFFLE_INDICES: &str = "shuffleIndices";
    /// Now-playing recovery marker.
    pub const NOW_PLAYING_MARKER: &str = "nowPlayingMarker";
    /// Chat correlation token.
    pub const CORRELATION: &str = "correlation";
    /// Last rendered now-playing message.
    pub const NP_MESSAGE_ID: &str = "npMessageId";
    /// Last rendered queue listing message.
    pub const QUEUE_MESSAGE_ID: &str = "queueMessageId";
}

/// Rendered messages that are deleted before being re-rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedMessage {
    /// The now-playing message.
    NowPlaying,
    /// The queue listing.
    QueueListing,
}

impl RenderedMessage {
    /// Document key holding this message id.
    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            Self::NowPlaying => fields::NP_MESSAGE_ID,
            Self::QueueListing => fields::QUEUE_MESSAGE_ID,
        }
    }
}

/// The whole persisted document of one guild.
///
/// Every field defaults when absent, so a missing or partial document reads
/// as an empty, idle guild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuildDocument {
    /// Ordered queue items.
    pub queue: Vec<QueueItem>,
    /// Current physical index.
    pub queue_index: Option<usize>,
    /// Loop-all flag.
    pub loop_all: bool,
    /// Shuffle permutation.
    pub shuffle_indices: Vec<usize>,
    /// Now-playing recovery marker.
    pub now_playing_marker: Option<NowPlayingMarker>,
    /// Chat correlation token.
    pub correlation: Option<CorrelationToken>,
    /// Last rendered now-playing message.
    pub np_message_id: Option<MessageId>,
    /// Last rendered queue listing message.
    pub queue_message_id: Option<MessageId>,
}

impl GuildDocument {
    /// Projects the queue bookkeeping fields.
    ///
    /// Fields are written one at a time, so a document caught between two
    /// writes may hold a permutation or index that no longer fits the queue.
    /// The projection is repaired before it is returned.
    #[must_use]
    pub fn queue_state(&self) -> GuildQueueState {
        let mut state = GuildQueueState {
            queue: self.queue.clone(),
            index: self.queue_index,
            loop_all: self.loop_all,
            shuffle: self.shuffle_indices.clone(),
        };
        state.repair();
        state
    }

    /// Returns the id of a rendered message.
    #[must_use]
    pub fn rendered_message(&self, kind: RenderedMessage) -> Option<MessageId> {
        match kind {
            RenderedMessage::NowPlaying => self.np_message_id,
            RenderedMessage::QueueListing => self.queue_message_id,
        }
    }
}

/// Key-value persistence of per-guild queue state.
///
/// Every setter writes one field independently; there is no multi-field
/// transaction, and concurrent writers race with last-write-wins.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Reads the guild's queue bookkeeping. An unknown guild yields defaults.
    async fn get_state(&self, guild_id: GuildId) -> Result<GuildQueueState, DomainError>;

    /// Replaces the ordered queue.
    async fn set_queue(&self, guild_id: GuildId, queue: &[QueueItem]) -> Result<(), DomainError>;

    /// Sets or clears the current physical index.
    async fn set_index(&self, guild_id: GuildId, index: Option<usize>) -> Result<(), DomainError>;

    /// Sets the loop-all flag.
    async fn set_loop_all(&self, guild_id: GuildId, loop_all: bool) -> Result<(), DomainError>;

    /// Replaces the shuffle permutation (empty to unshuffle).
    async fn set_shuffle(&self, guild_id: GuildId, shuffle: &[usize]) -> Result<(), DomainError>;

    /// Reads the now-playing marker.
    async fn now_playing(&self, guild_id: GuildId)
    -> Result<Option<NowPlayingMarker>, DomainError>;

    /// Sets or clears the now-playing marker.
    async fn set_now_playing(
        &self,
        guild_id: GuildId,
        marker: Option<&NowPlayingMarker>,
    ) -> Result<(), DomainError>;

    /// Reads the chat correlation token.
    async fn correlation(&self, guild_id: GuildId)
    -> Result<Option<CorrelationToken>, DomainError>;

    /// Sets or clears the chat correlation token.
    async fn set_correlation(
        &self,
        guild_id: GuildId,
        token: Option<CorrelationToken>,
    ) -> Result<(), DomainError>;

    /// Reads the id of a rendered message.
    async fn rendered_message(
        &self,
        guild_id: GuildId,
        kind: RenderedMessage,
    ) -> Result<Option<MessageId>, DomainError>;

    /// Sets or clears the id of a rendered message.
    async fn set_rendered_message(
        &self,
        guild_id: GuildId,
        kind: RenderedMessage,
        message_id: Option<MessageId>,
    ) -> Result<(), DomainError>;

    /// Deletes the guild's whole document.
    async fn clear_guild(&self, guild_id: GuildId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use crate::ids::UserId;

    use super::*;

    #[test]
    fn test_partial_document_reads_with_defaults() {
        let doc: GuildDocument = serde_json::from_str(r#"{ "loopAll": true }"#).unwrap();

        let state = doc.queue_state();
        assert!(state.loop_all);
        assert!(state.queue.is_empty());
        assert_eq!(state.index, None);
        assert!(state.shuffle.is_empty());
    }

    #[test]
    fn test_torn_document_reads_as_valid_state() {
        // Queue already shortened, permutation not yet renumbered.
        let doc = GuildDocument {
            queue: vec![
                QueueItem::search(UserId(1), "ytsearch:a"),
                QueueItem::search(UserId(1), "ytsearch:c"),
            ],
            queue_index: Some(0),
            shuffle_indices: vec![0, 2, 1],
            ..GuildDocument::default()
        };

        let state = doc.queue_state();

        assert!(state.is_consistent());
        assert!(state.shuffle.is_empty());
        assert_eq!(state.index, Some(0));
    }

    #[test]
    fn test_document_uses_documented_keys() {
        let doc = GuildDocument {
            queue_index: Some(2),
            shuffle_indices: vec![2, 0, 1],
            np_message_id: Some(MessageId(9)),
            ..GuildDocument::default()
        };

        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json[fields::QUEUE_INDEX], 2);
        assert_eq!(json[fields::SHUFFLE_INDICES], serde_json::json!([2, 0, 1]));
        assert_eq!(json[fields::NP_MESSAGE_ID], 9);
        assert_eq!(json[fields::LOOP_ALL], false);
    }
}
