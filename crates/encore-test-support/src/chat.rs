//! Recording chat gateway — captures everything posted for assertions.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use encore_core::chat::{ChatGateway, StatusMessage};
use encore_core::error::DomainError;
use encore_core::ids::{ChannelId, GuildId, MessageId, UserId};

/// A chat gateway that records sends, deletes and voice calls.
///
/// Message ids are handed out sequentially from 1000. Voice occupancy,
/// prompt answers and join failures are configurable. Every method panics if
/// an internal mutex is poisoned.
#[derive(Debug)]
pub struct RecordingChat {
    next_id: AtomicU64,
    sent: Mutex<Vec<(ChannelId, MessageId, StatusMessage)>>,
    deleted: Mutex<Vec<(ChannelId, MessageId)>>,
    joins: Mutex<Vec<(GuildId, ChannelId)>>,
    leaves: Mutex<Vec<GuildId>>,
    occupants: Mutex<usize>,
    choice: Mutex<Option<usize>>,
    prompts: Mutex<Vec<Vec<String>>>,
    join_error: Mutex<Option<String>>,
}

impl Default for RecordingChat {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            sent: Mutex::default(),
            deleted: Mutex::default(),
            joins: Mutex::default(),
            leaves: Mutex::default(),
            occupants: Mutex::new(1),
            choice: Mutex::default(),
            prompts: Mutex::default(),
            join_error: Mutex::default(),
        }
    }
}

impl RecordingChat {
    /// Create a gateway with one other voice occupant and no prompt answer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, with the ids they were given.
    pub fn sent(&self) -> Vec<(ChannelId, MessageId, StatusMessage)> {
        self.sent.lock().unwrap().clone()
    }

    /// Only the message bodies sent so far.
    pub fn sent_messages(&self) -> Vec<StatusMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, m)| m.clone())
            .collect()
    }

    /// Messages deleted so far.
    pub fn deleted(&self) -> Vec<(ChannelId, MessageId)> {
        self.deleted.lock().unwrap().clone()
    }

    /// Voice joins so far.
    pub fn joins(&self) -> Vec<(GuildId, ChannelId)> {
        self.joins.lock().unwrap().clone()
    }

    /// Voice leaves so far.
    pub fn leaves(&self) -> Vec<GuildId> {
        self.leaves.lock().unwrap().clone()
    }

    /// Option lists offered through `prompt_choice`.
    pub fn prompts(&self) -> Vec<Vec<String>> {
        self.prompts.lock().unwrap().clone()
    }

    /// Sets how many non-bot members are in voice.
    pub fn set_occupants(&self, occupants: usize) {
        *self.occupants.lock().unwrap() = occupants;
    }

    /// Sets the answer to the next prompts; `None` simulates a timeout.
    pub fn set_choice(&self, choice: Option<usize>) {
        *self.choice.lock().unwrap() = choice;
    }

    /// Makes `join_voice` fail with a voice error.
    pub fn fail_join(&self, reason: &str) {
        *self.join_error.lock().unwrap() = Some(reason.to_owned());
    }
}

#[async_trait]
impl ChatGateway for RecordingChat {
    async fn send(
        &self,
        channel_id: ChannelId,
        message: StatusMessage,
    ) -> Result<MessageId, DomainError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push((channel_id, id, message));
        Ok(id)
    }

    async fn delete(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DomainError> {
        self.deleted.lock().unwrap().push((channel_id, message_id));
        Ok(())
    }

    async fn join_voice(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<(), DomainError> {
        if let Some(reason) = self.join_error.lock().unwrap().clone() {
            return Err(DomainError::Voice(reason));
        }
        self.joins.lock().unwrap().push((guild_id, channel_id));
        Ok(())
    }

    async fn leave_voice(&self, guild_id: GuildId) -> Result<(), DomainError> {
        self.leaves.lock().unwrap().push(guild_id);
        Ok(())
    }

    async fn voice_occupants(
        &self,
        _guild_id: GuildId,
        _channel_id: ChannelId,
    ) -> Result<usize, DomainError> {
        Ok(*self.occupants.lock().unwrap())
    }

    async fn prompt_choice(
        &self,
        _channel_id: ChannelId,
        _user_id: UserId,
        options: Vec<String>,
        _timeout: Duration,
    ) -> Result<Option<usize>, DomainError> {
        self.prompts.lock().unwrap().push(options);
        Ok(*self.choice.lock().unwrap())
    }
}
