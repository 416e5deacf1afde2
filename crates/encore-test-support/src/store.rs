//! Test stores — mock `QueueStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use encore_core::chat::CorrelationToken;
use encore_core::error::DomainError;
use encore_core::ids::{GuildId, MessageId};
use encore_core::queue::{GuildQueueState, QueueItem};
use encore_core::store::{GuildDocument, QueueStore, RenderedMessage, fields};
use encore_core::track::NowPlayingMarker;

/// An in-memory document store. Records the name of every field written so
/// tests can assert on write ordering.
#[derive(Debug, Default)]
pub struct InMemoryQueueStore {
    documents: Mutex<HashMap<GuildId, GuildDocument>>,
    writes: Mutex<Vec<(GuildId, &'static str)>>,
}

impl InMemoryQueueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `state` for `guild_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_state(guild_id: GuildId, state: GuildQueueState) -> Self {
        let store = Self::new();
        store.documents.lock().unwrap().insert(
            guild_id,
            GuildDocument {
                queue: state.queue,
                queue_index: state.index,
                loop_all: state.loop_all,
                shuffle_indices: state.shuffle,
                ..GuildDocument::default()
            },
        );
        store
    }

    /// Returns a snapshot of the guild's whole document, if one exists.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn document(&self, guild_id: GuildId) -> Option<GuildDocument> {
        self.documents.lock().unwrap().get(&guild_id).cloned()
    }

    /// Replaces the guild's whole document.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn put_document(&self, guild_id: GuildId, document: GuildDocument) {
        self.documents.lock().unwrap().insert(guild_id, document);
    }

    /// Returns the field names written so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<(GuildId, &'static str)> {
        self.writes.lock().unwrap().clone()
    }

    fn update(&self, guild_id: GuildId, field: &'static str, f: impl FnOnce(&mut GuildDocument)) {
        f(self.documents.lock().unwrap().entry(guild_id).or_default());
        self.writes.lock().unwrap().push((guild_id, field));
    }

    fn read<T>(&self, guild_id: GuildId, f: impl FnOnce(&GuildDocument) -> T) -> T {
        let documents = self.documents.lock().unwrap();
        match documents.get(&guild_id) {
            Some(doc) => f(doc),
            None => f(&GuildDocument::default()),
        }
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn get_state(&self, guild_id: GuildId) -> Result<GuildQueueState, DomainError> {
        Ok(self.read(guild_id, GuildDocument::queue_state))
    }

    async fn set_queue(&self, guild_id: GuildId, queue: &[QueueItem]) -> Result<(), DomainError> {
        self.update(guild_id, fields::QUEUE, |doc| doc.queue = queue.to_vec());
        Ok(())
    }

    async fn set_index(&self, guild_id: GuildId, index: Option<usize>) -> Result<(), DomainError> {
        self.update(guild_id, fields::QUEUE_INDEX, |doc| doc.queue_index = index);
        Ok(())
    }

    async fn set_loop_all(&self, guild_id: GuildId, loop_all: bool) -> Result<(), DomainError> {
        self.update(guild_id, fields::LOOP_ALL, |doc| doc.loop_all = loop_all);
        Ok(())
    }

    async fn set_shuffle(&self, guild_id: GuildId, shuffle: &[usize]) -> Result<(), DomainError> {
        self.update(guild_id, fields::SHUFFLE_INDICES, |doc| {
            doc.shuffle_indices = shuffle.to_vec();
        });
        Ok(())
    }

    async fn now_playing(
        &self,
        guild_id: GuildId,
    ) -> Result<Option<NowPlayingMarker>, DomainError> {
        Ok(self.read(guild_id, |doc| doc.now_playing_marker.clone()))
    }

    async fn set_now_playing(
        &self,
        guild_id: GuildId,
        marker: Option<&NowPlayingMarker>,
    ) -> Result<(), DomainError> {
        self.update(guild_id, fields::NOW_PLAYING_MARKER, |doc| {
            doc.now_playing_marker = marker.cloned();
        });
        Ok(())
    }

    async fn correlation(
        &self,
        guild_id: GuildId,
    ) -> Result<Option<CorrelationToken>, DomainError> {
        Ok(self.read(guild_id, |doc| doc.correlation))
    }

    async fn set_correlation(
        &self,
        guild_id: GuildId,
        token: Option<CorrelationToken>,
    ) -> Result<(), DomainError> {
        self.update(guild_id, fields::CORRELATION, |doc| doc.correlation = token);
        Ok(())
    }

    async fn rendered_message(
        &self,
        guild_id: GuildId,
        kind: RenderedMessage,
    ) -> Result<Option<MessageId>, DomainError> {
        Ok(self.read(guild_id, |doc| doc.rendered_message(kind)))
    }

    async fn set_rendered_message(
        &self,
        guild_id: GuildId,
        kind: RenderedMessage,
        message_id: Option<MessageId>,
    ) -> Result<(), DomainError> {
        self.update(guild_id, kind.field(), |doc| match kind {
            RenderedMessage::NowPlaying => doc.np_message_id = message_id,
            RenderedMessage::QueueListing => doc.queue_message_id = message_id,
        });
        Ok(())
    }

    async fn clear_guild(&self, guild_id: GuildId) -> Result<(), DomainError> {
        self.documents.lock().unwrap().remove(&guild_id);
        self.writes.lock().unwrap().push((guild_id, "*"));
        Ok(())
    }
}

/// A store that always returns an infrastructure error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingQueueStore;

fn refused() -> DomainError {
    DomainError::Infrastructure("connection refused".into())
}

#[async_trait]
impl QueueStore for FailingQueueStore {
    async fn get_state(&self, _guild_id: GuildId) -> Result<GuildQueueState, DomainError> {
        Err(refused())
    }

    async fn set_queue(&self, _guild_id: GuildId, _queue: &[QueueItem]) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn set_index(&self, _guild_id: GuildId, _index: Option<usize>) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn set_loop_all(&self, _guild_id: GuildId, _loop_all: bool) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn set_shuffle(&self, _guild_id: GuildId, _shuffle: &[usize]) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn now_playing(
        &self,
        _guild_id: GuildId,
    ) -> Result<Option<NowPlayingMarker>, DomainError> {
        Err(refused())
    }

    async fn set_now_playing(
        &self,
        _guild_id: GuildId,
        _marker: Option<&NowPlayingMarker>,
    ) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn correlation(
        &self,
        _guild_id: GuildId,
    ) -> Result<Option<CorrelationToken>, DomainError> {
        Err(refused())
    }

    async fn set_correlation(
        &self,
        _guild_id: GuildId,
        _token: Option<CorrelationToken>,
    ) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn rendered_message(
        &self,
        _guild_id: GuildId,
        _kind: RenderedMessage,
    ) -> Result<Option<MessageId>, DomainError> {
        Err(refused())
    }

    async fn set_rendered_message(
        &self,
        _guild_id: GuildId,
        _kind: RenderedMessage,
        _message_id: Option<MessageId>,
    ) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn clear_guild(&self, _guild_id: GuildId) -> Result<(), DomainError> {
        Err(refused())
    }
}
