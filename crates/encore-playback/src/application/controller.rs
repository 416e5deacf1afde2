//! The playback controller.
//!
//! "Idle" is authoritative when the store holds no current index. The index
//! is only ever written after the node accepted a track.

use std::sync::Arc;

use encore_core::chat::{ChatGateway, StatusMessage};
use encore_core::error::DomainError;
use encore_core::ids::{GuildId, MessageId, UserId};
use encore_core::node::{PlayMode, PlaybackNode, PlayerSnapshot};
use encore_core::queue::{GuildQueueState, QueueItem};
use encore_core::store::{QueueStore, RenderedMessage};
use encore_core::track::{NowPlayingMarker, Track};
use encore_queue::application::command_handlers::persist;
use encore_queue::domain::mutations;
use encore_resolver::application::resolve::{Resolution, resolve};
use tracing::{debug, info, instrument, warn};

use crate::application::query_handlers::{now_playing_view, queue_view};
use crate::domain::outcomes::{EnqueueOutcome, PlayOutcome, ResumeOutcome, StateChange};

/// Highest volume the node accepts.
pub const MAX_VOLUME: u16 = 1000;

/// How a resolved track is handed to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handoff {
    /// A user asked for this track: cut whatever the node still plays.
    Cut,
    /// The node moved on by itself: only start it if it went idle.
    StartIfIdle,
}

impl Handoff {
    fn mode(self) -> PlayMode {
        match self {
            Self::Cut => PlayMode::Replace,
            Self::StartIfIdle => PlayMode::Enqueue,
        }
    }
}

/// Reconciles the durable queue with the playback node.
pub struct PlaybackController {
    pub(crate) store: Arc<dyn QueueStore>,
    pub(crate) node: Arc<dyn PlaybackNode>,
    pub(crate) chat: Arc<dyn ChatGateway>,
}

impl PlaybackController {
    /// Creates a controller over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn QueueStore>,
        node: Arc<dyn PlaybackNode>,
        chat: Arc<dyn ChatGateway>,
    ) -> Self {
        Self { store, node, chat }
    }

    /// Adds `items` to the guild's queue.
    ///
    /// When idle the previous queue is replaced and playback starts at the
    /// first new item. Otherwise the items are appended, and while shuffled
    /// their indices are appended to the permutation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for an empty batch, or a store
    /// or node error.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn enqueue(
        &self,
        guild_id: GuildId,
        items: Vec<QueueItem>,
    ) -> Result<EnqueueOutcome, DomainError> {
        if items.is_empty() {
            return Err(DomainError::InvalidArgument(
                "nothing to enqueue".to_owned(),
            ));
        }
        let mut state = self.store.get_state(guild_id).await?;

        if state.is_idle() {
            info!("guild idle, replacing queue and starting playback");
            state.queue = items;
            self.store.set_queue(guild_id, &state.queue).await?;
            if state.is_shuffled() {
                state.shuffle.clear();
                self.store.set_shuffle(guild_id, &[]).await?;
            }
            let outcome = self.play_sequence(guild_id, &state, 0, Handoff::Cut).await?;
            return Ok(EnqueueOutcome::Started(outcome));
        }

        let count = items.len();
        let description = match items.as_slice() {
            [only] => only.details().0,
            _ => format!("{count} tracks"),
        };
        let first_physical = state.len();
        let changes = mutations::append_items(&mut state, items);
        persist(self.store.as_ref(), guild_id, &state, changes).await?;
        let position = state.logical(first_physical).unwrap_or(first_physical);
        info!(count, position, "appended to queue");

        self.notify(guild_id, StatusMessage::Enqueued { description, count })
            .await;
        Ok(EnqueueOutcome::Appended { count, position })
    }

    /// Starts playback at logical position `start`, skipping entries that
    /// resolve to nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if `start` is out of bounds, or
    /// a store or node error.
    #[instrument(skip(self))]
    pub async fn play_from(
        &self,
        guild_id: GuildId,
        start: usize,
    ) -> Result<PlayOutcome, DomainError> {
        let state = self.store.get_state(guild_id).await?;
        if start >= state.len() {
            return Err(DomainError::InvalidArgument(format!(
                "position {start} is out of bounds for a queue of {}",
                state.len()
            )));
        }
        self.play_sequence(guild_id, &state, start, Handoff::Cut).await
    }

    /// Jumps to logical position `position`, cutting the current track.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if `position` is out of bounds,
    /// or a store or node error.
    #[instrument(skip(self))]
    pub async fn jump_to(
        &self,
        guild_id: GuildId,
        position: usize,
    ) -> Result<PlayOutcome, DomainError> {
        let state = self.store.get_state(guild_id).await?;
        if position >= state.len() {
            return Err(DomainError::InvalidArgument(format!(
                "position {position} is out of bounds for a queue of {}",
                state.len()
            )));
        }
        self.play_sequence(guild_id, &state, position, Handoff::Cut)
            .await
    }

    /// The user skipped: play the next logical entry, cutting the current
    /// track.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if a store or node call fails. The index is left
    /// untouched in that case.
    #[instrument(skip(self))]
    pub async fn advance_after_user_skip(
        &self,
        guild_id: GuildId,
    ) -> Result<PlayOutcome, DomainError> {
        self.advance(guild_id, Handoff::Cut).await
    }

    /// The node finished a track on its own: play the next logical entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if a store or node call fails.
    #[instrument(skip(self))]
    pub async fn advance_after_natural_end(
        &self,
        guild_id: GuildId,
    ) -> Result<PlayOutcome, DomainError> {
        self.advance(guild_id, Handoff::StartIfIdle).await
    }

    async fn advance(
        &self,
        guild_id: GuildId,
        handoff: Handoff,
    ) -> Result<PlayOutcome, DomainError> {
        let state = self.store.get_state(guild_id).await?;
        let next = state
            .index
            .and_then(|current| state.logical(current))
            .map_or(0, |logical| logical + 1);
        self.play_sequence(guild_id, &state, next, handoff).await
    }

    /// Replays the persisted now-playing marker after the node lost its
    /// player, keeping the persisted index. Falls back to the entry at the
    /// persisted index and then later ones. The queue is never modified.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if a store or node call fails.
    #[instrument(skip(self))]
    pub async fn resume_interrupted(
        &self,
        guild_id: GuildId,
        requester: UserId,
    ) -> Result<ResumeOutcome, DomainError> {
        if self
            .node
            .player(guild_id)
            .await?
            .is_some_and(|p| p.has_track())
        {
            return Ok(ResumeOutcome::NothingToResume);
        }
        let state = self.store.get_state(guild_id).await?;
        let marker = self.store.now_playing(guild_id).await?;
        if marker.is_none() && state.is_idle() {
            return Ok(ResumeOutcome::NothingToResume);
        }

        self.notify(guild_id, StatusMessage::ResumingQueue).await;

        if let Some(marker) = marker {
            let request = marker.to_request(requester);
            match resolve(&request, self.node.as_ref()).await? {
                Resolution::Found { track, query } => {
                    info!(title = %track.info.title, index = ?state.index, "replaying interrupted track");
                    self.hand_off(guild_id, &track, Handoff::Cut).await?;
                    self.store
                        .set_now_playing(guild_id, Some(&NowPlayingMarker::new(&track, query)))
                        .await?;
                    let owner = state.current_item().map_or(requester, |item| item.requester);
                    self.announce(guild_id, &track, Some(owner)).await;
                    return Ok(ResumeOutcome::Resumed {
                        index: state.index,
                        track,
                    });
                }
                Resolution::NotFound { query } => {
                    warn!(%query, "interrupted track no longer resolves, falling back to queue");
                }
            }
        }

        let Some(start) = state.index.and_then(|i| state.logical(i)) else {
            return Ok(ResumeOutcome::NothingToResume);
        };
        let outcome = self
            .play_sequence(guild_id, &state, start, Handoff::Cut)
            .await?;
        Ok(ResumeOutcome::Continued(outcome))
    }

    /// Pauses the player.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if nothing is playing, or a
    /// node error.
    #[instrument(skip(self))]
    pub async fn pause(&self, guild_id: GuildId) -> Result<StateChange, DomainError> {
        self.set_paused(guild_id, true).await
    }

    /// Unpauses the player.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if nothing is playing, or a
    /// node error.
    #[instrument(skip(self))]
    pub async fn resume(&self, guild_id: GuildId) -> Result<StateChange, DomainError> {
        self.set_paused(guild_id, false).await
    }

    async fn set_paused(&self, guild_id: GuildId, paused: bool) -> Result<StateChange, DomainError> {
        let player = self.loaded_player(guild_id).await?;
        if player.paused == paused {
            return Ok(StateChange::AlreadyInState);
        }
        self.node.pause(guild_id, paused).await?;
        info!(paused, "player state changed");
        Ok(StateChange::Applied)
    }

    /// Sets the player volume. Only applied while audibly playing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if `volume` exceeds
    /// [`MAX_VOLUME`] or the player is idle or paused, or a node error.
    #[instrument(skip(self))]
    pub async fn set_volume(&self, guild_id: GuildId, volume: u16) -> Result<(), DomainError> {
        if volume > MAX_VOLUME {
            return Err(DomainError::InvalidArgument(format!(
                "volume must be between 0 and {MAX_VOLUME}"
            )));
        }
        let player = self.loaded_player(guild_id).await?;
        if player.paused {
            return Err(DomainError::InvalidArgument(
                "volume can only be changed while playing".to_owned(),
            ));
        }
        self.node.set_volume(guild_id, volume).await
    }

    /// Toggles node-level repeat of the current track. Returns the new flag.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` if no track is loaded, or a
    /// node error.
    #[instrument(skip(self))]
    pub async fn toggle_track_repeat(&self, guild_id: GuildId) -> Result<bool, DomainError> {
        let repeat = !self.loaded_player(guild_id).await?.repeat;
        self.node.set_repeat(guild_id, repeat).await?;
        info!(repeat, "track repeat toggled");
        Ok(repeat)
    }

    /// Toggles looping of the whole queue. Returns the new flag.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if a store call fails.
    #[instrument(skip(self))]
    pub async fn toggle_loop_all(&self, guild_id: GuildId) -> Result<bool, DomainError> {
        let loop_all = !self.store.get_state(guild_id).await?.loop_all;
        self.store.set_loop_all(guild_id, loop_all).await?;
        info!(loop_all, "loop all toggled");
        Ok(loop_all)
    }

    /// Re-renders the now-playing message, deleting the previous one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotConnected` without a chat context, or a
    /// store, node or chat error.
    pub async fn post_now_playing(&self, guild_id: GuildId) -> Result<StatusMessage, DomainError> {
        let view = now_playing_view(guild_id, self.store.as_ref(), self.node.as_ref()).await?;
        self.render(guild_id, RenderedMessage::NowPlaying, view.clone())
            .await?
            .ok_or(DomainError::NotConnected(guild_id))?;
        Ok(view)
    }

    /// Re-renders the queue listing, deleting the previous one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotConnected` without a chat context, or a
    /// store or chat error.
    pub async fn post_queue(&self, guild_id: GuildId) -> Result<StatusMessage, DomainError> {
        let view = queue_view(guild_id, self.store.as_ref()).await?;
        self.render(guild_id, RenderedMessage::QueueListing, view.clone())
            .await?
            .ok_or(DomainError::NotConnected(guild_id))?;
        Ok(view)
    }

    /// Tries entries in logical order from `start`, at most once each,
    /// wrapping past the end only with loop-all.
    pub(crate) async fn play_sequence(
        &self,
        guild_id: GuildId,
        state: &GuildQueueState,
        start: usize,
        handoff: Handoff,
    ) -> Result<PlayOutcome, DomainError> {
        let len = state.len();
        let mut wrapped = false;

        for attempt in 0..len {
            let mut logical = start + attempt;
            if logical >= len {
                if !state.loop_all {
                    break;
                }
                logical %= len;
                if !wrapped {
                    wrapped = true;
                    info!("end of queue reached, looping back");
                    self.notify(guild_id, StatusMessage::LoopingBack).await;
                }
            }
            let Some(physical) = state.physical(logical) else {
                break;
            };
            let Some(item) = state.queue.get(physical) else {
                warn!(index = physical, "permutation points past the queue, skipping");
                continue;
            };

            match resolve(item, self.node.as_ref()).await? {
                Resolution::Found { track, query } => {
                    self.hand_off(guild_id, &track, handoff).await?;
                    self.store.set_index(guild_id, Some(physical)).await?;
                    self.store
                        .set_now_playing(guild_id, Some(&NowPlayingMarker::new(&track, query)))
                        .await?;
                    info!(index = physical, title = %track.info.title, ?handoff, "track handed to node");
                    self.announce(guild_id, &track, Some(item.requester)).await;
                    return Ok(PlayOutcome::Started {
                        index: physical,
                        track,
                    });
                }
                Resolution::NotFound { query } => {
                    warn!(index = physical, %query, "nothing playable, trying next entry");
                }
            }
        }

        info!("queue exhausted");
        Ok(PlayOutcome::Exhausted)
    }

    async fn hand_off(
        &self,
        guild_id: GuildId,
        track: &Track,
        handoff: Handoff,
    ) -> Result<(), DomainError> {
        self.node
            .play(guild_id, track.clone(), handoff.mode())
            .await
    }

    async fn loaded_player(&self, guild_id: GuildId) -> Result<PlayerSnapshot, DomainError> {
        self.node
            .player(guild_id)
            .await?
            .filter(PlayerSnapshot::has_track)
            .ok_or_else(|| DomainError::InvalidArgument("nothing is playing".to_owned()))
    }

    /// Posts the now-playing message for `track`. Failures are logged only:
    /// the track is already playing.
    pub(crate) async fn announce(&self, guild_id: GuildId, track: &Track, requester: Option<UserId>) {
        let message = StatusMessage::NowPlaying {
            title: track.info.title.clone(),
            artist: track.info.author.clone(),
            uri: track.info.uri.clone(),
            length_ms: track.info.length_ms,
            is_stream: track.info.is_stream,
            requester,
            paused: false,
        };
        if let Err(e) = self.render(guild_id, RenderedMessage::NowPlaying, message).await {
            warn!(error = %e, "failed to post now playing");
        }
    }

    /// Posts a one-off status message. Failures are logged only.
    pub(crate) async fn notify(&self, guild_id: GuildId, message: StatusMessage) {
        if let Err(e) = self.try_notify(guild_id, message).await {
            warn!(error = %e, "failed to post status message");
        }
    }

    async fn try_notify(&self, guild_id: GuildId, message: StatusMessage) -> Result<(), DomainError> {
        let Some(token) = self.store.correlation(guild_id).await? else {
            debug!("no chat context, dropping status message");
            return Ok(());
        };
        self.chat.send(token.channel_id, message).await?;
        Ok(())
    }

    async fn render(
        &self,
        guild_id: GuildId,
        kind: RenderedMessage,
        message: StatusMessage,
    ) -> Result<Option<MessageId>, DomainError> {
        let Some(token) = self.store.correlation(guild_id).await? else {
            debug!(?kind, "no chat context, not rendering");
            return Ok(None);
        };
        if let Some(previous) = self.store.rendered_message(guild_id, kind).await?
            && let Err(e) = self.chat.delete(token.channel_id, previous).await
        {
            warn!(error = %e, message_id = %previous, "failed to delete previous message");
        }
        let id = self.chat.send(token.channel_id, message).await?;
        self.store
            .set_rendered_message(guild_id, kind, Some(id))
            .await?;
        Ok(Some(id))
    }
}
