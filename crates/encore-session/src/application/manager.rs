//! The session manager: voice binding, watchdog and teardown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use encore_core::chat::{ChatGateway, CorrelationToken, StatusMessage};
use encore_core::clock::Clock;
use encore_core::error::DomainError;
use encore_core::event::NodeEvent;
use encore_core::ids::{ChannelId, GuildId, UserId};
use encore_core::node::PlaybackNode;
use encore_core::queue::QueueItem;
use encore_core::store::{QueueStore, RenderedMessage};
use encore_playback::PlaybackController;
use encore_playback::domain::outcomes::{
    DispatchOutcome, EnqueueOutcome, PlayOutcome, ResumeOutcome,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::domain::session::{DisconnectReason, Session};
use crate::domain::watchdog::{IdleCounter, Observation, Verdict, WatchdogConfig};

/// Result of `connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new session was created.
    Connected,
    /// The guild was already bound to this channel.
    AlreadyConnected,
}

struct ActiveSession {
    session: Session,
    watchdog: CancellationToken,
}

/// Owns every guild's voice session.
pub struct SessionManager {
    controller: Arc<PlaybackController>,
    store: Arc<dyn QueueStore>,
    node: Arc<dyn PlaybackNode>,
    chat: Arc<dyn ChatGateway>,
    clock: Arc<dyn Clock>,
    config: WatchdogConfig,
    sessions: Mutex<HashMap<GuildId, ActiveSession>>,
    this: Weak<SessionManager>,
}

impl SessionManager {
    /// Creates the manager. Watchdogs hold only a weak reference to it.
    #[must_use]
    pub fn new(
        controller: Arc<PlaybackController>,
        store: Arc<dyn QueueStore>,
        node: Arc<dyn PlaybackNode>,
        chat: Arc<dyn ChatGateway>,
        clock: Arc<dyn Clock>,
        config: WatchdogConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            controller,
            store,
            node,
            chat,
            clock,
            config,
            sessions: Mutex::new(HashMap::new()),
            this: this.clone(),
        })
    }

    /// The playback controller sessions drive.
    #[must_use]
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<GuildId, ActiveSession>>, DomainError> {
        self.sessions
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("session table poisoned: {e}")))
    }

    /// A snapshot of the guild's session, if connected.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the session table is poisoned.
    pub fn session(&self, guild_id: GuildId) -> Result<Option<Session>, DomainError> {
        Ok(self.lock()?.get(&guild_id).map(|a| a.session.clone()))
    }

    /// Whether the guild has an active voice session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the session table is poisoned.
    pub fn is_connected(&self, guild_id: GuildId) -> Result<bool, DomainError> {
        Ok(self.lock()?.contains_key(&guild_id))
    }

    /// Binds the guild to `voice_channel_id`, or confirms an existing binding.
    ///
    /// The correlation token is stored on creation and refreshed on every
    /// later call.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Voice` if the guild is bound to another channel
    /// or the bot cannot join, or a store error.
    #[instrument(skip(self, correlation))]
    pub async fn connect(
        &self,
        guild_id: GuildId,
        voice_channel_id: ChannelId,
        correlation: CorrelationToken,
    ) -> Result<ConnectOutcome, DomainError> {
        let existing = self.session(guild_id)?;
        if let Some(session) = existing {
            if session.voice_channel_id != voice_channel_id {
                return Err(DomainError::Voice(format!(
                    "already playing in channel {}; join it to control playback",
                    session.voice_channel_id
                )));
            }
            self.store
                .set_correlation(guild_id, Some(correlation))
                .await?;
            if let Some(active) = self.lock()?.get_mut(&guild_id) {
                active.session.touch(correlation, self.clock.now());
            }
            return Ok(ConnectOutcome::AlreadyConnected);
        }

        self.chat.join_voice(guild_id, voice_channel_id).await?;
        self.store
            .set_correlation(guild_id, Some(correlation))
            .await?;

        let watchdog = CancellationToken::new();
        {
            let mut sessions = self.lock()?;
            if sessions.contains_key(&guild_id) {
                return Ok(ConnectOutcome::AlreadyConnected);
            }
            sessions.insert(
                guild_id,
                ActiveSession {
                    session: Session::new(
                        guild_id,
                        voice_channel_id,
                        correlation,
                        self.clock.now(),
                    ),
                    watchdog: watchdog.clone(),
                },
            );
        }
        self.spawn_watchdog(guild_id, voice_channel_id, watchdog);
        info!("voice session created");
        Ok(ConnectOutcome::Connected)
    }

    /// Connects if needed and enqueues `items`. Tears down if nothing in a
    /// fresh queue was playable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` from connecting, enqueueing or teardown.
    #[instrument(skip(self, correlation, items))]
    pub async fn play(
        &self,
        guild_id: GuildId,
        voice_channel_id: ChannelId,
        correlation: CorrelationToken,
        items: Vec<QueueItem>,
    ) -> Result<EnqueueOutcome, DomainError> {
        self.connect(guild_id, voice_channel_id, correlation).await?;
        let outcome = self.controller.enqueue(guild_id, items).await?;
        if outcome == EnqueueOutcome::Started(PlayOutcome::Exhausted) {
            self.disconnect(guild_id, DisconnectReason::QueueFinished)
                .await?;
        }
        Ok(outcome)
    }

    /// Bare `play`: connects if needed and resumes whatever was interrupted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` from connecting, resuming or teardown.
    #[instrument(skip(self, correlation))]
    pub async fn resume_interrupted(
        &self,
        guild_id: GuildId,
        voice_channel_id: ChannelId,
        correlation: CorrelationToken,
        requester: UserId,
    ) -> Result<ResumeOutcome, DomainError> {
        self.connect(guild_id, voice_channel_id, correlation).await?;
        let outcome = self
            .controller
            .resume_interrupted(guild_id, requester)
            .await?;
        if outcome == ResumeOutcome::Continued(PlayOutcome::Exhausted) {
            self.disconnect(guild_id, DisconnectReason::QueueFinished)
                .await?;
        }
        Ok(outcome)
    }

    /// User skip. Tears down when the queue is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotConnected` without a session, or an error
    /// from advancing or teardown.
    #[instrument(skip(self))]
    pub async fn skip(&self, guild_id: GuildId) -> Result<PlayOutcome, DomainError> {
        self.require_session(guild_id)?;
        let outcome = self.controller.advance_after_user_skip(guild_id).await?;
        self.teardown_if_exhausted(guild_id, &outcome).await?;
        Ok(outcome)
    }

    /// Jumps to a logical position. Tears down when nothing from there on
    /// is playable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotConnected` without a session, or an error
    /// from jumping or teardown.
    #[instrument(skip(self))]
    pub async fn jump(&self, guild_id: GuildId, position: usize) -> Result<PlayOutcome, DomainError> {
        self.require_session(guild_id)?;
        let outcome = self.controller.jump_to(guild_id, position).await?;
        self.teardown_if_exhausted(guild_id, &outcome).await?;
        Ok(outcome)
    }

    /// Forwards a node event to the dispatcher and tears down on exhaustion.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` from dispatch or teardown.
    pub async fn handle_node_event(&self, event: NodeEvent) -> Result<DispatchOutcome, DomainError> {
        let guild_id = event.guild_id();
        let outcome = self.controller.handle_event(event).await?;
        if outcome.is_exhausted() {
            self.disconnect(guild_id, DisconnectReason::QueueFinished)
                .await?;
        }
        Ok(outcome)
    }

    /// Voice membership changed in `channel_id`. Disconnects at once when
    /// the bot is left alone in its channel.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` from teardown.
    #[instrument(skip(self))]
    pub async fn handle_voice_update(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        occupants: usize,
    ) -> Result<bool, DomainError> {
        let bound = self
            .session(guild_id)?
            .is_some_and(|s| s.voice_channel_id == channel_id);
        if bound && occupants == 0 {
            self.disconnect(guild_id, DisconnectReason::Alone).await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// The bot was removed from voice by someone else.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` from teardown.
    pub async fn handle_forced_disconnect(&self, guild_id: GuildId) -> Result<(), DomainError> {
        self.disconnect(guild_id, DisconnectReason::Forced).await
    }

    /// Stops playback and leaves voice, keeping the queue.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` from teardown.
    pub async fn stop(&self, guild_id: GuildId) -> Result<(), DomainError> {
        self.disconnect(guild_id, DisconnectReason::Stopped).await
    }

    /// Stops playback, leaves voice and deletes the guild's document.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` from teardown.
    pub async fn reset(&self, guild_id: GuildId) -> Result<(), DomainError> {
        self.disconnect(guild_id, DisconnectReason::Reset).await
    }

    /// Tears the session down: stops the node, leaves voice, cancels the
    /// watchdog and clears all session-scoped state. Safe to call when no
    /// session is active.
    ///
    /// Node and chat failures are logged and do not abort the teardown.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if a store write fails.
    #[instrument(skip(self))]
    pub async fn disconnect(
        &self,
        guild_id: GuildId,
        reason: DisconnectReason,
    ) -> Result<(), DomainError> {
        {
            let mut sessions = self.lock()?;
            if let Some(active) = sessions.remove(&guild_id) {
                active.watchdog.cancel();
            }
        }
        self.tear_down(guild_id, reason).await
    }

    /// Watchdog-driven teardown. Does nothing once `watchdog` is cancelled,
    /// so a verdict about an ended session never touches its successor.
    /// Returns whether the session was torn down.
    #[instrument(skip(self, watchdog))]
    async fn disconnect_watched(
        &self,
        guild_id: GuildId,
        reason: DisconnectReason,
        watchdog: &CancellationToken,
    ) -> Result<bool, DomainError> {
        {
            // Tokens are cancelled under this lock, so the check cannot race
            // another disconnect.
            let mut sessions = self.lock()?;
            if watchdog.is_cancelled() {
                return Ok(false);
            }
            if let Some(active) = sessions.remove(&guild_id) {
                active.watchdog.cancel();
            }
        }
        self.tear_down(guild_id, reason).await?;
        Ok(true)
    }

    async fn tear_down(
        &self,
        guild_id: GuildId,
        reason: DisconnectReason,
    ) -> Result<(), DomainError> {
        if let Err(e) = self.node.stop(guild_id).await {
            warn!(error = %e, "failed to stop node player");
        }
        if reason.leaves_voice()
            && let Err(e) = self.chat.leave_voice(guild_id).await
        {
            warn!(error = %e, "failed to leave voice");
        }
        if let Some(token) = self.store.correlation(guild_id).await?
            && let Err(e) = self
                .chat
                .send(
                    token.channel_id,
                    StatusMessage::Disconnected {
                        reason: reason.describe().to_owned(),
                    },
                )
                .await
        {
            warn!(error = %e, "failed to post disconnect notice");
        }

        if reason.clears_queue() {
            self.store.clear_guild(guild_id).await?;
        } else {
            self.store.set_index(guild_id, None).await?;
            self.store.set_now_playing(guild_id, None).await?;
            self.store.set_shuffle(guild_id, &[]).await?;
            for kind in [RenderedMessage::NowPlaying, RenderedMessage::QueueListing] {
                self.store.set_rendered_message(guild_id, kind, None).await?;
            }
            self.store.set_correlation(guild_id, None).await?;
        }

        info!(reason = reason.describe(), "voice session ended");
        Ok(())
    }

    fn require_session(&self, guild_id: GuildId) -> Result<(), DomainError> {
        if self.is_connected(guild_id)? {
            Ok(())
        } else {
            Err(DomainError::NotConnected(guild_id))
        }
    }

    async fn teardown_if_exhausted(
        &self,
        guild_id: GuildId,
        outcome: &PlayOutcome,
    ) -> Result<(), DomainError> {
        if outcome.is_exhausted() {
            self.disconnect(guild_id, DisconnectReason::QueueFinished)
                .await?;
        }
        Ok(())
    }

    async fn observe(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Observation, DomainError> {
        let playing = self
            .node
            .player(guild_id)
            .await?
            .is_some_and(|p| p.is_active());
        let occupants = self.chat.voice_occupants(guild_id, channel_id).await?;
        Ok(Observation { playing, occupants })
    }

    fn spawn_watchdog(&self, guild_id: GuildId, channel_id: ChannelId, token: CancellationToken) {
        let manager = self.this.clone();
        let config = self.config;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.poll_interval);
            interval.tick().await;
            let mut counter = IdleCounter::default();
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                let observation = match manager.observe(guild_id, channel_id).await {
                    Ok(observation) => observation,
                    Err(e) => {
                        warn!(%guild_id, error = %e, "watchdog poll failed");
                        continue;
                    }
                };
                if let Verdict::Disconnect(reason) = counter.tick(observation, &config) {
                    match manager.disconnect_watched(guild_id, reason, &token).await {
                        Ok(true) => {}
                        Ok(false) => debug!(%guild_id, "session ended during watchdog poll"),
                        Err(e) => warn!(%guild_id, error = %e, "watchdog teardown failed"),
                    }
                    break;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use encore_core::store::GuildDocument;
    use encore_core::track::{LoadResult, LoadType, NowPlayingMarker};
    use encore_test_support::{
        FixedClock, InMemoryQueueStore, NodeCall, RecordingChat, ScriptedNode, fixed_now, track,
    };

    use super::*;

    const GUILD: GuildId = GuildId(1);
    const TEXT: ChannelId = ChannelId(2);
    const VOICE: ChannelId = ChannelId(3);
    const OTHER_VOICE: ChannelId = ChannelId(4);
    const BOB: UserId = UserId(5);

    struct Fixture {
        store: Arc<InMemoryQueueStore>,
        node: Arc<ScriptedNode>,
        chat: Arc<RecordingChat>,
        manager: Arc<SessionManager>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryQueueStore::new());
        let node = Arc::new(ScriptedNode::new());
        let chat = Arc::new(RecordingChat::new());
        let controller = Arc::new(PlaybackController::new(
            store.clone(),
            node.clone(),
            chat.clone(),
        ));
        let manager = SessionManager::new(
            controller,
            store.clone(),
            node.clone(),
            chat.clone(),
            Arc::new(FixedClock(fixed_now())),
            WatchdogConfig {
                poll_interval: Duration::from_secs(1),
                inactivity: Duration::from_secs(5),
            },
        );
        Fixture {
            store,
            node,
            chat,
            manager,
        }
    }

    fn token() -> CorrelationToken {
        CorrelationToken {
            channel_id: TEXT,
            last_command_message_id: None,
        }
    }

    fn playable(node: &ScriptedNode, name: &str) -> QueueItem {
        node.script(
            &format!("ytsearch:{name}"),
            LoadResult {
                load_type: LoadType::SearchResult,
                tracks: vec![track(name)],
            },
        );
        QueueItem::search(BOB, format!("ytsearch:{name}"))
    }

    #[tokio::test]
    async fn test_connect_twice_to_same_channel_joins_once() {
        // Arrange
        let f = fixture();

        // Act
        let first = f.manager.connect(GUILD, VOICE, token()).await.unwrap();
        let second = f.manager.connect(GUILD, VOICE, token()).await.unwrap();

        // Assert
        assert_eq!(first, ConnectOutcome::Connected);
        assert_eq!(second, ConnectOutcome::AlreadyConnected);
        assert_eq!(f.chat.joins(), vec![(GUILD, VOICE)]);
        assert_eq!(f.store.correlation(GUILD).await.unwrap(), Some(token()));
    }

    #[tokio::test]
    async fn test_connect_to_other_channel_is_rejected() {
        // Arrange
        let f = fixture();
        f.manager.connect(GUILD, VOICE, token()).await.unwrap();

        // Act
        let result = f.manager.connect(GUILD, OTHER_VOICE, token()).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Voice(_))));
        assert_eq!(
            f.manager.session(GUILD).unwrap().unwrap().voice_channel_id,
            VOICE
        );
    }

    #[tokio::test]
    async fn test_failed_join_creates_no_session() {
        // Arrange
        let f = fixture();
        f.chat.fail_join("missing permissions");

        // Act
        let result = f.manager.connect(GUILD, VOICE, token()).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Voice(_))));
        assert!(!f.manager.is_connected(GUILD).unwrap());
    }

    #[tokio::test]
    async fn test_skip_without_session_is_not_connected() {
        // Arrange
        let f = fixture();

        // Act
        let result = f.manager.skip(GUILD).await;

        // Assert
        assert!(matches!(result, Err(DomainError::NotConnected(GUILD))));
    }

    #[tokio::test]
    async fn test_play_unplayable_items_tears_session_down() {
        // Arrange
        let f = fixture();

        // Act
        let outcome = f
            .manager
            .play(
                GUILD,
                VOICE,
                token(),
                vec![QueueItem::search(BOB, "ytsearch:nothing")],
            )
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome, EnqueueOutcome::Started(PlayOutcome::Exhausted));
        assert!(!f.manager.is_connected(GUILD).unwrap());
        assert_eq!(f.chat.leaves(), vec![GUILD]);
        assert!(f.chat.sent_messages().contains(&StatusMessage::Disconnected {
            reason: "Queue finished".to_owned(),
        }));
    }

    #[tokio::test]
    async fn test_skip_past_last_track_clears_session_state() {
        // Arrange
        let f = fixture();
        let a = playable(&f.node, "a");
        f.manager.play(GUILD, VOICE, token(), vec![a]).await.unwrap();

        // Act
        let outcome = f.manager.skip(GUILD).await.unwrap();

        // Assert
        assert!(outcome.is_exhausted());
        let state = f.store.get_state(GUILD).await.unwrap();
        assert_eq!(state.index, None);
        assert_eq!(state.queue.len(), 1);
        assert_eq!(f.store.now_playing(GUILD).await.unwrap(), None);
        assert_eq!(f.store.correlation(GUILD).await.unwrap(), None);
        assert!(!f.manager.is_connected(GUILD).unwrap());
    }

    #[tokio::test]
    async fn test_reset_deletes_document() {
        // Arrange
        let f = fixture();
        let a = playable(&f.node, "a");
        f.manager.play(GUILD, VOICE, token(), vec![a]).await.unwrap();

        // Act
        f.manager.reset(GUILD).await.unwrap();

        // Assert
        assert!(f.store.document(GUILD).is_none());
        assert!(f.node.calls().contains(&NodeCall::Stop(GUILD)));
    }

    #[tokio::test]
    async fn test_forced_disconnect_does_not_leave_voice_again() {
        // Arrange
        let f = fixture();
        f.manager.connect(GUILD, VOICE, token()).await.unwrap();

        // Act
        f.manager.handle_forced_disconnect(GUILD).await.unwrap();

        // Assert
        assert!(f.chat.leaves().is_empty());
        assert!(!f.manager.is_connected(GUILD).unwrap());
    }

    #[tokio::test]
    async fn test_bare_play_after_restart_replays_marked_track() {
        // Arrange
        let f = fixture();
        let a = playable(&f.node, "a");
        let b = playable(&f.node, "b");
        f.node.script(
            "https://youtube.com/watch?v=b",
            LoadResult {
                load_type: LoadType::TrackLoaded,
                tracks: vec![track("b")],
            },
        );
        f.store.put_document(
            GUILD,
            GuildDocument {
                queue: vec![a, b],
                queue_index: Some(1),
                now_playing_marker: Some(NowPlayingMarker::new(
                    &track("b"),
                    "ytsearch:b".to_owned(),
                )),
                ..GuildDocument::default()
            },
        );

        // Act
        let outcome = f
            .manager
            .resume_interrupted(GUILD, VOICE, token(), BOB)
            .await
            .unwrap();

        // Assert
        assert!(matches!(
            outcome,
            ResumeOutcome::Resumed { index: Some(1), .. }
        ));
        assert_eq!(f.node.current(GUILD), Some(track("b")));
        assert_eq!(f.store.get_state(GUILD).await.unwrap().index, Some(1));
        assert!(f.manager.is_connected(GUILD).unwrap());
    }

    #[tokio::test]
    async fn test_empty_channel_update_disconnects() {
        // Arrange
        let f = fixture();
        f.manager.connect(GUILD, VOICE, token()).await.unwrap();

        // Act
        let other = f
            .manager
            .handle_voice_update(GUILD, OTHER_VOICE, 0)
            .await
            .unwrap();
        let own = f.manager.handle_voice_update(GUILD, VOICE, 0).await.unwrap();

        // Assert
        assert!(!other);
        assert!(own);
        assert!(!f.manager.is_connected(GUILD).unwrap());
    }

    #[tokio::test]
    async fn test_skip_with_loop_all_wraps_and_keeps_session() {
        // Arrange
        let f = fixture();
        let a = playable(&f.node, "a");
        let b = playable(&f.node, "b");
        f.manager
            .play(GUILD, VOICE, token(), vec![a, b])
            .await
            .unwrap();
        f.manager.skip(GUILD).await.unwrap();
        f.store.set_loop_all(GUILD, true).await.unwrap();

        // Act
        let outcome = f.manager.skip(GUILD).await.unwrap();

        // Assert
        assert!(matches!(outcome, PlayOutcome::Started { index: 0, .. }));
        assert!(f.manager.is_connected(GUILD).unwrap());
        assert_eq!(f.store.get_state(GUILD).await.unwrap().index, Some(0));
        assert!(f.chat.leaves().is_empty());
    }

    #[tokio::test]
    async fn test_stale_watchdog_verdict_spares_the_next_session() {
        // Arrange
        let f = fixture();
        f.manager.connect(GUILD, VOICE, token()).await.unwrap();
        let old_watchdog = f.manager.lock().unwrap()[&GUILD].watchdog.clone();
        f.manager.stop(GUILD).await.unwrap();
        f.manager.connect(GUILD, VOICE, token()).await.unwrap();

        // Act
        let torn_down = f
            .manager
            .disconnect_watched(GUILD, DisconnectReason::Inactive, &old_watchdog)
            .await
            .unwrap();

        // Assert
        assert!(!torn_down);
        assert!(f.manager.is_connected(GUILD).unwrap());
        assert_eq!(f.store.correlation(GUILD).await.unwrap(), Some(token()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_disconnects_after_inactivity() {
        // Arrange
        let f = fixture();
        f.manager.connect(GUILD, VOICE, token()).await.unwrap();

        // Act
        tokio::time::sleep(Duration::from_secs(10)).await;

        // Assert
        assert!(!f.manager.is_connected(GUILD).unwrap());
        assert!(f.chat.sent_messages().contains(&StatusMessage::Disconnected {
            reason: "Inactive for too long".to_owned(),
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_keeps_playing_session() {
        // Arrange
        let f = fixture();
        f.manager.connect(GUILD, VOICE, token()).await.unwrap();
        f.node.set_playing(GUILD, track("a"));

        // Act
        tokio::time::sleep(Duration::from_secs(10)).await;

        // Assert
        assert!(f.manager.is_connected(GUILD).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_disconnects_when_alone() {
        // Arrange
        let f = fixture();
        f.manager.connect(GUILD, VOICE, token()).await.unwrap();
        f.node.set_playing(GUILD, track("a"));
        f.chat.set_occupants(0);

        // Act
        tokio::time::sleep(Duration::from_secs(3)).await;

        // Assert
        assert!(!f.manager.is_connected(GUILD).unwrap());
        assert_eq!(f.chat.leaves(), vec![GUILD]);
    }
}
