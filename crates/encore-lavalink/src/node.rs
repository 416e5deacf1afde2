//! `PlaybackNode` backed by a Lavalink v4 server.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use encore_core::error::DomainError;
use encore_core::event::TrackEndReason;
use encore_core::ids::{GuildId, UserId};
use encore_core::node::{PlayMode, PlaybackNode, PlayerSnapshot};
use encore_core::track::{LoadResult, Track};
use tracing::{debug, info, instrument};
use url::Url;

use crate::client::RestClient;
use crate::error::LavalinkError;
use crate::player::{EndAction, GuildPlayer};
use crate::protocol::{PlayerUpdate, VoiceUpdate};

/// Connection settings for one Lavalink node.
#[derive(Debug, Clone)]
pub struct LavalinkConfig {
    /// REST base URL, e.g. `http://localhost:2333`.
    pub url: Url,
    /// Node password.
    pub password: String,
    /// The bot's own user id.
    pub user_id: UserId,
    /// Client name announced on the websocket.
    pub client_name: String,
}

/// Lavalink-backed playback node.
pub struct LavalinkNode {
    rest: RestClient,
    user_id: UserId,
    client_name: String,
    session_id: RwLock<Option<String>>,
    players: Mutex<HashMap<GuildId, GuildPlayer>>,
}

impl LavalinkNode {
    /// Creates the node client. The websocket is started separately with
    /// [`LavalinkNode::run_events`].
    ///
    /// # Errors
    ///
    /// Returns `LavalinkError::Http` if the HTTP client cannot be built.
    pub fn new(config: LavalinkConfig) -> Result<Self, LavalinkError> {
        Ok(Self {
            rest: RestClient::new(config.url, config.password)?,
            user_id: config.user_id,
            client_name: config.client_name,
            session_id: RwLock::new(None),
            players: Mutex::new(HashMap::new()),
        })
    }

    pub(crate) fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub(crate) fn user_id(&self) -> UserId {
        self.user_id
    }

    pub(crate) fn client_name(&self) -> &str {
        &self.client_name
    }

    pub(crate) fn set_session(&self, session_id: Option<String>) -> Result<(), DomainError> {
        let mut guard = self
            .session_id
            .write()
            .map_err(|e| DomainError::Infrastructure(format!("session lock poisoned: {e}")))?;
        *guard = session_id;
        Ok(())
    }

    fn session(&self) -> Result<String, DomainError> {
        self.session_id
            .read()
            .map_err(|e| DomainError::Infrastructure(format!("session lock poisoned: {e}")))?
            .clone()
            .ok_or_else(|| LavalinkError::NoSession.into())
    }

    fn with_player<R>(
        &self,
        guild_id: GuildId,
        f: impl FnOnce(&mut GuildPlayer) -> R,
    ) -> Result<R, DomainError> {
        let mut players = self
            .players
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("player table poisoned: {e}")))?;
        Ok(f(players.entry(guild_id).or_default()))
    }

    fn with_existing_player<R>(
        &self,
        guild_id: GuildId,
        f: impl FnOnce(&mut GuildPlayer) -> R,
    ) -> Result<Option<R>, DomainError> {
        let mut players = self
            .players
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("player table poisoned: {e}")))?;
        Ok(players.get_mut(&guild_id).map(f))
    }

    async fn send(&self, guild_id: GuildId, update: &PlayerUpdate) -> Result<(), DomainError> {
        let session_id = self.session()?;
        self.rest
            .update_player(&session_id, guild_id, update)
            .await?;
        Ok(())
    }

    async fn load(&self, guild_id: GuildId, encoded: Option<String>) -> Result<(), DomainError> {
        self.send(guild_id, &PlayerUpdate::track(encoded)).await
    }

    /// The bot's voice session changed. `None` means it left voice: the
    /// player is forgotten and destroyed on the node.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ExternalService` if the node rejects the update.
    #[instrument(skip(self, session_id))]
    pub async fn update_voice_state(
        &self,
        guild_id: GuildId,
        session_id: Option<String>,
    ) -> Result<(), DomainError> {
        let Some(session_id) = session_id else {
            let removed = self
                .players
                .lock()
                .map_err(|e| DomainError::Infrastructure(format!("player table poisoned: {e}")))?
                .remove(&guild_id);
            if removed.is_some() {
                let node_session = self.session()?;
                self.rest.destroy_player(&node_session, guild_id).await?;
                info!("player destroyed after leaving voice");
            }
            return Ok(());
        };
        let voice = self.with_player(guild_id, |p| {
            p.voice.session_id = Some(session_id);
            p.voice.update()
        })?;
        self.push_voice(guild_id, voice).await
    }

    /// The chat platform assigned a voice server.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ExternalService` if the node rejects the update.
    #[instrument(skip(self, token, endpoint))]
    pub async fn update_voice_server(
        &self,
        guild_id: GuildId,
        token: String,
        endpoint: String,
    ) -> Result<(), DomainError> {
        let voice = self.with_player(guild_id, |p| {
            p.voice.token = Some(token);
            p.voice.endpoint = Some(endpoint);
            p.voice.update()
        })?;
        self.push_voice(guild_id, voice).await
    }

    async fn push_voice(
        &self,
        guild_id: GuildId,
        voice: Option<VoiceUpdate>,
    ) -> Result<(), DomainError> {
        let Some(voice) = voice else {
            debug!(%guild_id, "voice handshake incomplete");
            return Ok(());
        };
        self.send(
            guild_id,
            &PlayerUpdate {
                voice: Some(voice),
                ..PlayerUpdate::default()
            },
        )
        .await
    }

    /// Applies a node-side track end to the local player and loads whatever
    /// comes next. Returns whether the player queue drained.
    pub(crate) async fn on_track_end(
        &self,
        guild_id: GuildId,
        ended: &Track,
        reason: TrackEndReason,
    ) -> Result<bool, DomainError> {
        let action = self
            .with_existing_player(guild_id, |p| p.on_track_end(ended, reason))?
            .unwrap_or(EndAction::None);
        match action {
            EndAction::Replay(track) => {
                debug!(%guild_id, "replaying repeated track");
                self.load(guild_id, Some(track.encoded)).await?;
                Ok(false)
            }
            EndAction::Next(track) => {
                self.load(guild_id, Some(track.encoded)).await?;
                Ok(false)
            }
            EndAction::Drained => Ok(true),
            EndAction::None => Ok(false),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_current(&self, guild_id: GuildId, track: Track) -> Result<(), DomainError> {
        self.with_player(guild_id, |p| p.current = Some(track))
    }

    /// Forgets every player, as after the node lost its session.
    pub(crate) fn reset_players(&self) -> Result<(), DomainError> {
        let mut players = self
            .players
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("player table poisoned: {e}")))?;
        for player in players.values_mut() {
            player.clear();
        }
        Ok(())
    }
}

#[async_trait]
impl PlaybackNode for LavalinkNode {
    async fn search(&self, query: &str) -> Result<LoadResult, DomainError> {
        Ok(self.rest.load_tracks(query).await?.into())
    }

    async fn play(
        &self,
        guild_id: GuildId,
        track: Track,
        mode: PlayMode,
    ) -> Result<(), DomainError> {
        let (load, rollback) = self.with_player(guild_id, |p| p.hand_off(track, mode))?;
        let Some(track) = load else {
            debug!(%guild_id, "track queued behind the current one");
            return Ok(());
        };
        if let Err(e) = self.load(guild_id, Some(track.encoded)).await {
            self.with_player(guild_id, |p| p.roll_back(rollback))?;
            return Err(e);
        }
        Ok(())
    }

    async fn pause(&self, guild_id: GuildId, paused: bool) -> Result<(), DomainError> {
        self.send(
            guild_id,
            &PlayerUpdate {
                paused: Some(paused),
                ..PlayerUpdate::default()
            },
        )
        .await?;
        self.with_player(guild_id, |p| p.paused = paused)
    }

    async fn stop(&self, guild_id: GuildId) -> Result<(), DomainError> {
        let had_player = self
            .with_existing_player(guild_id, GuildPlayer::clear)?
            .is_some();
        if had_player {
            self.load(guild_id, None).await?;
        }
        Ok(())
    }

    async fn set_volume(&self, guild_id: GuildId, volume: u16) -> Result<(), DomainError> {
        self.send(
            guild_id,
            &PlayerUpdate {
                volume: Some(volume),
                ..PlayerUpdate::default()
            },
        )
        .await?;
        self.with_player(guild_id, |p| p.volume = volume)
    }

    async fn set_repeat(&self, guild_id: GuildId, repeat: bool) -> Result<(), DomainError> {
        self.with_player(guild_id, |p| p.repeat = repeat)
    }

    async fn player(&self, guild_id: GuildId) -> Result<Option<PlayerSnapshot>, DomainError> {
        self.with_existing_player(guild_id, |p| p.snapshot())
    }
}

impl std::fmt::Debug for LavalinkNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LavalinkNode")
            .field("base_url", &self.rest.base_url().as_str())
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use encore_core::track::TrackInfo;

    use super::*;

    const GUILD: GuildId = GuildId(5);

    fn node() -> LavalinkNode {
        LavalinkNode::new(LavalinkConfig {
            url: Url::parse("http://localhost:2333").unwrap(),
            password: "youshallnotpass".to_owned(),
            user_id: UserId(1),
            client_name: "encore".to_owned(),
        })
        .unwrap()
    }

    fn track(id: &str) -> Track {
        Track {
            encoded: format!("enc-{id}"),
            info: TrackInfo {
                identifier: id.to_owned(),
                title: id.to_owned(),
                author: "someone".to_owned(),
                uri: None,
                length_ms: 1_000,
                is_stream: false,
            },
        }
    }

    #[tokio::test]
    async fn test_unknown_guild_has_no_player() {
        assert_eq!(node().player(GUILD).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_repeat_is_tracked_locally() {
        let node = node();

        node.set_repeat(GUILD, true).await.unwrap();

        let player = node.player(GUILD).await.unwrap().unwrap();
        assert!(player.repeat);
        assert_eq!(player.volume, 100);
    }

    #[tokio::test]
    async fn test_failed_start_leaves_idle_player_empty() {
        let node = node();

        let first = node.play(GUILD, track("a"), PlayMode::Enqueue).await;
        let second = node.play(GUILD, track("b"), PlayMode::Enqueue).await;

        assert!(matches!(first, Err(DomainError::ExternalService(_))));
        assert!(matches!(second, Err(DomainError::ExternalService(_))));
        let players = node.players.lock().unwrap();
        let player = &players[&GUILD];
        assert_eq!(player.current, None);
        assert!(player.queue.is_empty());
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_current_track() {
        let node = node();
        node.set_current(GUILD, track("a")).unwrap();

        let result = node.play(GUILD, track("b"), PlayMode::Replace).await;

        assert!(matches!(result, Err(DomainError::ExternalService(_))));
        let player = node.player(GUILD).await.unwrap().unwrap();
        assert_eq!(player.current, Some(track("a")));
    }

    #[tokio::test]
    async fn test_enqueue_behind_current_needs_no_session() {
        let node = node();
        node.set_current(GUILD, track("a")).unwrap();

        node.play(GUILD, track("b"), PlayMode::Enqueue).await.unwrap();

        let players = node.players.lock().unwrap();
        assert_eq!(players[&GUILD].current, Some(track("a")));
        assert_eq!(players[&GUILD].queue.len(), 1);
    }

    #[tokio::test]
    async fn test_stop_without_player_is_noop() {
        assert!(node().stop(GUILD).await.is_ok());
    }
}
