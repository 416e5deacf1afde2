//! Scripted playback node — a deterministic `PlaybackNode` for tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use encore_core::error::DomainError;
use encore_core::ids::GuildId;
use encore_core::node::{PlayMode, PlaybackNode, PlayerSnapshot};
use encore_core::track::{LoadResult, LoadType, Track, TrackInfo};

/// A call made against the scripted node, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeCall {
    /// `search(query)`.
    Search(String),
    /// `play(guild, track, mode)`, recorded by encoded track.
    Play(GuildId, String, PlayMode),
    /// `pause(guild, paused)`.
    Pause(GuildId, bool),
    /// `stop(guild)`.
    Stop(GuildId),
    /// `set_volume(guild, volume)`.
    SetVolume(GuildId, u16),
    /// `set_repeat(guild, repeat)`.
    SetRepeat(GuildId, bool),
}

#[derive(Debug, Default)]
struct FakePlayer {
    queue: VecDeque<Track>,
    current: Option<Track>,
    paused: bool,
    volume: u16,
    repeat: bool,
}

impl FakePlayer {
    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current: self.current.clone(),
            paused: self.paused,
            volume: self.volume,
            repeat: self.repeat,
        }
    }
}

/// Builds a track whose encoded blob, identifier and title derive from `id`.
#[must_use]
pub fn track(id: &str) -> Track {
    Track {
        encoded: format!("enc-{id}"),
        info: TrackInfo {
            identifier: id.to_owned(),
            title: format!("Title {id}"),
            author: format!("Author {id}"),
            uri: Some(format!("https://youtube.com/watch?v={id}")),
            length_ms: 180_000,
            is_stream: false,
        },
    }
}

/// A node whose search results are scripted per query and whose player
/// queue is simulated in memory. Unknown queries yield `NO_MATCHES`.
///
/// Every method panics if an internal mutex is poisoned.
#[derive(Debug, Default)]
pub struct ScriptedNode {
    results: Mutex<HashMap<String, LoadResult>>,
    failing: Mutex<HashSet<String>>,
    refuse_play: Mutex<bool>,
    players: Mutex<HashMap<GuildId, FakePlayer>>,
    calls: Mutex<Vec<NodeCall>>,
}

impl ScriptedNode {
    /// Create a node with no scripted results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `query` to load `track` as a search result.
    #[must_use]
    pub fn with_track(self, query: &str, track: Track) -> Self {
        self.script(
            query,
            LoadResult {
                load_type: LoadType::SearchResult,
                tracks: vec![track],
            },
        );
        self
    }

    /// Scripts `query` to produce `result`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn script(&self, query: &str, result: LoadResult) {
        self.results
            .lock()
            .unwrap()
            .insert(query.to_owned(), result);
    }

    /// Makes searches for `query` fail with a transport error.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_search(&self, query: &str) {
        self.failing.lock().unwrap().insert(query.to_owned());
    }

    /// Makes every `play` hand-off fail, leaving the player untouched.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn refuse_play(&self, refuse: bool) {
        *self.refuse_play.lock().unwrap() = refuse;
    }

    /// Tracks waiting behind the current one, by encoded blob.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn queued(&self, guild_id: GuildId) -> Vec<String> {
        self.players
            .lock()
            .unwrap()
            .get(&guild_id)
            .map(|p| p.queue.iter().map(|t| t.encoded.clone()).collect())
            .unwrap_or_default()
    }

    /// Installs a player that is already playing `track`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set_playing(&self, guild_id: GuildId, track: Track) {
        self.with_player(guild_id, |p| {
            p.current = Some(track);
            p.paused = false;
        });
    }

    /// Marks the guild's player as paused or unpaused without recording a call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set_paused(&self, guild_id: GuildId, paused: bool) {
        self.with_player(guild_id, |p| p.paused = paused);
    }

    /// Simulates the current track ending: the player moves to its next
    /// added track, or goes idle.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn finish_current(&self, guild_id: GuildId) {
        if let Some(player) = self.players.lock().unwrap().get_mut(&guild_id) {
            player.current = player.queue.pop_front();
        }
    }

    /// Drops the guild's player, as after a node restart.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn drop_player(&self, guild_id: GuildId) {
        self.players.lock().unwrap().remove(&guild_id);
    }

    /// The track the guild's player is on, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn current(&self, guild_id: GuildId) -> Option<Track> {
        self.players
            .lock()
            .unwrap()
            .get(&guild_id)
            .and_then(|p| p.current.clone())
    }

    /// All calls made so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<NodeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Forgets the recorded calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: NodeCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn with_player<T>(&self, guild_id: GuildId, f: impl FnOnce(&mut FakePlayer) -> T) -> T {
        let mut players = self.players.lock().unwrap();
        f(players.entry(guild_id).or_insert_with(|| FakePlayer {
            volume: 100,
            ..FakePlayer::default()
        }))
    }
}

#[async_trait]
impl PlaybackNode for ScriptedNode {
    async fn search(&self, query: &str) -> Result<LoadResult, DomainError> {
        self.record(NodeCall::Search(query.to_owned()));
        if self.failing.lock().unwrap().contains(query) {
            return Err(DomainError::ExternalService(format!(
                "search for '{query}' timed out"
            )));
        }
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_else(|| LoadResult::empty(LoadType::NoMatches)))
    }

    async fn play(
        &self,
        guild_id: GuildId,
        track: Track,
        mode: PlayMode,
    ) -> Result<(), DomainError> {
        self.record(NodeCall::Play(guild_id, track.encoded.clone(), mode));
        if *self.refuse_play.lock().unwrap() {
            return Err(DomainError::ExternalService(
                "node refused the track".to_owned(),
            ));
        }
        self.with_player(guild_id, |p| match mode {
            PlayMode::Enqueue if p.current.is_some() => p.queue.push_back(track),
            PlayMode::Enqueue => p.current = Some(track),
            PlayMode::Replace => {
                p.queue.clear();
                p.current = Some(track);
            }
        });
        Ok(())
    }

    async fn pause(&self, guild_id: GuildId, paused: bool) -> Result<(), DomainError> {
        self.record(NodeCall::Pause(guild_id, paused));
        self.with_player(guild_id, |p| p.paused = paused);
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> Result<(), DomainError> {
        self.record(NodeCall::Stop(guild_id));
        self.with_player(guild_id, |p| {
            p.current = None;
            p.queue.clear();
        });
        Ok(())
    }

    async fn set_volume(&self, guild_id: GuildId, volume: u16) -> Result<(), DomainError> {
        self.record(NodeCall::SetVolume(guild_id, volume));
        self.with_player(guild_id, |p| p.volume = volume);
        Ok(())
    }

    async fn set_repeat(&self, guild_id: GuildId, repeat: bool) -> Result<(), DomainError> {
        self.record(NodeCall::SetRepeat(guild_id, repeat));
        self.with_player(guild_id, |p| p.repeat = repeat);
        Ok(())
    }

    async fn player(&self, guild_id: GuildId) -> Result<Option<PlayerSnapshot>, DomainError> {
        Ok(self
            .players
            .lock()
            .unwrap()
            .get(&guild_id)
            .map(FakePlayer::snapshot))
    }
}
