//! Client-side player state kept per guild.

use std::collections::VecDeque;

use encore_core::event::TrackEndReason;
use encore_core::node::{PlayMode, PlayerSnapshot};
use encore_core::track::Track;

use crate::protocol::VoiceUpdate;

const DEFAULT_VOLUME: u16 = 100;

/// Voice handshake pieces, forwarded to the node once all three are known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceState {
    /// The bot's voice session id.
    pub session_id: Option<String>,
    /// Voice server token.
    pub token: Option<String>,
    /// Voice server endpoint.
    pub endpoint: Option<String>,
}

impl VoiceState {
    /// The complete voice update, once every piece has arrived.
    #[must_use]
    pub fn update(&self) -> Option<VoiceUpdate> {
        Some(VoiceUpdate {
            token: self.token.clone()?,
            endpoint: self.endpoint.clone()?,
            session_id: self.session_id.clone()?,
        })
    }
}

/// One guild's player.
#[derive(Debug, Clone)]
pub struct GuildPlayer {
    /// Tracks added but not started yet.
    pub queue: VecDeque<Track>,
    /// The track loaded on the node.
    pub current: Option<Track>,
    /// Pause state.
    pub paused: bool,
    /// Volume.
    pub volume: u16,
    /// Whether the current track repeats.
    pub repeat: bool,
    /// Voice handshake.
    pub voice: VoiceState,
}

impl Default for GuildPlayer {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            current: None,
            paused: false,
            volume: DEFAULT_VOLUME,
            repeat: false,
            voice: VoiceState::default(),
        }
    }
}

/// Queue state captured before a hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollback {
    current: Option<Track>,
    queue: VecDeque<Track>,
}

/// What the adapter must do after the node reports a track end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndAction {
    /// Load this track again.
    Replay(Track),
    /// Load the next added track.
    Next(Track),
    /// Nothing left: report the queue end.
    Drained,
    /// The end does not concern the current track.
    None,
}

impl GuildPlayer {
    /// Applies a hand-off. Returns the track the node must load now, if any,
    /// and the queue state to restore should that load fail.
    pub fn hand_off(&mut self, track: Track, mode: PlayMode) -> (Option<Track>, Rollback) {
        let rollback = Rollback {
            current: self.current.clone(),
            queue: self.queue.clone(),
        };
        let load = match mode {
            PlayMode::Enqueue if self.current.is_some() => {
                self.queue.push_back(track);
                None
            }
            PlayMode::Enqueue => {
                self.current = Some(track.clone());
                Some(track)
            }
            PlayMode::Replace => {
                self.queue.clear();
                self.current = Some(track.clone());
                Some(track)
            }
        };
        (load, rollback)
    }

    /// Undoes a hand-off whose load the node rejected.
    pub fn roll_back(&mut self, rollback: Rollback) {
        self.current = rollback.current;
        self.queue = rollback.queue;
    }

    /// Cuts the current track and moves to the next added one, if any.
    pub fn cut(&mut self) -> Option<Track> {
        self.current = self.queue.pop_front();
        self.current.clone()
    }

    /// Drops every track.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.current = None;
        self.paused = false;
    }

    /// Applies a node-side track end.
    pub fn on_track_end(&mut self, ended: &Track, reason: TrackEndReason) -> EndAction {
        let is_current = self
            .current
            .as_ref()
            .is_some_and(|current| current.encoded == ended.encoded);
        if !is_current || !reason.may_start_next() {
            return EndAction::None;
        }
        if self.repeat && reason == TrackEndReason::Finished {
            return EndAction::Replay(ended.clone());
        }
        match self.cut() {
            Some(next) => EndAction::Next(next),
            None => EndAction::Drained,
        }
    }

    /// What the node reports for this player.
    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current: self.current.clone(),
            paused: self.paused,
            volume: self.volume,
            repeat: self.repeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use encore_core::track::TrackInfo;

    use super::*;

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

    fn playing(id: &str) -> GuildPlayer {
        GuildPlayer {
            current: Some(track(id)),
            ..GuildPlayer::default()
        }
    }

    #[test]
    fn test_enqueue_waits_behind_busy_player() {
        let mut player = playing("a");

        let (load, _) = player.hand_off(track("b"), PlayMode::Enqueue);

        assert_eq!(load, None);
        assert_eq!(player.current, Some(track("a")));
        assert_eq!(player.queue, VecDeque::from([track("b")]));
    }

    #[test]
    fn test_replace_drops_waiting_tracks() {
        let mut player = playing("a");
        player.queue.push_back(track("b"));

        let (load, _) = player.hand_off(track("c"), PlayMode::Replace);

        assert_eq!(load, Some(track("c")));
        assert_eq!(player.current, Some(track("c")));
        assert!(player.queue.is_empty());
    }

    #[test]
    fn test_roll_back_restores_previous_tracks() {
        let mut player = playing("a");
        player.queue.push_back(track("b"));

        let (_, rollback) = player.hand_off(track("c"), PlayMode::Replace);
        player.roll_back(rollback);

        assert_eq!(player.current, Some(track("a")));
        assert_eq!(player.queue, VecDeque::from([track("b")]));
    }

    #[test]
    fn test_finished_track_moves_to_next_added() {
        let mut player = playing("a");
        player.queue.push_back(track("b"));

        let action = player.on_track_end(&track("a"), TrackEndReason::Finished);

        assert_eq!(action, EndAction::Next(track("b")));
        assert_eq!(player.current, Some(track("b")));
    }

    #[test]
    fn test_finished_last_track_drains() {
        let mut player = playing("a");

        let action = player.on_track_end(&track("a"), TrackEndReason::Finished);

        assert_eq!(action, EndAction::Drained);
        assert!(!player.snapshot().has_track());
    }

    #[test]
    fn test_repeat_replays_only_on_finish() {
        let mut player = playing("a");
        player.repeat = true;

        let finished = player.on_track_end(&track("a"), TrackEndReason::Finished);
        let failed = player.on_track_end(&track("a"), TrackEndReason::LoadFailed);

        assert_eq!(finished, EndAction::Replay(track("a")));
        assert_eq!(failed, EndAction::Drained);
    }

    #[test]
    fn test_replaced_or_stale_end_is_ignored() {
        let mut player = playing("b");

        assert_eq!(
            player.on_track_end(&track("a"), TrackEndReason::Finished),
            EndAction::None
        );
        assert_eq!(
            player.on_track_end(&track("b"), TrackEndReason::Replaced),
            EndAction::None
        );
        assert_eq!(player.current, Some(track("b")));
    }

    #[test]
    fn test_voice_update_needs_all_pieces() {
        let mut voice = VoiceState {
            session_id: Some("s".to_owned()),
            token: Some("t".to_owned()),
            ..VoiceState::default()
        };
        assert!(voice.update().is_none());

        voice.endpoint = Some("e".to_owned());

        assert_eq!(
            voice.update(),
            Some(VoiceUpdate {
                token: "t".to_owned(),
                endpoint: "e".to_owned(),
                session_id: "s".to_owned(),
            })
        );
    }
}
