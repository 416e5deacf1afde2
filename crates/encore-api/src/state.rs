//! Shared application state.

use std::sync::{Arc, Mutex};

use encore_core::catalog::Catalog;
use encore_core::chat::ChatGateway;
use encore_core::clock::Clock;
use encore_core::ids::UserId;
use encore_core::node::PlaybackNode;
use encore_core::rng::DeterministicRng;
use encore_core::store::QueueStore;
use encore_playback::PlaybackController;
use encore_session::SessionManager;
use encore_session::domain::watchdog::WatchdogConfig;

use crate::voice::VoiceBridge;

/// Collaborators the composition root hands to the state.
pub struct Collaborators {
    /// Durable per-guild queue documents.
    pub store: Arc<dyn QueueStore>,
    /// The playback node.
    pub node: Arc<dyn PlaybackNode>,
    /// The music catalog.
    pub catalog: Arc<dyn Catalog>,
    /// The chat platform.
    pub chat: Arc<dyn ChatGateway>,
    /// Voice handshake sink.
    pub voice: Arc<dyn VoiceBridge>,
    /// Clock for session timestamps.
    pub clock: Arc<dyn Clock>,
    /// Shuffle randomness.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Durable per-guild queue documents.
    pub store: Arc<dyn QueueStore>,
    /// The playback node.
    pub node: Arc<dyn PlaybackNode>,
    /// The music catalog.
    pub catalog: Arc<dyn Catalog>,
    /// The chat platform.
    pub chat: Arc<dyn ChatGateway>,
    /// Voice handshake sink.
    pub voice: Arc<dyn VoiceBridge>,
    /// Shuffle randomness.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Voice sessions and the playback controller they drive.
    pub sessions: Arc<SessionManager>,
    /// The bot's own user id.
    pub bot_user_id: UserId,
}

impl AppState {
    /// Create new application state. The playback controller and session
    /// manager are built here, once.
    #[must_use]
    pub fn new(parts: Collaborators, watchdog: WatchdogConfig, bot_user_id: UserId) -> Self {
        let controller = Arc::new(PlaybackController::new(
            parts.store.clone(),
            parts.node.clone(),
            parts.chat.clone(),
        ));
        let sessions = SessionManager::new(
            controller,
            parts.store.clone(),
            parts.node.clone(),
            parts.chat.clone(),
            parts.clock,
            watchdog,
        );
        Self {
            store: parts.store,
            node: parts.node,
            catalog: parts.catalog,
            chat: parts.chat,
            voice: parts.voice,
            rng: parts.rng,
            sessions,
            bot_user_id,
        }
    }

    /// The playback controller.
    #[must_use]
    pub fn controller(&self) -> &PlaybackController {
        self.sessions.controller()
    }
}
