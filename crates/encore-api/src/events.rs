//! Sequential dispatch of node events.

use std::sync::Arc;

use encore_core::event::NodeEvent;
use encore_session::SessionManager;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Drains `events` one at a time into the session manager until every
/// sender is dropped.
pub async fn dispatch_node_events(
    sessions: Arc<SessionManager>,
    mut events: mpsc::Receiver<NodeEvent>,
) {
    while let Some(event) = events.recv().await {
        let guild_id = event.guild_id();
        let event_type = event.event_type();
        match sessions.handle_node_event(event).await {
            Ok(outcome) => debug!(%guild_id, event_type, ?outcome, "node event handled"),
            Err(e) => warn!(%guild_id, event_type, error = %e, "node event handling failed"),
        }
    }
    info!("node event channel closed");
}
