//! Node websocket: session handshake and event translation.

use std::sync::Arc;
use std::time::Duration;

use encore_core::event::NodeEvent;
use encore_core::ids::GuildId;
use encore_core::track::Track;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::LavalinkError;
use crate::node::LavalinkNode;
use crate::protocol::{Frame, WireEvent};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

fn header(value: &str) -> Result<HeaderValue, LavalinkError> {
    HeaderValue::from_str(value).map_err(|e| LavalinkError::Header(e.to_string()))
}

fn parse_guild(raw: &str) -> Option<GuildId> {
    match raw.parse::<u64>() {
        Ok(id) => Some(GuildId(id)),
        Err(e) => {
            warn!(guild_id = raw, error = %e, "event for unparseable guild id");
            None
        }
    }
}

impl LavalinkNode {
    /// Keeps the node websocket open until `shutdown` fires, reconnecting
    /// after every drop, and forwards player events to `events`.
    pub async fn run_events(
        self: Arc<Self>,
        events: mpsc::Sender<NodeEvent>,
        shutdown: CancellationToken,
    ) {
        loop {
            let result = tokio::select! {
                () = shutdown.cancelled() => break,
                result = self.listen(&events) => result,
            };
            if let Err(e) = result {
                warn!(error = %e, "lavalink websocket dropped");
            }
            if let Err(e) = self.set_session(None) {
                warn!(error = %e, "failed to clear lavalink session");
            }
            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }
        info!("lavalink event stream stopped");
    }

    async fn listen(&self, events: &mpsc::Sender<NodeEvent>) -> Result<(), LavalinkError> {
        let url = self.rest().websocket_url()?;
        let mut request = url.as_str().into_client_request()?;
        let headers = request.headers_mut();
        headers.insert("Authorization", header(self.rest().password())?);
        headers.insert("User-Id", HeaderValue::from(self.user_id().get()));
        headers.insert("Client-Name", header(self.client_name())?);

        let (stream, _) = connect_async(request).await?;
        info!(%url, "connected to lavalink");
        let (mut write, mut read) = stream.split();

        while let Some(message) = read.next().await {
            match message? {
                Message::Text(text) => match serde_json::from_str::<Frame>(text.as_str()) {
                    Ok(frame) => self.handle_frame(frame, events).await,
                    Err(e) => warn!(error = %e, "unparseable lavalink frame"),
                },
                Message::Ping(data) => write.send(Message::Pong(data)).await?,
                Message::Close(_) => {
                    info!("lavalink closed the websocket");
                    break;
                }
                _ => {}
            }
        }
        Ok(())
    }

    async fn handle_frame(&self, frame: Frame, events: &mpsc::Sender<NodeEvent>) {
        match frame {
            Frame::Ready {
                resumed,
                session_id,
            } => {
                info!(%session_id, resumed, "lavalink session ready");
                if let Err(e) = self.set_session(Some(session_id)) {
                    warn!(error = %e, "failed to record lavalink session");
                }
                if !resumed && let Err(e) = self.reset_players() {
                    warn!(error = %e, "failed to reset players");
                }
            }
            Frame::Event(event) => {
                for event in self.translate(event).await {
                    if events.send(event).await.is_err() {
                        warn!("node event receiver dropped");
                    }
                }
            }
            Frame::PlayerUpdate | Frame::Stats => {}
            Frame::Unknown => debug!("ignoring unknown lavalink op"),
        }
    }

    /// Turns one wire event into the node events it implies, advancing the
    /// local player queue on track ends.
    pub(crate) async fn translate(&self, event: WireEvent) -> Vec<NodeEvent> {
        match event {
            WireEvent::TrackStartEvent { guild_id, track } => parse_guild(&guild_id)
                .map(|guild_id| NodeEvent::TrackStart {
                    guild_id,
                    track: track.into(),
                })
                .into_iter()
                .collect(),
            WireEvent::TrackEndEvent {
                guild_id,
                track,
                reason,
            } => {
                let Some(guild_id) = parse_guild(&guild_id) else {
                    return Vec::new();
                };
                let track = Track::from(track);
                let reason = reason.into();
                let drained = match self.on_track_end(guild_id, &track, reason).await {
                    Ok(drained) => drained,
                    Err(e) => {
                        warn!(%guild_id, error = %e, "failed to load next track");
                        false
                    }
                };
                let mut out = vec![NodeEvent::TrackEnd {
                    guild_id,
                    track,
                    reason,
                }];
                if drained {
                    out.push(NodeEvent::QueueEnd { guild_id });
                }
                out
            }
            WireEvent::TrackExceptionEvent {
                guild_id,
                exception,
            } => {
                warn!(
                    %guild_id,
                    severity = %exception.severity,
                    message = exception.message.as_deref().unwrap_or("unknown"),
                    "track exception"
                );
                Vec::new()
            }
            WireEvent::TrackStuckEvent {
                guild_id,
                threshold_ms,
            } => {
                warn!(%guild_id, threshold_ms, "track stuck");
                Vec::new()
            }
            WireEvent::WebSocketClosedEvent {
                guild_id,
                code,
                reason,
            } => {
                warn!(%guild_id, code, %reason, "node voice connection closed");
                Vec::new()
            }
            WireEvent::Unknown => {
                debug!("ignoring unknown lavalink event");
                Vec::new()
            }
        }
    }
}
