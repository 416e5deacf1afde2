//! Routes for the Session Lifecycle Manager: explicit teardown and the
//! voice events the chat front-end relays.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::post};
use encore_core::ids::{ChannelId, GuildId, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /voice-state.
#[derive(Debug, Deserialize)]
pub struct VoiceStateRequest {
    /// Whose voice state changed.
    pub user_id: UserId,
    /// The channel they are in now, if any.
    pub channel_id: Option<ChannelId>,
    /// Voice session id; only meaningful for the bot itself.
    pub session_id: Option<String>,
    /// The channel they left, if any.
    pub previous_channel_id: Option<ChannelId>,
    /// Members other than the bot left in `previous_channel_id`.
    pub occupants: Option<usize>,
}

/// Request body for POST /voice-server.
#[derive(Debug, Deserialize)]
pub struct VoiceServerRequest {
    /// Voice connection token.
    pub token: String,
    /// Voice server host.
    pub endpoint: String,
}

/// Response body for session commands.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Whether the guild still has a voice session.
    pub connected: bool,
}

fn connected(state: &AppState, guild_id: GuildId) -> Result<Json<SessionResponse>, ApiError> {
    Ok(Json(SessionResponse {
        connected: state.sessions.is_connected(guild_id)?,
    }))
}

/// POST /stop
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn stop(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<SessionResponse>, ApiError> {
    info!(correlation_id = %Uuid::new_v4(), "handling stop command");
    state.sessions.stop(guild_id).await?;
    connected(&state, guild_id)
}

/// POST /reset
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn reset(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<SessionResponse>, ApiError> {
    info!(correlation_id = %Uuid::new_v4(), "handling reset command");
    state.sessions.reset(guild_id).await?;
    connected(&state, guild_id)
}

/// POST /voice-state
#[instrument(skip(state, request), fields(guild_id = %guild_id, user_id = %request.user_id))]
async fn voice_state(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
    Json(request): Json<VoiceStateRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if request.user_id == state.bot_user_id {
        let left = request.channel_id.is_none();
        state
            .voice
            .voice_state(guild_id, request.session_id)
            .await?;
        if left && state.sessions.is_connected(guild_id)? {
            info!("bot removed from voice");
            state.sessions.handle_forced_disconnect(guild_id).await?;
        }
        return connected(&state, guild_id);
    }

    if let (Some(channel_id), Some(occupants)) = (request.previous_channel_id, request.occupants)
        && state
            .sessions
            .handle_voice_update(guild_id, channel_id, occupants)
            .await?
    {
        debug!(%channel_id, "left alone in voice");
    }
    connected(&state, guild_id)
}

/// POST /voice-server
#[instrument(skip(state, request), fields(guild_id = %guild_id))]
async fn voice_server(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
    Json(request): Json<VoiceServerRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    state
        .voice
        .voice_server(guild_id, request.token, request.endpoint)
        .await?;
    connected(&state, guild_id)
}

/// POST /forced-disconnect
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn forced_disconnect(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<SessionResponse>, ApiError> {
    state.sessions.handle_forced_disconnect(guild_id).await?;
    connected(&state, guild_id)
}

/// Returns the router for session commands and voice events.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stop", post(stop))
        .route("/reset", post(reset))
        .route("/voice-state", post(voice_state))
        .route("/voice-server", post(voice_server))
        .route("/forced-disconnect", post(forced_disconnect))
}
