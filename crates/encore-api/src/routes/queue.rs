//! Routes for the Queue Mutator.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::post};
use encore_core::ids::GuildId;
use encore_queue::application::command_handlers::{self, QueueCommandResult};
use encore_queue::domain::commands;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /move.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// Position of the entry to move.
    pub from: usize,
    /// Position it should end up at.
    pub to: usize,
}

/// Request body for POST /remove.
#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    /// Physical indices to remove.
    pub indices: Vec<usize>,
}

/// Response body returned after a queue command is handled.
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    /// Entries left in the queue.
    pub queue_len: usize,
    /// Physical index of the current entry.
    pub index: Option<usize>,
    /// Whether a shuffle permutation is active.
    pub shuffled: bool,
}

impl From<QueueCommandResult> for QueueResponse {
    fn from(result: QueueCommandResult) -> Self {
        Self {
            queue_len: result.state.len(),
            index: result.state.index,
            shuffled: result.state.is_shuffled(),
        }
    }
}

/// POST /move
#[instrument(skip(state, request), fields(guild_id = %guild_id))]
async fn move_item(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<QueueResponse>, ApiError> {
    let command = commands::MoveItem {
        correlation_id: Uuid::new_v4(),
        guild_id,
        from: request.from,
        to: request.to,
    };

    info!(correlation_id = %command.correlation_id, "handling move_item command");

    let result = command_handlers::handle_move_item(&command, state.store.as_ref()).await?;
    Ok(Json(result.into()))
}

/// POST /remove
#[instrument(skip(state, request), fields(guild_id = %guild_id))]
async fn remove_items(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
    Json(request): Json<RemoveRequest>,
) -> Result<Json<QueueResponse>, ApiError> {
    let command = commands::RemoveItems {
        correlation_id: Uuid::new_v4(),
        guild_id,
        indices: request.indices,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_items command");

    let result = command_handlers::handle_remove_items(&command, state.store.as_ref()).await?;
    Ok(Json(result.into()))
}

/// POST /shuffle
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn shuffle(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<QueueResponse>, ApiError> {
    let command = commands::ShuffleQueue {
        correlation_id: Uuid::new_v4(),
        guild_id,
    };

    info!(correlation_id = %command.correlation_id, "handling shuffle command");

    let result =
        command_handlers::handle_shuffle_queue(&command, &state.rng, state.store.as_ref()).await?;
    Ok(Json(result.into()))
}

/// POST /unshuffle
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn unshuffle(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<QueueResponse>, ApiError> {
    let command = commands::UnshuffleQueue {
        correlation_id: Uuid::new_v4(),
        guild_id,
    };

    info!(correlation_id = %command.correlation_id, "handling unshuffle command");

    let result =
        command_handlers::handle_unshuffle_queue(&command, state.store.as_ref()).await?;
    Ok(Json(result.into()))
}

/// POST /clear
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn clear(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<QueueResponse>, ApiError> {
    let command = commands::ClearQueue {
        correlation_id: Uuid::new_v4(),
        guild_id,
    };

    info!(correlation_id = %command.correlation_id, "handling clear command");

    let result = command_handlers::handle_clear_queue(&command, state.store.as_ref()).await?;
    Ok(Json(result.into()))
}

/// Returns the router for queue commands.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/move", post(move_item))
        .route("/remove", post(remove_items))
        .route("/shuffle", post(shuffle))
        .route("/unshuffle", post(unshuffle))
        .route("/clear", post(clear))
}
