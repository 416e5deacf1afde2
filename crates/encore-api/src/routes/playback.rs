//! Routes for the Playback Controller: enqueueing, transport controls and
//! status views.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use encore_core::chat::{CorrelationToken, StatusMessage};
use encore_core::error::DomainError;
use encore_core::ids::{ChannelId, GuildId, MessageId, UserId};
use encore_playback::application::query_handlers;
use encore_playback::domain::outcomes::{EnqueueOutcome, PlayOutcome, ResumeOutcome, StateChange};
use encore_resolver::application::resolve;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Who sent a command and from where.
#[derive(Debug, Deserialize)]
pub struct Invoker {
    /// Text channel the command arrived in.
    pub channel_id: ChannelId,
    /// The user who sent it.
    pub user_id: UserId,
    /// The command message, for threaded replies.
    pub message_id: Option<MessageId>,
    /// The voice channel the user is in, if any.
    pub voice_channel_id: Option<ChannelId>,
}

impl Invoker {
    fn correlation(&self) -> CorrelationToken {
        CorrelationToken {
            channel_id: self.channel_id,
            last_command_message_id: self.message_id,
        }
    }

    fn voice_channel(&self) -> Result<ChannelId, DomainError> {
        self.voice_channel_id
            .ok_or_else(|| DomainError::Voice("join a voice channel first".to_owned()))
    }
}

/// Request body for POST /play.
#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    /// Who is asking.
    #[serde(flatten)]
    pub invoker: Invoker,
    /// URL, catalog link or search text. Absent means resume.
    pub query: Option<String>,
    /// Offer a choice between search results for free text.
    #[serde(default)]
    pub choose: bool,
}

/// Request body for POST /autoplay.
#[derive(Debug, Deserialize)]
pub struct AutoplayRequest {
    /// Who is asking.
    #[serde(flatten)]
    pub invoker: Invoker,
    /// Catalog track link to seed from. Defaults to the current track.
    pub seed: Option<String>,
    /// The user's own catalog authorization, for personal seeds.
    pub user_auth: Option<String>,
}

/// Request body for POST /jump.
#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    /// Logical position to jump to.
    pub position: usize,
}

/// Request body for POST /volume.
#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    /// New volume, 0 to 1000.
    pub volume: u16,
}

/// What a play-like command did.
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PlayResponse {
    /// A track was handed to the node.
    Started {
        /// Physical index now current.
        index: usize,
        /// Title of the started track.
        title: String,
    },
    /// Items were appended behind the current track.
    Appended {
        /// Number of items appended.
        count: usize,
        /// Logical position of the first one.
        position: usize,
    },
    /// The interrupted track was replayed.
    Resumed {
        /// Persisted index, unchanged.
        index: Option<usize>,
        /// Title of the replayed track.
        title: String,
    },
    /// Nothing was playable; the session ended.
    Exhausted,
    /// Already playing, or nothing was interrupted.
    NothingToResume,
    /// The prompt found no results or got no answer.
    NothingChosen,
}

impl From<PlayOutcome> for PlayResponse {
    fn from(outcome: PlayOutcome) -> Self {
        match outcome {
            PlayOutcome::Started { index, track } => Self::Started {
                index,
                title: track.info.title,
            },
            PlayOutcome::Exhausted => Self::Exhausted,
        }
    }
}

impl From<EnqueueOutcome> for PlayResponse {
    fn from(outcome: EnqueueOutcome) -> Self {
        match outcome {
            EnqueueOutcome::Started(outcome) => outcome.into(),
            EnqueueOutcome::Appended { count, position } => Self::Appended { count, position },
        }
    }
}

impl From<ResumeOutcome> for PlayResponse {
    fn from(outcome: ResumeOutcome) -> Self {
        match outcome {
            ResumeOutcome::Resumed { index, track } => Self::Resumed {
                index,
                title: track.info.title,
            },
            ResumeOutcome::Continued(outcome) => outcome.into(),
            ResumeOutcome::NothingToResume => Self::NothingToResume,
        }
    }
}

/// Response body for pause and unpause.
#[derive(Debug, Serialize)]
pub struct StateChangeResponse {
    /// Whether the player changed state.
    pub changed: bool,
}

impl From<StateChange> for StateChangeResponse {
    fn from(change: StateChange) -> Self {
        Self {
            changed: change == StateChange::Applied,
        }
    }
}

/// Response body for the repeat toggles.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// The setting after the toggle.
    pub enabled: bool,
}

/// Response body for POST /volume.
#[derive(Debug, Serialize)]
pub struct VolumeResponse {
    /// The volume now set.
    pub volume: u16,
}

/// POST /play
#[instrument(skip(state, request), fields(guild_id = %guild_id, user_id = %request.invoker.user_id))]
async fn play(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
    Json(request): Json<PlayRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
    let voice_channel_id = request.invoker.voice_channel()?;
    let correlation = request.invoker.correlation();
    let requester = request.invoker.user_id;
    let correlation_id = Uuid::new_v4();

    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        info!(%correlation_id, "handling resume command");
        let outcome = state
            .sessions
            .resume_interrupted(guild_id, voice_channel_id, correlation, requester)
            .await?;
        return Ok(Json(outcome.into()));
    };

    info!(%correlation_id, choose = request.choose, "handling play command");
    let items = if request.choose {
        resolve::disambiguate(
            &query,
            requester,
            request.invoker.channel_id,
            state.node.as_ref(),
            state.catalog.as_ref(),
            state.chat.as_ref(),
        )
        .await?
    } else {
        resolve::parse(&query, requester, state.catalog.as_ref()).await?
    };
    if items.is_empty() {
        return Ok(Json(PlayResponse::NothingChosen));
    }

    let outcome = state
        .sessions
        .play(guild_id, voice_channel_id, correlation, items)
        .await?;
    Ok(Json(outcome.into()))
}

/// POST /autoplay
#[instrument(skip(state, request), fields(guild_id = %guild_id, user_id = %request.invoker.user_id))]
async fn autoplay(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
    Json(request): Json<AutoplayRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
    let voice_channel_id = request.invoker.voice_channel()?;
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, "handling autoplay command");

    let current = state.store.get_state(guild_id).await?;
    let seed = resolve::recommendation_seed(request.seed.as_deref(), current.current_item())?;
    let items = resolve::expand_recommendations(
        &seed,
        request.invoker.user_id,
        request.user_auth.as_deref(),
        state.catalog.as_ref(),
    )
    .await?;

    let outcome = state
        .sessions
        .play(
            guild_id,
            voice_channel_id,
            request.invoker.correlation(),
            items,
        )
        .await?;
    Ok(Json(outcome.into()))
}

/// POST /skip
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn skip(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<PlayResponse>, ApiError> {
    info!(correlation_id = %Uuid::new_v4(), "handling skip command");
    let outcome = state.sessions.skip(guild_id).await?;
    Ok(Json(outcome.into()))
}

/// POST /jump
#[instrument(skip(state, request), fields(guild_id = %guild_id, position = request.position))]
async fn jump(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
    Json(request): Json<JumpRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
    info!(correlation_id = %Uuid::new_v4(), "handling jump command");
    let outcome = state.sessions.jump(guild_id, request.position).await?;
    Ok(Json(outcome.into()))
}

/// POST /pause
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn pause(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<StateChangeResponse>, ApiError> {
    let change = state.controller().pause(guild_id).await?;
    Ok(Json(change.into()))
}

/// POST /unpause
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn unpause(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<StateChangeResponse>, ApiError> {
    let change = state.controller().resume(guild_id).await?;
    Ok(Json(change.into()))
}

/// POST /volume
#[instrument(skip(state, request), fields(guild_id = %guild_id, volume = request.volume))]
async fn volume(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
    Json(request): Json<VolumeRequest>,
) -> Result<Json<VolumeResponse>, ApiError> {
    state
        .controller()
        .set_volume(guild_id, request.volume)
        .await?;
    Ok(Json(VolumeResponse {
        volume: request.volume,
    }))
}

/// POST /loop
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn toggle_loop(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let enabled = state.controller().toggle_track_repeat(guild_id).await?;
    Ok(Json(ToggleResponse { enabled }))
}

/// POST /loop-all
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn toggle_loop_all(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let enabled = state.controller().toggle_loop_all(guild_id).await?;
    Ok(Json(ToggleResponse { enabled }))
}

/// GET /now-playing
async fn now_playing(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<StatusMessage>, ApiError> {
    let view =
        query_handlers::now_playing_view(guild_id, state.store.as_ref(), state.node.as_ref())
            .await?;
    Ok(Json(view))
}

/// POST /now-playing: re-renders it in the guild's text channel.
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn post_now_playing(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<StatusMessage>, ApiError> {
    Ok(Json(state.controller().post_now_playing(guild_id).await?))
}

/// GET /queue
async fn queue(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<StatusMessage>, ApiError> {
    Ok(Json(
        query_handlers::queue_view(guild_id, state.store.as_ref()).await?,
    ))
}

/// POST /queue: re-renders the listing in the guild's text channel.
#[instrument(skip(state), fields(guild_id = %guild_id))]
async fn post_queue(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<StatusMessage>, ApiError> {
    Ok(Json(state.controller().post_queue(guild_id).await?))
}

/// Returns the router for playback commands.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/play", post(play))
        .route("/autoplay", post(autoplay))
        .route("/skip", post(skip))
        .route("/jump", post(jump))
        .route("/pause", post(pause))
        .route("/unpause", post(unpause))
        .route("/volume", post(volume))
        .route("/loop", post(toggle_loop))
        .route("/loop-all", post(toggle_loop_all))
        .route("/now-playing", get(now_playing).post(post_now_playing))
        .route("/queue", get(queue).post(post_queue))
}
