//! Liveness and store readiness.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use encore_core::ids::GuildId;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Guild id no real guild uses; reading it round-trips the store.
const PROBE_GUILD: GuildId = GuildId(0);

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the store is unreachable.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether the queue store answered.
    pub store_reachable: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_reachable = match state.store.get_state(PROBE_GUILD).await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "queue store unreachable");
            false
        }
    };
    let (status, code) = if store_reachable {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };
    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store_reachable,
        }),
    )
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
