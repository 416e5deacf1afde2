//! Route modules, one per command family.

pub mod health;
pub mod playback;
pub mod queue;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Path every guild-scoped router is nested under.
pub const GUILD_PREFIX: &str = "/api/v1/guilds/{guild_id}";

/// Every guild-scoped route. Handlers read `{guild_id}` from the prefix.
pub fn guild_router() -> Router<AppState> {
    Router::new()
        .merge(playback::router())
        .merge(queue::router())
        .merge(session::router())
}
