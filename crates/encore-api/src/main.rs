//! Encore API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use encore_api::chat::HttpChatGateway;
use encore_api::config::AppConfig;
use encore_api::error::AppError;
use encore_api::events::dispatch_node_events;
use encore_api::routes;
use encore_api::state::{AppState, Collaborators};
use encore_catalog::SpotifyCatalog;
use encore_core::clock::SystemClock;
use encore_core::rng::{DeterministicRng, SystemRng};
use encore_lavalink::{LavalinkConfig, LavalinkNode};
use encore_session::domain::watchdog::WatchdogConfig;
use encore_store::pg_queue_store::PgQueueStore;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const NODE_EVENT_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Encore API server");

    let config = AppConfig::from_env()?;

    // Create database connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(AppError::from)?;
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(AppError::from)?;

    let node = Arc::new(
        LavalinkNode::new(LavalinkConfig {
            url: config.lavalink_url.clone(),
            password: config.lavalink_password.clone(),
            user_id: config.bot_user_id,
            client_name: format!("Encore/{}", env!("CARGO_PKG_VERSION")),
        })
        .map_err(AppError::from)?,
    );
    let catalog = SpotifyCatalog::new(config.catalog_token.clone()).map_err(AppError::from)?;
    if config.catalog_token.is_none() {
        tracing::warn!("CATALOG_TOKEN not set; catalog links will be rejected");
    }
    let chat = HttpChatGateway::new(config.chat_gateway_url.clone())?;
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng));

    // Build application state.
    let app_state = AppState::new(
        Collaborators {
            store: Arc::new(PgQueueStore::new(pool)),
            node: node.clone(),
            catalog: Arc::new(catalog),
            chat: Arc::new(chat),
            voice: node.clone(),
            clock: Arc::new(SystemClock),
            rng,
        },
        WatchdogConfig {
            poll_interval: config.watchdog_poll,
            inactivity: config.inactivity,
        },
        config.bot_user_id,
    );

    // Node events flow through one channel into one dispatcher task.
    let shutdown = CancellationToken::new();
    let (events_tx, events_rx) = mpsc::channel(NODE_EVENT_BUFFER);
    let node_task = tokio::spawn(node.run_events(events_tx, shutdown.clone()));
    let dispatch_task = tokio::spawn(dispatch_node_events(app_state.sessions.clone(), events_rx));

    // Build router.
    // TODO: Replace CorsLayer::permissive() with the chat front-end's origin once it is fixed.
    let app = Router::new()
        .merge(routes::health::router())
        .nest(routes::GUILD_PREFIX, routes::guild_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::from)?;

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for shutdown signal");
            }
            signal.cancel();
        })
        .await
        .map_err(AppError::from)?;

    shutdown.cancel();
    if let Err(e) = node_task.await {
        tracing::warn!(error = %e, "node event task panicked");
    }
    if let Err(e) = dispatch_task.await {
        tracing::warn!(error = %e, "dispatch task panicked");
    }
    tracing::info!("Encore API server stopped");

    Ok(())
}
