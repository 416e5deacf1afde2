//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use encore_core::error::DomainError;
use encore_core::ids::{GuildId, UserId};
use encore_core::rng::DeterministicRng;
use encore_session::domain::watchdog::WatchdogConfig;
use encore_test_support::{
    FixedClock, FrontRng, InMemoryQueueStore, RecordingChat, ScriptedNode, StubCatalog,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use encore_api::routes;
use encore_api::state::{AppState, Collaborators};
use encore_api::voice::VoiceBridge;

/// The bot's user id in every test app.
pub const BOT: UserId = UserId(999);

/// The guild every test drives.
pub const GUILD: GuildId = GuildId(1);

/// Voice handshakes forwarded by the app, in order.
#[derive(Debug, Default)]
pub struct RecordingVoice {
    states: Mutex<Vec<(GuildId, Option<String>)>>,
    servers: Mutex<Vec<(GuildId, String, String)>>,
}

impl RecordingVoice {
    pub fn states(&self) -> Vec<(GuildId, Option<String>)> {
        self.states.lock().unwrap().clone()
    }

    pub fn servers(&self) -> Vec<(GuildId, String, String)> {
        self.servers.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceBridge for RecordingVoice {
    async fn voice_state(
        &self,
        guild_id: GuildId,
        session_id: Option<String>,
    ) -> Result<(), DomainError> {
        self.states.lock().unwrap().push((guild_id, session_id));
        Ok(())
    }

    async fn voice_server(
        &self,
        guild_id: GuildId,
        token: String,
        endpoint: String,
    ) -> Result<(), DomainError> {
        self.servers
            .lock()
            .unwrap()
            .push((guild_id, token, endpoint));
        Ok(())
    }
}

/// The fakes behind a test app, kept for assertions.
pub struct TestApp {
    pub store: Arc<InMemoryQueueStore>,
    pub node: Arc<ScriptedNode>,
    pub chat: Arc<RecordingChat>,
    pub voice: Arc<RecordingVoice>,
    pub state: AppState,
}

impl TestApp {
    /// A router over the shared state. Uses the same route structure as
    /// `main.rs`.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health::router())
            .nest(routes::GUILD_PREFIX, routes::guild_router())
            .with_state(self.state.clone())
    }
}

/// Build a test app over in-memory fakes.
pub fn build_test_app(node: ScriptedNode, catalog: StubCatalog) -> TestApp {
    build_test_app_with_store(node, catalog, InMemoryQueueStore::new())
}

/// Build a test app over in-memory fakes and a prepared store.
pub fn build_test_app_with_store(
    node: ScriptedNode,
    catalog: StubCatalog,
    store: InMemoryQueueStore,
) -> TestApp {
    let store = Arc::new(store);
    let node = Arc::new(node);
    let chat = Arc::new(RecordingChat::new());
    let voice = Arc::new(RecordingVoice::default());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(FrontRng));

    let state = AppState::new(
        Collaborators {
            store: store.clone(),
            node: node.clone(),
            catalog: Arc::new(catalog),
            chat: chat.clone(),
            voice: voice.clone(),
            clock: Arc::new(FixedClock::default()),
            rng,
        },
        WatchdogConfig::default(),
        BOT,
    );

    TestApp {
        store,
        node,
        chat,
        voice,
        state,
    }
}

/// The body of a command sent by user 5 from text channel 10 while in
/// voice channel 20.
pub fn invoker(extra: serde_json::Value) -> serde_json::Value {
    let mut body = serde_json::json!({
        "channel_id": 10,
        "user_id": 5,
        "message_id": 77,
        "voice_channel_id": 20
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }
    body
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// `/api/v1/guilds/1/<path>`.
pub fn guild_uri(path: &str) -> String {
    format!("/api/v1/guilds/{}/{path}", GUILD.get())
}
