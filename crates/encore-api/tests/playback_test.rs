//! Integration tests for playback commands.

mod common;

use axum::http::StatusCode;
use encore_core::ids::ChannelId;
use encore_core::store::QueueStore;
use encore_core::track::{LoadResult, LoadType};
use encore_resolver::domain::input::DEFAULT_SEARCH_PREFIX;
use encore_test_support::{ScriptedNode, StubCatalog, catalog_track, track};
use serde_json::json;

use common::{GUILD, guild_uri, invoker};

const URL_A: &str = "https://example.com/a.mp3";
const URL_B: &str = "https://example.com/b.mp3";

fn node_with_a_and_b() -> ScriptedNode {
    ScriptedNode::new()
        .with_track(URL_A, track("a"))
        .with_track(URL_B, track("b"))
}

#[tokio::test]
async fn test_play_connects_and_starts_the_first_track() {
    let app = common::build_test_app(node_with_a_and_b(), StubCatalog::new());

    let (status, json) = common::post_json(
        app.router(),
        &guild_uri("play"),
        &invoker(json!({ "query": URL_A })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"], "started");
    assert_eq!(json["index"], 0);
    assert_eq!(json["title"], "Title a");
    assert_eq!(app.chat.joins(), vec![(GUILD, ChannelId(20))]);
    assert!(app.state.sessions.is_connected(GUILD).unwrap());
}

#[tokio::test]
async fn test_play_while_playing_appends() {
    let app = common::build_test_app(node_with_a_and_b(), StubCatalog::new());
    common::post_json(app.router(), &guild_uri("play"), &invoker(json!({ "query": URL_A }))).await;

    let (status, json) = common::post_json(
        app.router(),
        &guild_uri("play"),
        &invoker(json!({ "query": URL_B })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"], "appended");
    assert_eq!(json["count"], 1);
    assert_eq!(json["position"], 1);
    assert_eq!(app.store.get_state(GUILD).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_play_without_voice_channel_returns_409() {
    let app = common::build_test_app(node_with_a_and_b(), StubCatalog::new());

    let (status, json) = common::post_json(
        app.router(),
        &guild_uri("play"),
        &json!({ "channel_id": 10, "user_id": 5, "query": URL_A }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "voice_error");
    assert!(app.chat.joins().is_empty());
}

#[tokio::test]
async fn test_play_with_choice_queues_the_chosen_result() {
    let node = ScriptedNode::new().with_track(
        &format!("{DEFAULT_SEARCH_PREFIX}never gonna"),
        track("x"),
    );
    node.script(
        "https://youtube.com/watch?v=x",
        LoadResult {
            load_type: LoadType::TrackLoaded,
            tracks: vec![track("x")],
        },
    );
    let app = common::build_test_app(node, StubCatalog::new());
    app.chat.set_choice(Some(0));

    let (status, json) = common::post_json(
        app.router(),
        &guild_uri("play"),
        &invoker(json!({ "query": "never gonna", "choose": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"], "started");
    assert_eq!(json["title"], "Title x");
    assert_eq!(app.chat.prompts(), vec![vec!["Title x - Author x".to_owned()]]);
}

#[tokio::test]
async fn test_unanswered_choice_does_not_connect() {
    let node = ScriptedNode::new().with_track(
        &format!("{DEFAULT_SEARCH_PREFIX}never gonna"),
        track("x"),
    );
    let app = common::build_test_app(node, StubCatalog::new());

    let (status, json) = common::post_json(
        app.router(),
        &guild_uri("play"),
        &invoker(json!({ "query": "never gonna", "choose": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"], "nothing_chosen");
    assert!(app.chat.joins().is_empty());
}

#[tokio::test]
async fn test_autoplay_queues_recommendations_for_the_seed_link() {
    let node = ScriptedNode::new().with_track(
        &format!("{DEFAULT_SEARCH_PREFIX}Song r1 Artist r1 audio"),
        track("r1"),
    );
    let catalog = StubCatalog::new().with_recommendations(vec![catalog_track("r1"), catalog_track("r2")]);
    let app = common::build_test_app(node, catalog);

    let (status, json) = common::post_json(
        app.router(),
        &guild_uri("autoplay"),
        &invoker(json!({ "seed": "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"], "started");
    assert_eq!(json["title"], "Title r1");
    assert_eq!(app.store.get_state(GUILD).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_autoplay_without_catalog_seed_returns_400() {
    let app = common::build_test_app(ScriptedNode::new(), StubCatalog::new());

    let (status, json) = common::post_json(app.router(), &guild_uri("autoplay"), &invoker(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_argument");
}

#[tokio::test]
async fn test_skip_past_last_track_ends_the_session() {
    let app = common::build_test_app(node_with_a_and_b(), StubCatalog::new());
    common::post_json(app.router(), &guild_uri("play"), &invoker(json!({ "query": URL_A }))).await;

    let (status, json) = common::post_empty(app.router(), &guild_uri("skip")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"], "exhausted");
    assert!(!app.state.sessions.is_connected(GUILD).unwrap());
    assert_eq!(app.chat.leaves(), vec![GUILD]);

    let (status, json) = common::get_json(app.router(), &guild_uri("now-playing")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "not_playing");
}

#[tokio::test]
async fn test_skip_without_session_returns_404() {
    let app = common::build_test_app(ScriptedNode::new(), StubCatalog::new());

    let (status, json) = common::post_empty(app.router(), &guild_uri("skip")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_connected");
}

#[tokio::test]
async fn test_jump_moves_to_position_and_rejects_out_of_bounds() {
    let app = common::build_test_app(node_with_a_and_b(), StubCatalog::new());
    common::post_json(app.router(), &guild_uri("play"), &invoker(json!({ "query": URL_A }))).await;
    common::post_json(app.router(), &guild_uri("play"), &invoker(json!({ "query": URL_B }))).await;

    let (status, json) =
        common::post_json(app.router(), &guild_uri("jump"), &json!({ "position": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_argument");

    let (status, json) =
        common::post_json(app.router(), &guild_uri("jump"), &json!({ "position": 1 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"], "started");
    assert_eq!(json["index"], 1);
    assert_eq!(json["title"], "Title b");
}

#[tokio::test]
async fn test_pause_twice_reports_no_change_the_second_time() {
    let app = common::build_test_app(node_with_a_and_b(), StubCatalog::new());
    common::post_json(app.router(), &guild_uri("play"), &invoker(json!({ "query": URL_A }))).await;

    let (_, first) = common::post_empty(app.router(), &guild_uri("pause")).await;
    let (_, second) = common::post_empty(app.router(), &guild_uri("pause")).await;
    let (status, resumed) = common::post_empty(app.router(), &guild_uri("unpause")).await;

    assert_eq!(first["changed"], true);
    assert_eq!(second["changed"], false);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumed["changed"], true);
}

#[tokio::test]
async fn test_volume_above_maximum_returns_400() {
    let app = common::build_test_app(node_with_a_and_b(), StubCatalog::new());
    common::post_json(app.router(), &guild_uri("play"), &invoker(json!({ "query": URL_A }))).await;

    let (status, _) =
        common::post_json(app.router(), &guild_uri("volume"), &json!({ "volume": 1001 })).await;
    let (ok_status, json) =
        common::post_json(app.router(), &guild_uri("volume"), &json!({ "volume": 50 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ok_status, StatusCode::OK);
    assert_eq!(json["volume"], 50);
}

#[tokio::test]
async fn test_loop_toggles_report_the_new_setting() {
    let app = common::build_test_app(node_with_a_and_b(), StubCatalog::new());
    common::post_json(app.router(), &guild_uri("play"), &invoker(json!({ "query": URL_A }))).await;

    let (_, repeat) = common::post_empty(app.router(), &guild_uri("loop")).await;
    let (_, loop_all) = common::post_empty(app.router(), &guild_uri("loop-all")).await;

    assert_eq!(repeat["enabled"], true);
    assert_eq!(loop_all["enabled"], true);
    assert!(app.store.get_state(GUILD).await.unwrap().loop_all);
}

#[tokio::test]
async fn test_queue_view_lists_entries_in_play_order() {
    let app = common::build_test_app(node_with_a_and_b(), StubCatalog::new());
    common::post_json(app.router(), &guild_uri("play"), &invoker(json!({ "query": URL_A }))).await;
    common::post_json(app.router(), &guild_uri("play"), &invoker(json!({ "query": URL_B }))).await;

    let (status, json) = common::get_json(app.router(), &guild_uri("queue")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "queue_listing");
    let lines = json["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["current"], true);
    assert_eq!(lines[1]["current"], false);
}
