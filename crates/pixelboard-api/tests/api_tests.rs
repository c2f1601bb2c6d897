//! Integration tests for the Pixelboard API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, except for the startup checks at the end.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use pixelboard_api::{build_router, spawn_server, AppState, ServerConfig};
use pixelboard_core::{Clock, ManualClock, PixelboardConfig};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::{self, Message};
use tower::ServiceExt;

fn test_config() -> PixelboardConfig {
    let mut config = PixelboardConfig::default();
    config.canvas.grid_size = 4;
    config.cooldown.window_ms = 5000;
    config
}

fn make_state() -> (Arc<AppState>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at_millis(1_000_000));
    let state =
        AppState::from_config_with_clock(&test_config(), Arc::clone(&clock) as Arc<dyn Clock>)
            .unwrap();
    (Arc::new(state), clock)
}

fn app() -> (Router, Arc<AppState>, Arc<ManualClock>) {
    let (state, clock) = make_state();
    (build_router(Arc::clone(&state)), state, clock)
}

fn post(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/canvas")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn get_canvas_returns_default_grid() {
    let (app, _state, _clock) = app();
    let response = app.oneshot(get("/api/canvas")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["size"], 4);
    assert_eq!(json["sequence"], 0);
    let rows = json["canvas"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows
        .iter()
        .flat_map(|row| row.as_array().unwrap())
        .all(|cell| cell == "#FFFFFF"));
}

#[tokio::test]
async fn valid_write_is_applied_and_echoed() {
    let (app, _state, _clock) = app();
    let response = app
        .clone()
        .oneshot(post(&json!({"actorId": "alice", "x": 1, "y": 2, "color": "#ff0000"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["cell"], json!({"x": 1, "y": 2, "color": "#FF0000"}));
    assert_eq!(json["sequence"], 1);

    let canvas = json_body(app.oneshot(get("/api/canvas")).await.unwrap()).await;
    assert_eq!(canvas["canvas"][2][1], "#FF0000");
    assert_eq!(canvas["sequence"], 1);
}

#[tokio::test]
async fn user_id_alias_is_accepted() {
    let (app, _state, _clock) = app();
    let response = app
        .oneshot(post(&json!({"userId": "bob", "x": 0, "y": 0, "color": "#000000"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_writes_are_rejected_with_a_cause() {
    let cases = [
        (json!({"x": 0, "y": 0, "color": "#000000"}), "actor"),
        (json!({"actorId": "  ", "x": 0, "y": 0, "color": "#000000"}), "actor"),
        (json!({"actorId": "a", "x": 4, "y": 0, "color": "#000000"}), "coordinate"),
        (json!({"actorId": "a", "x": -1, "y": 0, "color": "#000000"}), "coordinate"),
        (json!({"actorId": "a", "x": 0, "y": 0, "color": "red"}), "color"),
        (json!({"actorId": "a", "x": 0, "y": 0, "color": "#GGGGGG"}), "color"),
        (json!({"actorId": "a", "y": 0, "color": "#000000"}), "body"),
        (json!({"actorId": "a", "x": 1.5, "y": 0, "color": "#000000"}), "body"),
    ];

    let (app, state, _clock) = app();
    for (body, cause) in cases {
        let response = app.clone().oneshot(post(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let json = json_body(response).await;
        assert_eq!(json["error"], "InvalidRequest", "{body}");
        assert_eq!(json["cause"], cause, "{body}");
        assert_eq!(json["status"], 400);
    }

    // Rejected writes never start a cooldown or touch the grid.
    let status = state.gateway.status().await;
    assert_eq!(status.tracked_actors, 0);
    assert_eq!(status.last_sequence, 0);
}

#[tokio::test]
async fn second_write_within_window_is_throttled() {
    let (app, _state, clock) = app();
    let first = app
        .clone()
        .oneshot(post(&json!({"actorId": "carol", "x": 0, "y": 0, "color": "#111111"})))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    clock.advance(Duration::from_millis(1200));
    let second = app
        .clone()
        .oneshot(post(&json!({"actorId": "carol", "x": 1, "y": 1, "color": "#222222"})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.headers()[header::RETRY_AFTER], "4");
    let json = json_body(second).await;
    assert_eq!(json["error"], "CooldownActive");
    assert_eq!(json["remainingMs"], 3800);

    clock.advance(Duration::from_millis(3800));
    let third = app
        .oneshot(post(&json!({"actorId": "carol", "x": 1, "y": 1, "color": "#222222"})))
        .await
        .unwrap();
    assert_eq!(third.status(), StatusCode::OK);
    assert_eq!(json_body(third).await["sequence"], 2);
}

#[tokio::test]
async fn status_reports_counters() {
    let (app, _state, _clock) = app();
    app.clone()
        .oneshot(post(&json!({"actorId": "dave", "x": 3, "y": 3, "color": "#333333"})))
        .await
        .unwrap();

    let json = json_body(app.oneshot(get("/api/status")).await.unwrap()).await;
    assert_eq!(json["grid_size"], 4);
    assert_eq!(json["cooldown_window_ms"], 5000);
    assert_eq!(json["tracked_actors"], 1);
    assert_eq!(json["last_sequence"], 1);
    assert_eq!(json["subscribers"], 0);
}

#[tokio::test]
async fn event_stream_opens_with_canvas_state() {
    let (app, state, _clock) = app();
    state
        .gateway
        .submit(&pixelboard_core::MutationRequest::new("erin", 2, 1, "#0000FF"))
        .await
        .unwrap();

    let response = app.oneshot(get("/api/events")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(state.gateway.registry().len(), 1);

    let mut frames = response.into_body().into_data_stream();
    let first = tokio::time::timeout(Duration::from_secs(2), frames.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8(first.to_vec()).unwrap();
    let payload = text
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let event: Value = serde_json::from_str(payload).unwrap();
    assert_eq!(event["type"], "canvas-state");
    assert_eq!(event["sequence"], 1);
    assert_eq!(event["data"][1][2], "#0000FF");

    // Closing the stream removes the subscriber.
    drop(frames);
    assert!(state.gateway.registry().is_empty());
}

#[tokio::test]
async fn event_stream_carries_later_writes() {
    let (app, state, _clock) = app();
    let response = app.oneshot(get("/api/events")).await.unwrap();
    let mut frames = response.into_body().into_data_stream();

    state
        .gateway
        .submit(&pixelboard_core::MutationRequest::new("frank", 0, 3, "#ABCDEF"))
        .await
        .unwrap();

    let mut payloads = Vec::new();
    while payloads.len() < 2 {
        let frame = tokio::time::timeout(Duration::from_secs(2), frames.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = String::from_utf8(frame.to_vec()).unwrap();
        payloads.extend(
            text.lines()
                .filter_map(|line| line.strip_prefix("data: "))
                .map(|p| serde_json::from_str::<Value>(p).unwrap()),
        );
    }
    assert_eq!(payloads[0]["type"], "canvas-state");
    assert_eq!(
        payloads[1],
        json!({"type": "pixel-update", "x": 0, "y": 3, "color": "#ABCDEF", "sequence": 1})
    );
}

async fn next_ws_json<S>(socket: &mut S) -> Value
where
    S: futures::Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), socket.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn websocket_stream_opens_with_canvas_state_then_updates() {
    let (state, _clock) = make_state();
    let mut config = test_config();
    config.server.host = String::from("127.0.0.1");
    config.server.port = 0;
    let running = spawn_server(&ServerConfig::from(&config.server), Arc::clone(&state))
        .await
        .unwrap();

    let url = format!("ws://{}/ws/canvas", running.addr);
    let (mut socket, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .unwrap();

    let baseline = next_ws_json(&mut socket).await;
    assert_eq!(baseline["type"], "canvas-state");
    assert_eq!(baseline["size"], 4);
    assert_eq!(baseline["sequence"], 0);
    assert_eq!(state.gateway.registry().len(), 1);

    state
        .gateway
        .submit(&pixelboard_core::MutationRequest::new("gina", 3, 0, "#00ff00"))
        .await
        .unwrap();
    let update = next_ws_json(&mut socket).await;
    assert_eq!(
        update,
        json!({"type": "pixel-update", "x": 3, "y": 0, "color": "#00FF00", "sequence": 1})
    );

    // A client close removes the subscriber.
    socket.close(None).await.unwrap();
    for _ in 0..100 {
        if state.gateway.registry().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(state.gateway.registry().is_empty());
    running.handle.abort();
}

#[tokio::test]
async fn spawn_server_binds_an_ephemeral_port() {
    let (state, _clock) = make_state();
    let config = ServerConfig {
        host: String::from("127.0.0.1"),
        port: 0,
    };
    let running = spawn_server(&config, state).await.unwrap();
    assert_ne!(running.addr.port(), 0);
    running.handle.abort();
}

#[tokio::test]
async fn spawn_server_rejects_a_bad_host() {
    let (state, _clock) = make_state();
    let config = ServerConfig {
        host: String::from("not an address"),
        port: 3000,
    };
    assert!(spawn_server(&config, state).await.is_err());
}
