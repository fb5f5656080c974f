use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use dino_duel::app::AppState;
use dino_duel::config::Config;
use dino_duel::game::{GameSession, PlayerId, SessionHost};
use dino_duel::http::build_router;
use dino_duel::relay::RelaySignal;
use dino_duel::util::time::SessionClock;

fn state_with(vars: &[(&str, &str)]) -> AppState {
    let vars: Vec<(String, String)> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    })
    .unwrap();
    AppState::new(config)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn jump_endpoints_broadcast_player_signals() {
    let state = state_with(&[]);
    let mut rx = state.relay.subscribe();
    let router = build_router(state);

    let (status, body) = get(&router, "/jump").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "player1 jump");

    let (status, body) = get(&router, "/jump2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "player2 jump");

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first, RelaySignal::Jump(PlayerId::One));
    assert_eq!(first.wire(), "jump1");
    assert_eq!(second.wire(), "jump2");
}

#[tokio::test]
async fn relay_flood_is_rejected_with_429() {
    let state = state_with(&[("RELAY_RATE_LIMIT", "1")]);
    let router = build_router(state);

    let (status, _) = get(&router, "/jump").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&router, "/jump").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("rate limit"));
}

#[tokio::test]
async fn health_reports_relay_and_session() {
    let state = state_with(&[]);
    let relay = state.relay.clone();

    let router = build_router(state.clone());
    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["listeners"], 0);
    assert!(json["oldest_listener_secs"].is_null());
    assert!(json["session"].is_null());

    let session = GameSession::new(state.config.game_settings()).unwrap();
    let (_host, handle) = SessionHost::new(session, SessionClock::new(), 60, 1);
    let router = build_router(state.with_host(handle));

    relay.publish(RelaySignal::Jump(PlayerId::Two)).unwrap();
    let (_, body) = get(&router, "/health").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["signals_relayed"], 1);
    assert_eq!(json["session"]["phase"]["state"], "running");
    assert_eq!(json["session"]["tick"], 0);
}

async fn upgrade(router: &Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .uri(uri)
        .header("connection", "upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-version", "13")
        .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn root_accepts_relay_upgrades_like_ws() {
    let router = build_router(state_with(&[]));

    let root = upgrade(&router, "/").await;
    let ws = upgrade(&router, "/ws").await;
    assert_ne!(root, StatusCode::NOT_FOUND);
    assert_eq!(root, ws);

    // A plain GET on the root is a failed upgrade, not a missing route
    let (status, _) = get(&router, "/").await;
    assert_ne!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let router = build_router(state_with(&[]));
    let (status, _) = get(&router, "/jump3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
