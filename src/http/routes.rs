//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::app::AppState;
use crate::game::{HostStatus, PlayerId};
use crate::relay::{RelayError, RelaySignal};
use crate::util::time::uptime_secs;
use crate::ws::handler::{frames_ws_handler, relay_ws_handler};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.client_origins.is_empty() {
        // Trigger devices and local viewers are not served from a known origin
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed_origins: Vec<header::HeaderValue> = state
            .config
            .client_origins
            .iter()
            .filter_map(|s| s.parse::<header::HeaderValue>().ok())
            .collect();
        CorsLayer::new().allow_origin(allowed_origins)
    }
    .allow_methods([Method::GET, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Trigger clients connect to the bare host, so the root also upgrades
        .route("/", get(relay_ws_handler))
        .route("/health", get(health_handler))
        .route("/jump", get(jump_one_handler))
        .route("/jump2", get(jump_two_handler))
        .route("/ws", get(relay_ws_handler))
        .route("/ws/frames", get(frames_ws_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    listeners: usize,
    oldest_listener_secs: Option<u64>,
    signals_relayed: u64,
    session: Option<HostStatus>,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        listeners: state.relay.listener_count(),
        oldest_listener_secs: state.relay.oldest_listener_age_ms().map(|ms| ms / 1_000),
        signals_relayed: state.relay.signals_relayed(),
        session: state.host.as_ref().map(|h| h.status()),
    })
}

// ============================================================================
// Relay endpoints
// ============================================================================

async fn jump_one_handler(State(state): State<AppState>) -> Result<&'static str, AppError> {
    relay_jump(&state, PlayerId::One)
}

async fn jump_two_handler(State(state): State<AppState>) -> Result<&'static str, AppError> {
    relay_jump(&state, PlayerId::Two)
}

fn relay_jump(state: &AppState, player: PlayerId) -> Result<&'static str, AppError> {
    let delivered = state.relay.publish(RelaySignal::Jump(player))?;
    info!(player = %player, delivered, "Jump relayed");

    Ok(match player {
        PlayerId::One => "player1 jump",
        PlayerId::Two => "player2 jump",
    })
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Relay(RelayError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}
