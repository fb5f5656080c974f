//! Dino Duel Server - jump relay and headless session host
//!
//! This is the main entry point for the server. It handles:
//! - HTTP trigger endpoints that relay jump presses
//! - WebSocket fan-out of those presses to every listener
//! - An optional in-process game session streamed to viewers

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dino_duel::app::AppState;
use dino_duel::config::Config;
use dino_duel::game::{GameSession, SessionHost};
use dino_duel::http::build_router;
use dino_duel::util::time::{init_server_time, SessionClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Initialize server time tracking
    init_server_time();

    info!(version = dino_duel::VERSION, "Starting Dino Duel Server");
    info!("Server address: {}", config.server_addr);

    // Create application state
    let mut state = AppState::new(config.clone());

    if config.host_session {
        // Bad tunables stop the process before it binds
        let session = GameSession::new(config.game_settings())?;
        let clock = SessionClock::new();

        // Relay presses reach the session through its latches, not the host task
        let bridge = session.signal_bridge(clock);
        let signal_rx = state.relay.subscribe();
        tokio::spawn(async move {
            bridge.run(signal_rx).await;
        });

        let (host, handle) = SessionHost::new(session, clock, config.frame_rate, 1);
        tokio::spawn(async move {
            host.run().await;
        });

        state = state.with_host(handle);
    }

    // Build router
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("Relay endpoint: ws://{}/ws", addr);
    if config.host_session {
        info!("Viewer endpoint: ws://{}/ws/frames", addr);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
