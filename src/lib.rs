//! Dino Duel - two-player endless runner with a jump-signal relay
//!
//! The library holds the game simulation (`game`), the relay that carries
//! jump presses from trigger devices (`relay`), and the HTTP/WebSocket
//! surface that exposes both (`http`, `ws`).

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod relay;
pub mod util;
pub mod ws;

/// Crate version reported at startup
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
