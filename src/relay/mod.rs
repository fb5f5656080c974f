//! Jump-signal relay: fan-out hub and the bridge into a game session

pub mod bridge;
pub mod hub;
pub mod signal;

pub use bridge::SignalBridge;
pub use hub::{RelayError, RelayHub};
pub use signal::RelaySignal;
