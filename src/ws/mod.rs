//! WebSocket transport: relay listeners and frame viewers

pub mod handler;
pub mod protocol;
