//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::HostHandle;
use crate::relay::RelayHub;

/// Buffered relay signals per subscriber
const RELAY_CHANNEL_CAPACITY: usize = 64;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: RelayHub,
    /// Present when this process hosts a game session
    pub host: Option<HostHandle>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let relay = RelayHub::new(RELAY_CHANNEL_CAPACITY, config.relay_rate_limit);

        Self {
            config: Arc::new(config),
            relay,
            host: None,
        }
    }

    pub fn with_host(mut self, host: HostHandle) -> Self {
        self.host = Some(host);
        self
    }
}
