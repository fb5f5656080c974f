//! Bridge from relay signals to a session's jump buttons

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::game::player::JumpLatch;
use crate::game::PlayerId;
use crate::util::time::SessionClock;

use super::RelaySignal;

/// Presses a session's jump latches on behalf of external trigger devices.
///
/// Obtained from `GameSession::signal_bridge`. Safe to call from any task
/// while the game loop runs: each signal is one atomic store.
#[derive(Clone)]
pub struct SignalBridge {
    latches: [Arc<JumpLatch>; 2],
    clock: SessionClock,
}

impl SignalBridge {
    pub fn new(latches: [Arc<JumpLatch>; 2], clock: SessionClock) -> Self {
        Self { latches, clock }
    }

    /// Route a jump signal to `player`, stamped with the session clock
    pub fn on_external_signal(&self, player: PlayerId) {
        self.on_external_signal_at(player, self.clock.now_ms());
    }

    pub fn on_external_signal_at(&self, player: PlayerId, now_ms: f64) {
        self.latches[player.index()].press(now_ms);
    }

    pub fn deliver(&self, signal: RelaySignal) {
        match signal {
            RelaySignal::Jump(player) => self.on_external_signal(player),
        }
    }

    /// Deliver raw wire text; returns false (and does nothing) if unrecognized
    pub fn on_wire_message(&self, text: &str) -> bool {
        match RelaySignal::parse(text) {
            Some(signal) => {
                self.deliver(signal);
                true
            }
            None => {
                debug!(len = text.len(), "Ignoring unrecognized relay message");
                false
            }
        }
    }

    /// Forward relay signals until the hub closes
    pub async fn run(self, mut rx: broadcast::Receiver<RelaySignal>) {
        info!("Signal bridge attached to relay");
        loop {
            match rx.recv().await {
                Ok(signal) => self.deliver(signal),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Skipped presses are stale by now, keep going
                    warn!(lagged_count = n, "Signal bridge lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Relay closed, signal bridge stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayHub;

    fn bridge_with_window(window_ms: f64) -> SignalBridge {
        SignalBridge::new(
            [
                Arc::new(JumpLatch::new(window_ms)),
                Arc::new(JumpLatch::new(window_ms)),
            ],
            SessionClock::new(),
        )
    }

    fn bridge() -> SignalBridge {
        bridge_with_window(100.0)
    }

    #[test]
    fn test_signal_routes_to_one_player() {
        let b = bridge();
        b.on_external_signal_at(PlayerId::Two, 50.0);
        assert!(!b.latches[0].is_pressed(60.0));
        assert!(b.latches[1].is_pressed(60.0));
        assert!(!b.latches[1].is_pressed(150.0));
    }

    #[test]
    fn test_unknown_wire_text_is_noop() {
        let b = bridge();
        assert!(!b.on_wire_message("hello"));
        assert!(!b.on_wire_message(""));
        let now = b.clock.now_ms();
        assert!(!b.latches[0].is_pressed(now));
        assert!(!b.latches[1].is_pressed(now));
    }

    #[test]
    fn test_wire_text_presses_latch() {
        let b = bridge_with_window(60_000.0);
        assert!(b.on_wire_message("jump1"));
        assert!(b.latches[0].is_pressed(b.clock.now_ms()));
    }

    #[tokio::test]
    async fn test_run_stops_when_hub_dropped() {
        let b = bridge_with_window(60_000.0);
        let latches = b.latches.clone();
        let clock = b.clock;
        let hub = RelayHub::new(8, 100);
        let rx = hub.subscribe();

        hub.publish(RelaySignal::Jump(PlayerId::Two)).unwrap();
        drop(hub);
        b.run(rx).await;

        assert!(latches[1].is_pressed(clock.now_ms()));
    }
}
