//! Stateless fan-out of relay signals to every connected listener

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::util::rate_limit::{create_limiter, Limiter};
use crate::util::time::unix_millis;

use super::RelaySignal;

/// A connected relay listener
#[derive(Debug, Clone)]
pub struct ListenerInfo {
    pub connected_at: u64,
}

/// Broadcasts every published signal to every subscriber.
///
/// Holds no game state; the session host is just another subscriber.
#[derive(Clone)]
pub struct RelayHub {
    tx: broadcast::Sender<RelaySignal>,
    listeners: Arc<DashMap<Uuid, ListenerInfo>>,
    limiter: Arc<Limiter>,
    relayed: Arc<AtomicU64>,
}

impl RelayHub {
    pub fn new(capacity: usize, signals_per_second: u32) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            listeners: Arc::new(DashMap::new()),
            limiter: create_limiter(signals_per_second),
            relayed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fan a signal out; returns how many subscribers received it
    pub fn publish(&self, signal: RelaySignal) -> Result<usize, RelayError> {
        if self.limiter.check().is_err() {
            warn!(signal = %signal, "Relay rate limit hit, dropping signal");
            return Err(RelayError::RateLimited);
        }

        self.relayed.fetch_add(1, Ordering::Relaxed);
        // No subscribers is not an error, the signal is simply dropped
        let delivered = self.tx.send(signal).unwrap_or(0);
        debug!(signal = %signal, delivered, "Relayed signal");
        Ok(delivered)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelaySignal> {
        self.tx.subscribe()
    }

    pub fn register_listener(&self, id: Uuid) {
        self.listeners.insert(
            id,
            ListenerInfo {
                connected_at: unix_millis(),
            },
        );
        info!(listener_id = %id, listeners = self.listeners.len(), "Relay listener connected");
    }

    pub fn unregister_listener(&self, id: Uuid) {
        if self.listeners.remove(&id).is_some() {
            info!(listener_id = %id, listeners = self.listeners.len(), "Relay listener disconnected");
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// How long the longest-connected listener has been attached
    pub fn oldest_listener_age_ms(&self) -> Option<u64> {
        self.oldest_listener_age_at(unix_millis())
    }

    fn oldest_listener_age_at(&self, now_ms: u64) -> Option<u64> {
        self.listeners
            .iter()
            .map(|entry| entry.connected_at)
            .min()
            .map(|connected_at| now_ms.saturating_sub(connected_at))
    }

    pub fn signals_relayed(&self) -> u64 {
        self.relayed.load(Ordering::Relaxed)
    }
}

/// Relay errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("Relay rate limit exceeded")]
    RateLimited,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PlayerId;

    #[tokio::test]
    async fn test_every_subscriber_gets_every_signal() {
        let hub = RelayHub::new(16, 100);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        let delivered = tokio_test::assert_ok!(hub.publish(RelaySignal::Jump(PlayerId::One)));
        assert_eq!(delivered, 2);
        tokio_test::assert_ok!(hub.publish(RelaySignal::Jump(PlayerId::Two)));

        for rx in [&mut a, &mut b] {
            assert_eq!(rx.recv().await.unwrap(), RelaySignal::Jump(PlayerId::One));
            assert_eq!(rx.recv().await.unwrap(), RelaySignal::Jump(PlayerId::Two));
        }
        assert_eq!(hub.signals_relayed(), 2);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = RelayHub::new(16, 100);
        assert_eq!(hub.publish(RelaySignal::Jump(PlayerId::Two)), Ok(0));
    }

    #[test]
    fn test_rate_limit_rejects_flood() {
        let hub = RelayHub::new(16, 2);
        let results: Vec<_> = (0..5)
            .map(|_| hub.publish(RelaySignal::Jump(PlayerId::One)))
            .collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
        assert!(results.contains(&Err(RelayError::RateLimited)));
        assert_eq!(hub.signals_relayed(), 2);
    }

    #[test]
    fn test_listener_registry() {
        let hub = RelayHub::new(16, 100);
        let id = Uuid::new_v4();
        hub.register_listener(id);
        assert_eq!(hub.listener_count(), 1);
        hub.unregister_listener(id);
        hub.unregister_listener(id);
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(hub.oldest_listener_age_ms(), None);
    }

    #[test]
    fn test_oldest_listener_age() {
        let hub = RelayHub::new(16, 100);
        let early = Uuid::new_v4();
        let late = Uuid::new_v4();
        hub.listeners.insert(early, ListenerInfo { connected_at: 1_000 });
        hub.listeners.insert(late, ListenerInfo { connected_at: 4_000 });

        assert_eq!(hub.oldest_listener_age_at(5_500), Some(4_500));
        hub.unregister_listener(early);
        assert_eq!(hub.oldest_listener_age_at(5_500), Some(1_500));
        // Clock skew never yields a negative age
        assert_eq!(hub.oldest_listener_age_at(3_000), Some(0));
    }
}
