//! Channels between event producers and the simulation loop.
//!
//! Keyboard and media events are posted from any thread through an
//! [`EventSender`] and drained by the loop at the start of each tick.
//! Snapshots flow the other way on a short bounded channel so a slow
//! consumer never holds the loop back.

use crate::input::events::EngineEvent;
use crate::state::snapshot::SessionSnapshot;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// Queued events before producers start dropping.
const EVENT_CAPACITY: usize = 256;

/// Snapshots kept for the consumer; older frames are dropped.
const SNAPSHOT_CAPACITY: usize = 2;

/// Cloneable handle for posting events.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<EngineEvent>,
}

impl EventSender {
    /// Queues an event without blocking. Returns `false` if it was dropped.
    pub fn post(&self, event: EngineEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::warn!("BUS: Event queue full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn key_down(&self, symbol: &str, at: f64) -> bool {
        self.post(EngineEvent::key_down(symbol, at))
    }

    pub fn key_up(&self, symbol: &str, at: f64) -> bool {
        self.post(EngineEvent::key_up(symbol, at))
    }
}

pub struct EventBus {
    event_tx: Sender<EngineEvent>,
    event_rx: Receiver<EngineEvent>,

    /// Loop -> consumer: session snapshots.
    pub snapshot_tx: Sender<SessionSnapshot>,
    pub snapshot_rx: Receiver<SessionSnapshot>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (event_tx, event_rx) = bounded(capacity.max(1));
        let (snapshot_tx, snapshot_rx) = bounded(SNAPSHOT_CAPACITY);
        Self {
            event_tx,
            event_rx,
            snapshot_tx,
            snapshot_rx,
        }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.event_tx.clone(),
        }
    }

    /// Takes every event queued so far, in arrival order.
    pub fn drain(&self) -> Vec<EngineEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Offers a snapshot to the consumer, replacing the oldest if full.
    pub fn publish(&self, snapshot: SessionSnapshot) {
        if let Err(TrySendError::Full(snapshot)) = self.snapshot_tx.try_send(snapshot) {
            let _ = self.snapshot_rx.try_recv();
            let _ = self.snapshot_tx.try_send(snapshot);
        }
    }

    /// Most recent published snapshot, discarding older ones.
    pub fn latest_snapshot(&self) -> Option<SessionSnapshot> {
        self.snapshot_rx.try_iter().last()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::bindings::KeyMap;
    use crate::models::engine::Playfield;
    use crate::models::settings::FallMode;
    use crate::state::session::{GameSession, Mode};
    use std::thread;

    #[test]
    fn drains_in_order_across_threads() {
        let bus = EventBus::new();
        let sender = bus.sender();

        let handle = thread::spawn(move || {
            sender.key_down("a", 1.0);
            sender.key_up("a", 1.2);
        });
        handle.join().unwrap();

        let events = bus.drain();
        assert_eq!(
            events,
            vec![EngineEvent::key_down("a", 1.0), EngineEvent::key_up("a", 1.2)]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let bus = EventBus::with_capacity(1);
        let sender = bus.sender();
        assert!(sender.post(EngineEvent::TrackEnded));
        assert!(!sender.post(EngineEvent::StopRequested));
        assert_eq!(bus.drain(), vec![EngineEvent::TrackEnded]);
    }

    #[test]
    fn publish_keeps_only_recent_snapshots() {
        let bus = EventBus::new();
        let session = GameSession::new(
            KeyMap::default(),
            Playfield::from_screen(1280.0, 720.0),
            Mode::Replay,
            FallMode::Fixed,
        );

        for score in 0..5 {
            let mut snapshot = session.snapshot();
            snapshot.total_score = score;
            bus.publish(snapshot);
        }

        assert_eq!(bus.latest_snapshot().map(|s| s.total_score), Some(4));
        assert!(bus.latest_snapshot().is_none());
    }
}
