//! Store change events.
//!
//! Mutation methods publish an explicit change signal instead of relying on
//! implicit field-level reactivity: consumers drain the queue and re-read
//! the stores deliberately. The [`super::StoreConsumer`] also uses these
//! signals to invalidate derived state whose inputs live in another store.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::debug;
use uuid::Uuid;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::events";

/// Monotonic epoch for ordering events within this process.
pub type Epoch = u64;

#[derive(Debug, Clone)]
pub struct StoreEvent {
    /// Unique identifier for idempotency.
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl StoreEvent {
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Change signals published by store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A user logged in or was restored from storage.
    SessionStarted { user_id: String },
    /// The session ended; every store is cleared wholesale.
    SessionEnded,
    /// Catalog content changed; `item_id` is `None` for whole-catalog
    /// reloads.
    CatalogChanged { item_id: Option<String> },
    /// The resident user's menu list was reloaded or restructured.
    MenusChanged { user_id: String },
    /// A menu summary was created or edited; `date` is the menu's date
    /// when known, so week-scoped derived state can be invalidated.
    MenuUpserted {
        menu_id: String,
        date: Option<chrono::NaiveDate>,
    },
    /// A menu was removed entirely.
    MenuRemoved { menu_id: String },
    /// A menu's detail entry (recipes, attributes) changed.
    MenuDetailChanged {
        menu_id: String,
        date: Option<chrono::NaiveDate>,
    },
    /// A week's cart membership changed.
    CartChanged { week_start: chrono::NaiveDate },
}

/// In-memory event queue shared by all stores.
///
/// A mutex-guarded deque is enough: publishes are short and contention is
/// low in a cooperative client.
pub struct EventQueue {
    queue: Mutex<VecDeque<StoreEvent>>,
    epoch_counter: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
        }
    }

    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub fn publish(&self, kind: EventKind) {
        let epoch = self.next_epoch();
        let event = StoreEvent::new(kind.clone(), epoch);

        counter!("larder_store_event_total").increment(1);
        debug!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = ?kind,
            "store event published"
        );

        mutex_lock(&self.queue, SOURCE, "publish").push_back(event);
    }

    /// Drain up to `limit` events in FIFO order.
    pub fn drain(&self, limit: usize) -> Vec<StoreEvent> {
        let mut queue = mutex_lock(&self.queue, SOURCE, "drain");
        let count = limit.min(queue.len());
        queue.drain(..count).collect()
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        mutex_lock(&self.queue, SOURCE, "clear").clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_monotonicity() {
        let queue = EventQueue::new();
        let e1 = queue.next_epoch();
        let e2 = queue.next_epoch();
        assert!(e1 < e2);
    }

    #[test]
    fn publish_and_drain_fifo() {
        let queue = EventQueue::new();
        queue.publish(EventKind::SessionEnded);
        queue.publish(EventKind::CatalogChanged { item_id: None });
        queue.publish(EventKind::MenuRemoved {
            menu_id: "m1".to_owned(),
        });

        assert_eq!(queue.len(), 3);

        let events = queue.drain(2);
        assert_eq!(events.len(), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(events[0].kind, EventKind::SessionEnded);
        assert_eq!(
            events[1].kind,
            EventKind::CatalogChanged { item_id: None }
        );
    }

    #[test]
    fn drain_more_than_available() {
        let queue = EventQueue::new();
        queue.publish(EventKind::SessionEnded);
        let events = queue.drain(100);
        assert_eq!(events.len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_queue() {
        let queue = EventQueue::new();
        queue.publish(EventKind::SessionEnded);
        queue.clear();
        assert!(queue.is_empty());
    }
}
