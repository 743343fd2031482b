//! Cross-store invalidation.
//!
//! Drains the shared event queue in batches and applies the invalidations
//! that cross store boundaries: menu changes from the menus/detail stores
//! invalidate the weekly cart's derived state, and a session end clears
//! every store wholesale. Callers run a consumption pass after mutations
//! (the CLI does this once per command); nothing here is time-driven.

use std::sync::Arc;

use tracing::debug;

use super::catalog::CatalogStore;
use super::events::{EventKind, EventQueue, StoreEvent};
use super::menu_detail::MenuDetailStore;
use super::menus::MenusStore;
use super::usernames::UsernameCache;
use super::weekly_cart::WeeklyCartStore;

const DEFAULT_BATCH_LIMIT: usize = 100;

pub struct StoreConsumer {
    queue: Arc<EventQueue>,
    catalog: CatalogStore,
    menus: MenusStore,
    menu_detail: MenuDetailStore,
    weekly_cart: WeeklyCartStore,
    usernames: Arc<UsernameCache>,
}

impl StoreConsumer {
    pub fn new(
        queue: Arc<EventQueue>,
        catalog: CatalogStore,
        menus: MenusStore,
        menu_detail: MenuDetailStore,
        weekly_cart: WeeklyCartStore,
        usernames: Arc<UsernameCache>,
    ) -> Self {
        Self {
            queue,
            catalog,
            menus,
            menu_detail,
            weekly_cart,
            usernames,
        }
    }

    /// Drain and apply up to `limit` pending events; returns how many were
    /// applied.
    pub fn consume(&self, limit: usize) -> usize {
        let events = self.queue.drain(limit);
        let count = events.len();
        for event in events {
            self.apply(&event);
        }
        count
    }

    /// Drain the queue to empty in batches.
    pub fn consume_all(&self) -> usize {
        let mut total = 0;
        loop {
            let applied = self.consume(DEFAULT_BATCH_LIMIT);
            if applied == 0 {
                return total;
            }
            total += applied;
        }
    }

    fn apply(&self, event: &StoreEvent) {
        debug!(event_id = %event.id, event_kind = ?event.kind, "applying store event");
        match &event.kind {
            EventKind::SessionEnded => {
                self.catalog.clear();
                self.menus.clear();
                self.menu_detail.clear();
                self.weekly_cart.clear();
                self.usernames.clear();
            }
            EventKind::MenuUpserted { menu_id, date }
            | EventKind::MenuDetailChanged { menu_id, date } => {
                self.weekly_cart.note_menu_changed(menu_id, *date);
            }
            EventKind::MenuRemoved { menu_id } => {
                self.weekly_cart.note_menu_removed(menu_id);
            }
            // Remaining kinds are re-read signals with no cross-store
            // dependents.
            EventKind::SessionStarted { .. }
            | EventKind::CatalogChanged { .. }
            | EventKind::MenusChanged { .. }
            | EventKind::CartChanged { .. } => {}
        }
    }
}
