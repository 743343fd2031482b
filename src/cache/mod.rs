//! Entity caches ("stores").
//!
//! Each store mirrors one backend aggregate: created empty (or rehydrated
//! from a persisted snapshot), populated on first `ensure_loaded` per key,
//! patched in place by mutation methods after the remote call succeeds, and
//! cleared wholesale at logout. Nothing expires by time; explicit refresh
//! or mutation is the only path to change cached content.
//!
//! Concurrency follows the single-flight rule: at most one fetch per key,
//! with concurrent callers joining the in-flight operation ([`flight`]).
//! Mutations publish [`events::StoreEvent`]s; [`StoreConsumer`] applies the
//! invalidations that cross store boundaries.

mod catalog;
mod consumer;
mod events;
mod flight;
mod lock;
mod menu_detail;
mod menus;
mod session;
mod usernames;
mod weekly_cart;

use std::sync::Arc;

pub use catalog::{CatalogStore, PurchaseOptionPatch};
pub use consumer::StoreConsumer;
pub use events::{Epoch, EventKind, EventQueue, StoreEvent};
pub use menu_detail::{MenuDetailPatch, MenuDetailStore, RecipePatch};
pub use menus::{MenuPatch, MenusStore, UserEntry};
pub use session::SessionStore;
pub use usernames::UsernameCache;
pub use weekly_cart::{WeekMapping, WeeklyCartStore};

use crate::api::Backend;
use crate::infra::storage::SessionStorage;

/// The full store set over one backend, wired to a shared event queue.
///
/// Explicitly constructed and passed by reference: one instance per
/// process (or per test), never a module-level singleton.
pub struct Stores {
    pub events: Arc<EventQueue>,
    pub usernames: Arc<UsernameCache>,
    pub session: Arc<SessionStore>,
    pub catalog: CatalogStore,
    pub menus: MenusStore,
    pub menu_detail: MenuDetailStore,
    pub weekly_cart: WeeklyCartStore,
    pub consumer: StoreConsumer,
}

impl Stores {
    pub fn new(backend: Arc<Backend>, storage: Arc<SessionStorage>) -> Self {
        let events = Arc::new(EventQueue::new());
        let usernames = Arc::new(UsernameCache::new(Arc::clone(&backend)));
        let session = Arc::new(SessionStore::new(
            Arc::clone(&backend),
            Arc::clone(&storage),
            Arc::clone(&events),
        ));
        let catalog = CatalogStore::new(
            Arc::clone(&backend),
            Arc::clone(&storage),
            Arc::clone(&events),
        );
        let menus = MenusStore::new(
            Arc::clone(&backend),
            Arc::clone(&events),
            Arc::clone(&usernames),
        );
        let menu_detail = MenuDetailStore::new(
            Arc::clone(&backend),
            Arc::clone(&storage),
            Arc::clone(&events),
            Arc::clone(&usernames),
        );
        let weekly_cart = WeeklyCartStore::new(
            backend,
            Arc::clone(&events),
            Arc::clone(&usernames),
            Arc::clone(&session),
            menus.clone(),
        );
        let consumer = StoreConsumer::new(
            Arc::clone(&events),
            catalog.clone(),
            menus.clone(),
            menu_detail.clone(),
            weekly_cart.clone(),
            Arc::clone(&usernames),
        );
        Self {
            events,
            usernames,
            session,
            catalog,
            menus,
            menu_detail,
            weekly_cart,
            consumer,
        }
    }
}
