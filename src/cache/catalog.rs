//! Store-catalog mirror.
//!
//! One singleton entry: the full item list with purchase options. Loading
//! fans out (item list → per-item names and option ids → per-option
//! details); individually broken items or options are dropped rather than
//! failing the whole load, matching how the backend's reference client
//! behaves. Items stay sorted by case-folded name and option lists keep
//! newest-first insertion order across every mutation. The whole mirror is
//! persisted as a JSON snapshot and rehydrated verbatim at startup.

use std::sync::{Arc, RwLock};

use futures::future::join_all;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::events::{EventKind, EventQueue};
use super::flight::FlightTable;
use super::lock::{rw_read, rw_write};
use crate::api::Backend;
use crate::domain::types::{CatalogItem, PurchaseOption};
use crate::infra::storage::{SessionStorage, keys};
use crate::rpc::ApiError;

const SOURCE: &str = "cache::catalog";
const UNKNOWN_ITEM_NAME: &str = "Unknown";

/// Field-wise patch for a cached purchase option.
#[derive(Debug, Clone, Default)]
pub struct PurchaseOptionPatch {
    pub quantity: Option<f64>,
    pub units: Option<String>,
    pub price: Option<f64>,
    pub store: Option<String>,
    pub confirmed: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogSnapshot {
    items: Vec<CatalogItem>,
    loaded: bool,
}

#[derive(Default)]
struct CatalogState {
    items: Vec<CatalogItem>,
    loaded: bool,
    error: Option<String>,
}

struct CatalogInner {
    backend: Arc<Backend>,
    storage: Arc<SessionStorage>,
    events: Arc<EventQueue>,
    state: RwLock<CatalogState>,
    flights: FlightTable<()>,
}

#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogInner>,
}

impl CatalogStore {
    /// Rehydrates any persisted snapshot from session storage.
    pub fn new(
        backend: Arc<Backend>,
        storage: Arc<SessionStorage>,
        events: Arc<EventQueue>,
    ) -> Self {
        let mut state = CatalogState::default();
        if let Some(raw) = storage.get(keys::CATALOG_SNAPSHOT) {
            match serde_json::from_str::<CatalogSnapshot>(&raw) {
                Ok(snapshot) => {
                    debug!(items = snapshot.items.len(), "restored catalog snapshot");
                    state.items = snapshot.items;
                    state.loaded = snapshot.loaded;
                }
                Err(error) => {
                    warn!(%error, "discarding unreadable catalog snapshot");
                    storage.remove(keys::CATALOG_SNAPSHOT);
                }
            }
        }
        Self {
            inner: Arc::new(CatalogInner {
                backend,
                storage,
                events,
                state: RwLock::new(state),
                flights: FlightTable::new(),
            }),
        }
    }

    /// Loads the catalog unless it is already resident; concurrent callers
    /// join the same fetch.
    pub async fn ensure_loaded(&self) -> Result<(), ApiError> {
        if self.is_loaded() {
            counter!("larder_store_hit_total").increment(1);
            return Ok(());
        }
        self.load().await
    }

    /// Discards the cached catalog immediately and re-runs the fetch,
    /// regardless of cached or in-flight state.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        counter!("larder_store_refresh_total").increment(1);
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "refresh");
            state.items.clear();
            state.loaded = false;
        }
        self.inner.flights.forget(&());
        self.load().await
    }

    async fn load(&self) -> Result<(), ApiError> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .flights
            .run((), async move { CatalogInner::fetch(inner).await })
            .await
    }

    pub fn items(&self) -> Vec<CatalogItem> {
        rw_read(&self.inner.state, SOURCE, "items").items.clone()
    }

    pub fn find_item(&self, item_id: &str) -> Option<CatalogItem> {
        rw_read(&self.inner.state, SOURCE, "find_item")
            .items
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
    }

    /// The item owning a purchase option.
    pub fn find_item_by_purchase_option(&self, option_id: &str) -> Option<CatalogItem> {
        rw_read(&self.inner.state, SOURCE, "find_item_by_purchase_option")
            .items
            .iter()
            .find(|item| item.find_option(option_id).is_some())
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        rw_read(&self.inner.state, SOURCE, "is_loaded").loaded
    }

    pub fn is_loading(&self) -> bool {
        self.inner.flights.contains(&())
    }

    pub fn error(&self) -> Option<String> {
        rw_read(&self.inner.state, SOURCE, "error").error.clone()
    }

    // Mutations assume the corresponding remote call already succeeded;
    // callers sequence remote-then-patch.

    pub fn add_item(&self, item: CatalogItem) {
        let item_id = item.id.clone();
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "add_item");
            state.items.push(item);
            sort_items(&mut state.items);
        }
        self.after_mutation(Some(item_id));
    }

    pub fn update_item_name(&self, item_id: &str, name: &str) {
        let mut changed = false;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "update_item_name");
            if let Some(item) = state.items.iter_mut().find(|i| i.id == item_id) {
                item.name = name.to_owned();
                changed = true;
            }
            if changed {
                sort_items(&mut state.items);
            }
        }
        if changed {
            self.after_mutation(Some(item_id.to_owned()));
        }
    }

    pub fn remove_item(&self, item_id: &str) {
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "remove_item");
            state.items.retain(|item| item.id != item_id);
        }
        self.after_mutation(Some(item_id.to_owned()));
    }

    /// New options go to the front: newest first is the list's defined
    /// order.
    pub fn add_purchase_option(&self, item_id: &str, option: PurchaseOption) {
        let mut changed = false;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "add_purchase_option");
            if let Some(item) = state.items.iter_mut().find(|i| i.id == item_id) {
                item.purchase_options.insert(0, option);
                changed = true;
            }
        }
        if changed {
            self.after_mutation(Some(item_id.to_owned()));
        }
    }

    pub fn update_purchase_option(
        &self,
        item_id: &str,
        option_id: &str,
        patch: &PurchaseOptionPatch,
    ) {
        let mut changed = false;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "update_purchase_option");
            if let Some(option) = state
                .items
                .iter_mut()
                .find(|i| i.id == item_id)
                .and_then(|item| {
                    item.purchase_options
                        .iter_mut()
                        .find(|po| po.id == option_id)
                })
            {
                if let Some(quantity) = patch.quantity {
                    option.quantity = quantity;
                }
                if let Some(units) = &patch.units {
                    option.units = units.clone();
                }
                if let Some(price) = patch.price {
                    option.price = price;
                }
                if let Some(store) = &patch.store {
                    option.store = store.clone();
                }
                if let Some(confirmed) = patch.confirmed {
                    option.confirmed = confirmed;
                }
                changed = true;
            }
        }
        if changed {
            self.after_mutation(Some(item_id.to_owned()));
        }
    }

    pub fn remove_purchase_option(&self, item_id: &str, option_id: &str) {
        let mut changed = false;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "remove_purchase_option");
            if let Some(item) = state.items.iter_mut().find(|i| i.id == item_id) {
                item.purchase_options.retain(|po| po.id != option_id);
                changed = true;
            }
        }
        if changed {
            self.after_mutation(Some(item_id.to_owned()));
        }
    }

    pub fn clear(&self) {
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "clear");
            *state = CatalogState::default();
        }
        self.inner.storage.remove(keys::CATALOG_SNAPSHOT);
    }

    fn after_mutation(&self, item_id: Option<String>) {
        self.inner.persist();
        self.inner.events.publish(EventKind::CatalogChanged { item_id });
    }
}

impl CatalogInner {
    async fn fetch(inner: Arc<Self>) -> Result<(), ApiError> {
        match load_catalog(&inner.backend).await {
            Ok(mut items) => {
                sort_items(&mut items);
                {
                    let mut state = rw_write(&inner.state, SOURCE, "fetch.store");
                    state.items = items;
                    state.loaded = true;
                    state.error = None;
                }
                inner.persist();
                inner
                    .events
                    .publish(EventKind::CatalogChanged { item_id: None });
                Ok(())
            }
            Err(error) => {
                counter!("larder_store_fetch_error_total").increment(1);
                rw_write(&inner.state, SOURCE, "fetch.error").error = Some(error.to_string());
                Err(error)
            }
        }
    }

    fn persist(&self) {
        let snapshot = {
            let state = rw_read(&self.state, SOURCE, "persist");
            CatalogSnapshot {
                items: state.items.clone(),
                loaded: state.loaded,
            }
        };
        match serde_json::to_string(&snapshot) {
            Ok(json) => self.storage.set(keys::CATALOG_SNAPSHOT, json),
            Err(error) => warn!(%error, "failed to serialize catalog snapshot"),
        }
    }
}

fn sort_items(items: &mut [CatalogItem]) {
    items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}

async fn load_catalog(backend: &Backend) -> Result<Vec<CatalogItem>, ApiError> {
    let item_ids = backend.catalog.all_items().await?;
    let fetches = item_ids.into_iter().map(|id| load_item(backend, id));
    let items = join_all(fetches).await;
    Ok(items.into_iter().flatten().collect())
}

async fn load_item(backend: &Backend, item_id: String) -> Option<CatalogItem> {
    let (names, option_ids) = tokio::join!(
        backend.catalog.item_names(&item_id),
        backend.catalog.item_purchase_options(&item_id),
    );
    let (names, option_ids) = match (names, option_ids) {
        (Ok(names), Ok(option_ids)) => (names, option_ids),
        (Err(error), _) | (_, Err(error)) => {
            warn!(item_id, %error, "dropping catalog item that failed to load");
            return None;
        }
    };

    let options = join_all(
        option_ids
            .into_iter()
            .map(|option_id| load_option(backend, option_id)),
    )
    .await;

    Some(CatalogItem {
        id: item_id,
        name: names.name.unwrap_or_else(|| UNKNOWN_ITEM_NAME.to_owned()),
        purchase_options: options.into_iter().flatten().collect(),
    })
}

async fn load_option(backend: &Backend, option_id: String) -> Option<PurchaseOption> {
    match backend.catalog.purchase_option_details(&option_id).await {
        Ok(details) => Some(PurchaseOption {
            id: option_id,
            quantity: details.quantity,
            units: details.units,
            price: details.price,
            store: details.store,
            confirmed: details.confirmed,
        }),
        Err(error) => {
            warn!(option_id, %error, "dropping purchase option that failed to load");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::rpc::RpcClient;

    fn test_store() -> (CatalogStore, Arc<SessionStorage>, Arc<EventQueue>) {
        let storage = Arc::new(SessionStorage::in_memory());
        let rpc = RpcClient::new(
            Url::parse("http://127.0.0.1:9").expect("url"),
            Duration::from_secs(1),
            Arc::clone(&storage),
        )
        .expect("rpc client");
        let backend = Backend::new(Arc::new(rpc));
        let events = Arc::new(EventQueue::new());
        let store = CatalogStore::new(backend, Arc::clone(&storage), Arc::clone(&events));
        (store, storage, events)
    }

    fn item(id: &str, name: &str, options: Vec<PurchaseOption>) -> CatalogItem {
        CatalogItem {
            id: id.to_owned(),
            name: name.to_owned(),
            purchase_options: options,
        }
    }

    fn option(id: &str, quantity: f64, units: &str) -> PurchaseOption {
        PurchaseOption {
            id: id.to_owned(),
            quantity,
            units: units.to_owned(),
            price: 1.0,
            store: "Wegmans".to_owned(),
            confirmed: false,
        }
    }

    #[test]
    fn items_stay_sorted_by_folded_name() {
        let (store, _, _) = test_store();
        store.add_item(item("i1", "Flour", vec![]));
        store.add_item(item("i2", "apples", vec![]));
        store.add_item(item("i3", "Butter", vec![]));

        let names: Vec<String> = store.items().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["apples", "Butter", "Flour"]);

        // An earlier-sorting name moves its item to the front.
        store.update_item_name("i1", "Almonds");
        let names: Vec<String> = store.items().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Almonds", "apples", "Butter"]);
    }

    #[test]
    fn new_options_are_inserted_newest_first() {
        let (store, _, _) = test_store();
        store.add_item(item("i1", "Milk", vec![option("po1", 2.0, "cup")]));
        store.add_purchase_option("i1", option("po2", 1.0, "cup"));

        let cached = store.find_item("i1").expect("item");
        let ids: Vec<String> = cached.purchase_options.into_iter().map(|po| po.id).collect();
        assert_eq!(ids, vec!["po2", "po1"]);
    }

    #[test]
    fn option_patch_applies_only_set_fields() {
        let (store, _, _) = test_store();
        store.add_item(item("i1", "Milk", vec![option("po1", 2.0, "cup")]));
        store.update_purchase_option(
            "i1",
            "po1",
            &PurchaseOptionPatch {
                price: Some(3.49),
                ..Default::default()
            },
        );

        let cached = store.find_item("i1").expect("item");
        let po = cached.find_option("po1").expect("option");
        assert_eq!(po.price, 3.49);
        assert_eq!(po.quantity, 2.0);
        assert_eq!(po.units, "cup");
    }

    #[test]
    fn snapshot_roundtrips_through_storage() {
        let (store, storage, _) = test_store();
        store.add_item(item("i1", "Flour", vec![option("po1", 2.0, "cup")]));
        store.add_item(item("i2", "Butter", vec![]));
        let before = store.items();

        // A fresh store over the same storage sees identical state.
        let rpc = RpcClient::new(
            Url::parse("http://127.0.0.1:9").expect("url"),
            Duration::from_secs(1),
            Arc::clone(&storage),
        )
        .expect("rpc client");
        let backend = Backend::new(Arc::new(rpc));
        let rehydrated =
            CatalogStore::new(backend, Arc::clone(&storage), Arc::new(EventQueue::new()));
        assert_eq!(rehydrated.items(), before);
    }

    #[test]
    fn find_item_by_purchase_option_scans_ownership() {
        let (store, _, _) = test_store();
        store.add_item(item("i1", "Milk", vec![option("po1", 2.0, "cup")]));
        store.add_item(item("i2", "Eggs", vec![option("po2", 12.0, "each")]));

        let owner = store
            .find_item_by_purchase_option("po2")
            .expect("owning item");
        assert_eq!(owner.id, "i2");
        assert!(store.find_item_by_purchase_option("po9").is_none());
    }

    #[test]
    fn mutations_publish_change_events() {
        let (store, _, events) = test_store();
        store.add_item(item("i1", "Milk", vec![]));
        store.remove_item("i1");

        let kinds: Vec<EventKind> = events.drain(10).into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::CatalogChanged {
                    item_id: Some("i1".to_owned())
                },
                EventKind::CatalogChanged {
                    item_id: Some("i1".to_owned())
                },
            ]
        );
    }

    #[test]
    fn clear_drops_state_and_snapshot() {
        let (store, storage, _) = test_store();
        store.add_item(item("i1", "Milk", vec![]));
        assert!(storage.get(keys::CATALOG_SNAPSHOT).is_some());

        store.clear();
        assert!(store.items().is_empty());
        assert!(!store.is_loaded());
        assert!(storage.get(keys::CATALOG_SNAPSHOT).is_none());
    }
}
