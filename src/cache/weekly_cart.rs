//! Weekly-cart mirror and the derived week → menu mapping.
//!
//! Carts are keyed by the canonical Sunday of their week. Alongside the
//! membership mirror this store caches per-date menu lookups (negative
//! answers included) and the derived week mapping: for each of the seven
//! dates, the menu scheduled that day, included only when it is also a
//! member of the week's cart. Mapping builds fan out across several
//! endpoints, so they are single-flight per week; the cached mapping is
//! invalidated whenever any of its inputs change: cart membership inline,
//! menu date/detail changes via the event consumer.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use metrics::counter;
use tracing::{debug, warn};

use super::events::{EventKind, EventQueue};
use super::flight::FlightTable;
use super::lock::{rw_read, rw_write};
use super::session::SessionStore;
use super::usernames::UsernameCache;
use crate::api::Backend;
use crate::domain::types::{CartEntry, MenuDetails, PlacedMenu};
use crate::domain::week;
use crate::rpc::ApiError;

const SOURCE: &str = "cache::weekly_cart";

/// Date → placed menu for one week; dates without a cart menu are absent.
pub type WeekMapping = BTreeMap<NaiveDate, PlacedMenu>;

#[derive(Default)]
struct WeeklyCartState {
    carts: HashMap<NaiveDate, CartEntry>,
    errors: HashMap<NaiveDate, String>,
    current_week: Option<NaiveDate>,
    mappings: HashMap<NaiveDate, WeekMapping>,
    /// Menu core details reused across mapping builds.
    menu_summaries: HashMap<String, MenuDetails>,
    /// Date → scheduled menu id; `None` records a confirmed empty date.
    menu_by_date: HashMap<NaiveDate, Option<String>>,
}

struct WeeklyCartInner {
    backend: Arc<Backend>,
    events: Arc<EventQueue>,
    usernames: Arc<UsernameCache>,
    session: Arc<SessionStore>,
    menus: super::menus::MenusStore,
    state: RwLock<WeeklyCartState>,
    cart_flights: FlightTable<NaiveDate>,
    mapping_flights: FlightTable<NaiveDate>,
}

#[derive(Clone)]
pub struct WeeklyCartStore {
    inner: Arc<WeeklyCartInner>,
}

impl WeeklyCartStore {
    pub fn new(
        backend: Arc<Backend>,
        events: Arc<EventQueue>,
        usernames: Arc<UsernameCache>,
        session: Arc<SessionStore>,
        menus: super::menus::MenusStore,
    ) -> Self {
        Self {
            inner: Arc::new(WeeklyCartInner {
                backend,
                events,
                usernames,
                session,
                menus,
                state: RwLock::new(WeeklyCartState::default()),
                cart_flights: FlightTable::new(),
                mapping_flights: FlightTable::new(),
            }),
        }
    }

    /// Canonical week key for any date.
    pub fn week_key(date: NaiveDate) -> NaiveDate {
        week::week_start(date)
    }

    /// Loads the cart for the week containing `date` unless it is already
    /// resident; concurrent callers for the same week join one fetch.
    pub async fn ensure_cart_loaded(&self, date: NaiveDate) -> Result<(), ApiError> {
        let week = Self::week_key(date);
        if self.is_loaded(week) {
            counter!("larder_store_hit_total").increment(1);
            return Ok(());
        }
        WeeklyCartInner::load_cart(Arc::clone(&self.inner), week).await
    }

    /// Discards the week's cart and derived mapping immediately, then
    /// re-runs the fetch regardless of cached or in-flight state.
    pub async fn refresh_cart(&self, date: NaiveDate) -> Result<(), ApiError> {
        counter!("larder_store_refresh_total").increment(1);
        let week = Self::week_key(date);
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "refresh_cart");
            state.carts.remove(&week);
            state.errors.remove(&week);
            state.mappings.remove(&week);
        }
        self.inner.cart_flights.forget(&week);
        WeeklyCartInner::load_cart(Arc::clone(&self.inner), week).await
    }

    pub fn cart_for_week(&self, date: NaiveDate) -> Option<CartEntry> {
        let week = Self::week_key(date);
        rw_read(&self.inner.state, SOURCE, "cart_for_week")
            .carts
            .get(&week)
            .cloned()
    }

    pub fn menu_ids_for_week(&self, date: NaiveDate) -> Vec<String> {
        self.cart_for_week(date)
            .map(|cart| cart.menu_ids)
            .unwrap_or_default()
    }

    pub fn is_loaded(&self, date: NaiveDate) -> bool {
        let week = Self::week_key(date);
        rw_read(&self.inner.state, SOURCE, "is_loaded")
            .carts
            .contains_key(&week)
    }

    pub fn is_loading(&self, date: NaiveDate) -> bool {
        self.inner.cart_flights.contains(&Self::week_key(date))
    }

    pub fn error(&self, date: NaiveDate) -> Option<String> {
        let week = Self::week_key(date);
        rw_read(&self.inner.state, SOURCE, "error")
            .errors
            .get(&week)
            .cloned()
    }

    pub fn current_week(&self) -> Option<NaiveDate> {
        rw_read(&self.inner.state, SOURCE, "current_week").current_week
    }

    /// The scheduled menu for `date`, through the per-date cache. Negative
    /// answers and lookup failures cache as `None`.
    pub async fn menu_id_for_date(&self, date: NaiveDate) -> Option<String> {
        WeeklyCartInner::menu_id_for_date(&self.inner, date).await
    }

    /// The derived mapping for the week containing `date`, building (and
    /// caching) it when absent. Concurrent requests for the same week share
    /// one in-flight build.
    pub async fn week_mapping(&self, date: NaiveDate) -> Result<WeekMapping, ApiError> {
        let week = Self::week_key(date);
        loop {
            if let Some(mapping) = rw_read(&self.inner.state, SOURCE, "week_mapping")
                .mappings
                .get(&week)
            {
                return Ok(mapping.clone());
            }
            // A mutation can invalidate the mapping between build and read;
            // loop until a build survives to be observed.
            let inner = Arc::clone(&self.inner);
            self.inner
                .mapping_flights
                .run(week, async move {
                    WeeklyCartInner::build_mapping(inner, week).await
                })
                .await?;
        }
    }

    /// Drops the cached mapping for the week containing `date`. An
    /// in-progress build is left to finish; its result will simply be
    /// rebuilt on next demand if it lands after this call.
    pub fn clear_week_mapping(&self, date: NaiveDate) {
        let week = Self::week_key(date);
        rw_write(&self.inner.state, SOURCE, "clear_week_mapping")
            .mappings
            .remove(&week);
        debug!(%week, "cleared week mapping");
    }

    // Mutations call the backend first, then patch the mirror, keeping
    // membership and the derived mapping consistent.

    /// Creates the week's cart; returns the cart id.
    pub async fn create_cart(&self, date: NaiveDate) -> Result<String, ApiError> {
        let week = Self::week_key(date);
        match self.inner.backend.carts.create_cart(week).await {
            Ok(cart_id) => {
                {
                    let mut state = rw_write(&self.inner.state, SOURCE, "create_cart");
                    state.carts.insert(
                        week,
                        CartEntry {
                            cart_id: Some(cart_id.clone()),
                            menu_ids: Vec::new(),
                        },
                    );
                    state.errors.remove(&week);
                }
                self.inner
                    .events
                    .publish(EventKind::CartChanged { week_start: week });
                Ok(cart_id)
            }
            Err(error) => {
                rw_write(&self.inner.state, SOURCE, "create_cart.error")
                    .errors
                    .insert(week, error.to_string());
                Err(error)
            }
        }
    }

    /// Deletes the week's cart; returns the deleted cart's id.
    pub async fn delete_cart(&self, date: NaiveDate) -> Result<String, ApiError> {
        let week = Self::week_key(date);
        match self.inner.backend.carts.delete_cart(week).await {
            Ok(cart_id) => {
                {
                    let mut state = rw_write(&self.inner.state, SOURCE, "delete_cart");
                    state.carts.remove(&week);
                    state.errors.remove(&week);
                    state.mappings.remove(&week);
                }
                self.inner
                    .events
                    .publish(EventKind::CartChanged { week_start: week });
                Ok(cart_id)
            }
            Err(error) => {
                rw_write(&self.inner.state, SOURCE, "delete_cart.error")
                    .errors
                    .insert(week, error.to_string());
                Err(error)
            }
        }
    }

    /// Adds a menu to its week's cart (the backend creates the cart when
    /// needed); returns the cart id.
    pub async fn add_menu_to_cart(
        &self,
        menu_id: &str,
        menu_date: NaiveDate,
    ) -> Result<String, ApiError> {
        let cart_id = self
            .inner
            .backend
            .carts
            .add_menu_to_cart(menu_id, menu_date)
            .await?;

        let week = Self::week_key(menu_date);
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "add_menu_to_cart");
            let entry = state.carts.entry(week).or_default();
            entry.cart_id = Some(cart_id.clone());
            if !entry.contains(menu_id) {
                entry.menu_ids.push(menu_id.to_owned());
            }
            state.menu_by_date.insert(menu_date, Some(menu_id.to_owned()));
            state.mappings.remove(&week);
        }
        self.inner
            .events
            .publish(EventKind::CartChanged { week_start: week });
        Ok(cart_id)
    }

    /// Removes a menu from whichever cached cart holds it; returns the
    /// affected cart's id.
    pub async fn remove_menu_from_cart(&self, menu_id: &str) -> Result<String, ApiError> {
        let cart_id = self
            .inner
            .backend
            .carts
            .remove_menu_from_cart(menu_id)
            .await?;

        let mut affected_week = None;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "remove_menu_from_cart");
            let week = state
                .carts
                .iter()
                .find(|(_, cart)| cart.contains(menu_id))
                .map(|(&week, _)| week);
            if let Some(week) = week {
                if let Some(cart) = state.carts.get_mut(&week) {
                    cart.menu_ids.retain(|id| id != menu_id);
                }
                state.mappings.remove(&week);
                affected_week = Some(week);
            }
        }
        if let Some(week) = affected_week {
            self.inner
                .events
                .publish(EventKind::CartChanged { week_start: week });
        }
        Ok(cart_id)
    }

    /// Invalidates every piece of cached state that mentions `menu_id`;
    /// called by the consumer when another store changes a menu. The menu's
    /// (new) date, when known, has its week mapping dropped as well.
    pub fn note_menu_changed(&self, menu_id: &str, date: Option<NaiveDate>) {
        let mut state = rw_write(&self.inner.state, SOURCE, "note_menu_changed");
        state.menu_summaries.remove(menu_id);
        state
            .menu_by_date
            .retain(|_, cached| cached.as_deref() != Some(menu_id));
        state
            .mappings
            .retain(|_, mapping| !mapping.values().any(|placed| placed.id == menu_id));
        if let Some(date) = date {
            state.mappings.remove(&Self::week_key(date));
        }
    }

    pub fn note_menu_removed(&self, menu_id: &str) {
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "note_menu_removed");
            state.menu_summaries.remove(menu_id);
            state
                .menu_by_date
                .retain(|_, cached| cached.as_deref() != Some(menu_id));
            state
                .mappings
                .retain(|_, mapping| !mapping.values().any(|placed| placed.id == menu_id));
            for cart in state.carts.values_mut() {
                cart.menu_ids.retain(|id| id != menu_id);
            }
        }
        debug!(menu_id, "dropped menu from weekly cart caches");
    }

    pub fn clear_cart_for_week(&self, date: NaiveDate) {
        let week = Self::week_key(date);
        let mut state = rw_write(&self.inner.state, SOURCE, "clear_cart_for_week");
        state.carts.remove(&week);
        state.errors.remove(&week);
        state.mappings.remove(&week);
    }

    pub fn clear(&self) {
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "clear");
            *state = WeeklyCartState::default();
        }
        self.inner.cart_flights.clear();
        self.inner.mapping_flights.clear();
    }
}

impl WeeklyCartInner {
    async fn load_cart(inner: Arc<Self>, week: NaiveDate) -> Result<(), ApiError> {
        let run_inner = Arc::clone(&inner);
        inner
            .cart_flights
            .run(week, async move { Self::fetch_cart(run_inner, week).await })
            .await
    }

    async fn fetch_cart(inner: Arc<Self>, week: NaiveDate) -> Result<(), ApiError> {
        let result: Result<CartEntry, ApiError> = async {
            let entry = match inner.backend.carts.cart_by_date(week).await? {
                Some(cart_id) => {
                    let menu_ids = inner.backend.carts.menus_in_cart(&cart_id).await?;
                    CartEntry {
                        cart_id: Some(cart_id),
                        menu_ids,
                    }
                }
                None => {
                    debug!(%week, "no cart for week");
                    CartEntry::default()
                }
            };
            Ok(entry)
        }
        .await;

        match result {
            Ok(entry) => {
                let mut state = rw_write(&inner.state, SOURCE, "fetch_cart.store");
                state.carts.insert(week, entry);
                state.errors.remove(&week);
                state.current_week = Some(week);
                Ok(())
            }
            Err(error) => {
                counter!("larder_store_fetch_error_total").increment(1);
                // The entry stays absent so a later ensure retries.
                rw_write(&inner.state, SOURCE, "fetch_cart.error")
                    .errors
                    .insert(week, error.to_string());
                Err(error)
            }
        }
    }

    async fn menu_id_for_date(inner: &Arc<Self>, date: NaiveDate) -> Option<String> {
        if let Some(cached) = rw_read(&inner.state, SOURCE, "menu_id_for_date")
            .menu_by_date
            .get(&date)
        {
            counter!("larder_store_hit_total").increment(1);
            return cached.clone();
        }
        let looked_up = match inner.backend.menus.menu_by_date(date).await {
            Ok(menu) => menu,
            Err(error) => {
                warn!(%date, %error, "menu-by-date lookup failed; caching empty");
                None
            }
        };
        rw_write(&inner.state, SOURCE, "menu_id_for_date.store")
            .menu_by_date
            .insert(date, looked_up.clone());
        looked_up
    }

    async fn build_mapping(inner: Arc<Self>, week: NaiveDate) -> Result<(), ApiError> {
        Self::load_cart_if_absent(Arc::clone(&inner), week).await?;

        let cart_menu_ids: HashSet<String> = rw_read(&inner.state, SOURCE, "build_mapping.cart")
            .carts
            .get(&week)
            .map(|cart| cart.menu_ids.iter().cloned().collect())
            .unwrap_or_default();

        let mut mapping = WeekMapping::new();
        for date in week::week_dates(week) {
            let Some(menu_id) = Self::menu_id_for_date(&inner, date).await else {
                continue;
            };
            if !cart_menu_ids.contains(&menu_id) {
                continue;
            }
            let Some(details) = Self::menu_summary(&inner, &menu_id).await else {
                continue;
            };
            let (owner_name, recipe_names) =
                Self::menu_extras(&inner, &menu_id, &details.owner).await;
            mapping.insert(
                date,
                PlacedMenu {
                    id: menu_id,
                    name: details.name,
                    date: details.date,
                    owner: details.owner,
                    owner_name,
                    recipe_names,
                },
            );
        }

        debug!(%week, placed = mapping.len(), "week mapping built");
        rw_write(&inner.state, SOURCE, "build_mapping.store")
            .mappings
            .insert(week, mapping);
        Ok(())
    }

    async fn load_cart_if_absent(inner: Arc<Self>, week: NaiveDate) -> Result<(), ApiError> {
        let loaded = rw_read(&inner.state, SOURCE, "load_cart_if_absent")
            .carts
            .contains_key(&week);
        if loaded {
            return Ok(());
        }
        Self::load_cart(inner, week).await
    }

    /// Menu core details for a mapping slot: the local summary cache first,
    /// then the menus store, then a fetch (cached for later builds). `None`
    /// drops the date from the mapping, matching the lookup-failure
    /// behavior of the cart views.
    async fn menu_summary(inner: &Arc<Self>, menu_id: &str) -> Option<MenuDetails> {
        if let Some(details) = rw_read(&inner.state, SOURCE, "menu_summary")
            .menu_summaries
            .get(menu_id)
        {
            return Some(details.clone());
        }
        if let Some(menu) = inner.menus.find_menu(menu_id) {
            return Some(MenuDetails {
                name: menu.name,
                date: menu.date,
                owner: menu.owner,
            });
        }
        match inner.backend.menus.menu_details(menu_id).await {
            Ok(response) => {
                let details = MenuDetails {
                    name: response.name,
                    date: response.date,
                    owner: response.owner,
                };
                rw_write(&inner.state, SOURCE, "menu_summary.store")
                    .menu_summaries
                    .insert(menu_id.to_owned(), details.clone());
                Some(details)
            }
            Err(error) => {
                warn!(menu_id, %error, "menu details unavailable for week mapping");
                None
            }
        }
    }

    /// Owner display name and recipe names for a placed menu. Partial
    /// failures degrade to fallback text rather than aborting the build.
    async fn menu_extras(
        inner: &Arc<Self>,
        menu_id: &str,
        owner_id: &str,
    ) -> (String, Vec<String>) {
        let owner_name = match inner.session.session() {
            Some(session) if session.id == owner_id => session.username,
            _ => inner.usernames.resolve(owner_id).await,
        };

        let mut recipe_names = Vec::new();
        match inner.backend.menus.recipes_in_menu(menu_id).await {
            Ok(recipe_map) => {
                for recipe_id in recipe_map.keys() {
                    match inner.backend.cook_book.recipe_details(recipe_id).await {
                        Ok(details) if !details.name.is_empty() => {
                            recipe_names.push(details.name);
                        }
                        _ => recipe_names.push(format!("Recipe {recipe_id}")),
                    }
                }
            }
            Err(error) => {
                debug!(menu_id, %error, "recipe list unavailable; leaving names empty");
            }
        }

        (owner_name, recipe_names)
    }
}
