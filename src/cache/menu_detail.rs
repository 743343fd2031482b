//! Per-menu detail mirror.
//!
//! Keyed by menu id, lazily populated, with independent loading and error
//! state per key. Each entry carries the menu's attributes, its owner's
//! display name, and the full recipe list with ingredients. Entries and
//! errors persist as a JSON snapshot and rehydrate verbatim at startup, so
//! a revisited menu renders without a refetch.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use futures::future::{join_all, try_join};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::events::{EventKind, EventQueue};
use super::flight::FlightTable;
use super::lock::{rw_read, rw_write};
use super::usernames::UsernameCache;
use crate::api::Backend;
use crate::domain::types::{Ingredient, MenuDetailEntry, MenuDetails, RecipeEntry};
use crate::infra::storage::{SessionStorage, keys};
use crate::rpc::ApiError;

const SOURCE: &str = "cache::menu_detail";

/// Field-wise patch for a cached menu's attributes.
#[derive(Debug, Clone, Default)]
pub struct MenuDetailPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Field-wise patch for a cached recipe.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub dish_type: Option<String>,
    pub serving_quantity: Option<f64>,
    pub instructions: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MenuDetailSnapshot {
    entries: HashMap<String, MenuDetailEntry>,
    errors: HashMap<String, String>,
}

#[derive(Default)]
struct MenuDetailState {
    entries: HashMap<String, MenuDetailEntry>,
    errors: HashMap<String, String>,
}

struct MenuDetailInner {
    backend: Arc<Backend>,
    storage: Arc<SessionStorage>,
    events: Arc<EventQueue>,
    usernames: Arc<UsernameCache>,
    state: RwLock<MenuDetailState>,
    flights: FlightTable<String>,
}

#[derive(Clone)]
pub struct MenuDetailStore {
    inner: Arc<MenuDetailInner>,
}

impl MenuDetailStore {
    /// Rehydrates any persisted snapshot from session storage.
    pub fn new(
        backend: Arc<Backend>,
        storage: Arc<SessionStorage>,
        events: Arc<EventQueue>,
        usernames: Arc<UsernameCache>,
    ) -> Self {
        let mut state = MenuDetailState::default();
        if let Some(raw) = storage.get(keys::MENU_DETAIL_SNAPSHOT) {
            match serde_json::from_str::<MenuDetailSnapshot>(&raw) {
                Ok(snapshot) => {
                    debug!(entries = snapshot.entries.len(), "restored menu detail snapshot");
                    state.entries = snapshot.entries;
                    state.errors = snapshot.errors;
                }
                Err(error) => {
                    warn!(%error, "discarding unreadable menu detail snapshot");
                    storage.remove(keys::MENU_DETAIL_SNAPSHOT);
                }
            }
        }
        Self {
            inner: Arc::new(MenuDetailInner {
                backend,
                storage,
                events,
                usernames,
                state: RwLock::new(state),
                flights: FlightTable::new(),
            }),
        }
    }

    /// Loads `menu_id` unless its entry is resident; concurrent callers for
    /// the same menu join one fetch.
    pub async fn ensure_loaded(&self, menu_id: &str) -> Result<(), ApiError> {
        if self.is_loaded(menu_id) {
            counter!("larder_store_hit_total").increment(1);
            return Ok(());
        }
        self.load(menu_id).await
    }

    /// Discards the entry immediately and re-runs the fetch, regardless of
    /// cached or in-flight state.
    pub async fn refresh(&self, menu_id: &str) -> Result<(), ApiError> {
        counter!("larder_store_refresh_total").increment(1);
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "refresh");
            state.entries.remove(menu_id);
            state.errors.remove(menu_id);
        }
        self.inner.flights.forget(&menu_id.to_owned());
        self.load(menu_id).await
    }

    async fn load(&self, menu_id: &str) -> Result<(), ApiError> {
        let inner = Arc::clone(&self.inner);
        let menu = menu_id.to_owned();
        self.inner
            .flights
            .run(menu_id.to_owned(), async move {
                MenuDetailInner::fetch(inner, menu).await
            })
            .await
    }

    pub fn get(&self, menu_id: &str) -> Option<MenuDetailEntry> {
        rw_read(&self.inner.state, SOURCE, "get")
            .entries
            .get(menu_id)
            .cloned()
    }

    pub fn owner_username(&self, menu_id: &str) -> Option<String> {
        rw_read(&self.inner.state, SOURCE, "owner_username")
            .entries
            .get(menu_id)
            .map(|entry| entry.owner_username.clone())
    }

    pub fn is_loaded(&self, menu_id: &str) -> bool {
        rw_read(&self.inner.state, SOURCE, "is_loaded")
            .entries
            .contains_key(menu_id)
    }

    pub fn is_loading(&self, menu_id: &str) -> bool {
        self.inner.flights.contains(&menu_id.to_owned())
    }

    pub fn error(&self, menu_id: &str) -> Option<String> {
        rw_read(&self.inner.state, SOURCE, "error")
            .errors
            .get(menu_id)
            .cloned()
    }

    // Mutations assume the corresponding remote call already succeeded.

    pub fn update_menu(&self, menu_id: &str, patch: &MenuDetailPatch) {
        let mut date = None;
        let mut changed = false;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "update_menu");
            if let Some(entry) = state.entries.get_mut(menu_id) {
                if let Some(name) = &patch.name {
                    entry.details.name = name.clone();
                }
                if let Some(new_date) = patch.date {
                    entry.details.date = new_date;
                }
                date = Some(entry.details.date);
                changed = true;
            }
        }
        if changed {
            self.after_mutation(menu_id, date);
        }
    }

    /// Fetches the recipe's details and ingredients, then appends it to the
    /// cached menu. Loads the menu first when it is not resident.
    pub async fn add_recipe(
        &self,
        menu_id: &str,
        recipe_id: &str,
        scaling_factor: f64,
    ) -> Result<(), ApiError> {
        if !self.is_loaded(menu_id) {
            // Loading pulls the new recipe in with everything else.
            self.load(menu_id).await?;
            if self
                .get(menu_id)
                .is_some_and(|entry| entry.recipes.iter().any(|r| r.id == recipe_id))
            {
                return Ok(());
            }
        }

        let (details, ingredients) = try_join(
            self.inner.backend.cook_book.recipe_details(recipe_id),
            self.inner.backend.cook_book.recipe_ingredients(recipe_id),
        )
        .await?;

        let recipe = RecipeEntry {
            id: recipe_id.to_owned(),
            name: details.name,
            dish_type: details.dish_type,
            serving_quantity: details.serving_quantity,
            instructions: details.instructions,
            scaling_factor,
            ingredients: ingredients
                .into_iter()
                .map(|dto| Ingredient {
                    name: dto.name,
                    quantity: dto.quantity,
                    units: dto.units,
                })
                .collect(),
        };

        let mut date = None;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "add_recipe");
            if let Some(entry) = state.entries.get_mut(menu_id) {
                entry.recipes.push(recipe);
                date = Some(entry.details.date);
            }
        }
        self.after_mutation(menu_id, date);
        Ok(())
    }

    pub fn remove_recipe(&self, menu_id: &str, recipe_id: &str) {
        let mut date = None;
        let mut changed = false;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "remove_recipe");
            if let Some(entry) = state.entries.get_mut(menu_id) {
                entry.recipes.retain(|recipe| recipe.id != recipe_id);
                date = Some(entry.details.date);
                changed = true;
            }
        }
        if changed {
            self.after_mutation(menu_id, date);
        }
    }

    pub fn update_recipe_scaling(&self, menu_id: &str, recipe_id: &str, scaling_factor: f64) {
        self.patch_recipe(menu_id, recipe_id, "update_recipe_scaling", |recipe| {
            recipe.scaling_factor = scaling_factor;
        });
    }

    pub fn update_recipe(&self, menu_id: &str, recipe_id: &str, patch: &RecipePatch) {
        self.patch_recipe(menu_id, recipe_id, "update_recipe", |recipe| {
            if let Some(name) = &patch.name {
                recipe.name = name.clone();
            }
            if let Some(dish_type) = &patch.dish_type {
                recipe.dish_type = dish_type.clone();
            }
            if let Some(serving_quantity) = patch.serving_quantity {
                recipe.serving_quantity = serving_quantity;
            }
            if let Some(instructions) = &patch.instructions {
                recipe.instructions = instructions.clone();
            }
        });
    }

    pub fn update_recipe_ingredients(
        &self,
        menu_id: &str,
        recipe_id: &str,
        ingredients: Vec<Ingredient>,
    ) {
        self.patch_recipe(menu_id, recipe_id, "update_recipe_ingredients", |recipe| {
            recipe.ingredients = ingredients;
        });
    }

    fn patch_recipe<F>(&self, menu_id: &str, recipe_id: &str, op: &'static str, apply: F)
    where
        F: FnOnce(&mut RecipeEntry),
    {
        let mut date = None;
        let mut changed = false;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, op);
            if let Some(entry) = state.entries.get_mut(menu_id) {
                if let Some(recipe) = entry.recipes.iter_mut().find(|r| r.id == recipe_id) {
                    apply(recipe);
                    changed = true;
                }
                date = Some(entry.details.date);
            }
        }
        if changed {
            self.after_mutation(menu_id, date);
        }
    }

    pub fn clear_menu(&self, menu_id: &str) {
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "clear_menu");
            state.entries.remove(menu_id);
            state.errors.remove(menu_id);
        }
        self.inner.persist();
    }

    pub fn clear(&self) {
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "clear");
            *state = MenuDetailState::default();
        }
        self.inner.storage.remove(keys::MENU_DETAIL_SNAPSHOT);
        self.inner.flights.clear();
    }

    fn after_mutation(&self, menu_id: &str, date: Option<NaiveDate>) {
        self.inner.persist();
        self.inner.events.publish(EventKind::MenuDetailChanged {
            menu_id: menu_id.to_owned(),
            date,
        });
    }
}

impl MenuDetailInner {
    async fn fetch(inner: Arc<Self>, menu_id: String) -> Result<(), ApiError> {
        let result = load_entry(&inner, &menu_id).await;
        match result {
            Ok(entry) => {
                {
                    let mut state = rw_write(&inner.state, SOURCE, "fetch.store");
                    state.entries.insert(menu_id.clone(), entry);
                    state.errors.remove(&menu_id);
                }
                inner.persist();
                Ok(())
            }
            Err(error) => {
                counter!("larder_store_fetch_error_total").increment(1);
                {
                    let mut state = rw_write(&inner.state, SOURCE, "fetch.error");
                    // The entry stays absent so a later ensure retries.
                    state.errors.insert(menu_id.clone(), error.to_string());
                }
                inner.persist();
                Err(error)
            }
        }
    }

    fn persist(&self) {
        let snapshot = {
            let state = rw_read(&self.state, SOURCE, "persist");
            MenuDetailSnapshot {
                entries: state.entries.clone(),
                errors: state.errors.clone(),
            }
        };
        match serde_json::to_string(&snapshot) {
            Ok(json) => self.storage.set(keys::MENU_DETAIL_SNAPSHOT, json),
            Err(error) => warn!(%error, "failed to serialize menu detail snapshot"),
        }
    }
}

async fn load_entry(inner: &MenuDetailInner, menu_id: &str) -> Result<MenuDetailEntry, ApiError> {
    let details = inner.backend.menus.menu_details(menu_id).await?;
    let owner_username = inner.usernames.resolve(&details.owner).await;

    let recipe_map = inner.backend.menus.recipes_in_menu(menu_id).await?;
    let fetches = recipe_map
        .into_iter()
        .map(|(recipe_id, scaling_factor)| async move {
            let (details, ingredients) = try_join(
                inner.backend.cook_book.recipe_details(&recipe_id),
                inner.backend.cook_book.recipe_ingredients(&recipe_id),
            )
            .await?;
            Ok::<RecipeEntry, ApiError>(RecipeEntry {
                id: recipe_id,
                name: details.name,
                dish_type: details.dish_type,
                serving_quantity: details.serving_quantity,
                instructions: details.instructions,
                scaling_factor,
                ingredients: ingredients
                    .into_iter()
                    .map(|dto| Ingredient {
                        name: dto.name,
                        quantity: dto.quantity,
                        units: dto.units,
                    })
                    .collect(),
            })
        });
    let recipes = join_all(fetches)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MenuDetailEntry {
        details: MenuDetails {
            name: details.name,
            date: details.date,
            owner: details.owner,
        },
        owner_username,
        recipes,
    })
}
