//! Menu-list mirror.
//!
//! Holds the card-level menu summaries for one resident user at a time,
//! resorted newest-date-first after every mutation, plus the list of all
//! users for the share pickers. Owner display names go through the shared
//! username cache so they are looked up once per session. In-memory only;
//! the detail store owns durable state.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use futures::future::{join_all, try_join};
use metrics::counter;
use tracing::debug;

use super::events::{EventKind, EventQueue};
use super::flight::FlightTable;
use super::lock::{rw_read, rw_write};
use super::usernames::UsernameCache;
use crate::api::Backend;
use crate::domain::types::MenuSummary;
use crate::rpc::ApiError;

const SOURCE: &str = "cache::menus";

/// Field-wise patch for a cached menu summary.
#[derive(Debug, Clone, Default)]
pub struct MenuPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub recipe_count: Option<usize>,
}

/// A user row for the share pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MenusFlightKey {
    Menus(String),
    Users,
}

#[derive(Default)]
struct MenusState {
    menus: Vec<MenuSummary>,
    current_user: Option<String>,
    loaded: bool,
    error: Option<String>,
    users: Vec<UserEntry>,
    users_loaded: bool,
}

struct MenusInner {
    backend: Arc<Backend>,
    events: Arc<EventQueue>,
    usernames: Arc<UsernameCache>,
    state: RwLock<MenusState>,
    flights: FlightTable<MenusFlightKey>,
}

#[derive(Clone)]
pub struct MenusStore {
    inner: Arc<MenusInner>,
}

impl MenusStore {
    pub fn new(
        backend: Arc<Backend>,
        events: Arc<EventQueue>,
        usernames: Arc<UsernameCache>,
    ) -> Self {
        Self {
            inner: Arc::new(MenusInner {
                backend,
                events,
                usernames,
                state: RwLock::new(MenusState::default()),
                flights: FlightTable::new(),
            }),
        }
    }

    /// Loads `user_id`'s menus unless that user is already resident;
    /// switching users always reloads.
    pub async fn ensure_loaded(&self, user_id: &str) -> Result<(), ApiError> {
        {
            let state = rw_read(&self.inner.state, SOURCE, "ensure_loaded");
            if state.loaded && state.current_user.as_deref() == Some(user_id) {
                counter!("larder_store_hit_total").increment(1);
                return Ok(());
            }
        }
        self.load(user_id).await
    }

    /// Discards the cached list immediately and re-runs the fetch.
    pub async fn refresh(&self, user_id: &str) -> Result<(), ApiError> {
        counter!("larder_store_refresh_total").increment(1);
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "refresh");
            state.menus.clear();
            state.loaded = false;
        }
        let key = MenusFlightKey::Menus(user_id.to_owned());
        self.inner.flights.forget(&key);
        self.load(user_id).await
    }

    async fn load(&self, user_id: &str) -> Result<(), ApiError> {
        let inner = Arc::clone(&self.inner);
        let user = user_id.to_owned();
        self.inner
            .flights
            .run(MenusFlightKey::Menus(user_id.to_owned()), async move {
                MenusInner::fetch_menus(inner, user).await
            })
            .await
    }

    /// Loads the all-users list once; `exclude_user` (normally the session
    /// user) is filtered out of the cached list.
    pub async fn ensure_users_loaded(&self, exclude_user: Option<&str>) -> Result<(), ApiError> {
        if rw_read(&self.inner.state, SOURCE, "ensure_users_loaded").users_loaded {
            counter!("larder_store_hit_total").increment(1);
            return Ok(());
        }
        self.load_users(exclude_user).await
    }

    pub async fn refresh_users(&self, exclude_user: Option<&str>) -> Result<(), ApiError> {
        counter!("larder_store_refresh_total").increment(1);
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "refresh_users");
            state.users.clear();
            state.users_loaded = false;
        }
        self.inner.flights.forget(&MenusFlightKey::Users);
        self.load_users(exclude_user).await
    }

    async fn load_users(&self, exclude_user: Option<&str>) -> Result<(), ApiError> {
        let inner = Arc::clone(&self.inner);
        let exclude = exclude_user.map(str::to_owned);
        self.inner
            .flights
            .run(MenusFlightKey::Users, async move {
                MenusInner::fetch_users(inner, exclude).await
            })
            .await
    }

    pub fn menus(&self) -> Vec<MenuSummary> {
        rw_read(&self.inner.state, SOURCE, "menus").menus.clone()
    }

    pub fn find_menu(&self, menu_id: &str) -> Option<MenuSummary> {
        rw_read(&self.inner.state, SOURCE, "find_menu")
            .menus
            .iter()
            .find(|menu| menu.id == menu_id)
            .cloned()
    }

    pub fn users(&self) -> Vec<UserEntry> {
        rw_read(&self.inner.state, SOURCE, "users").users.clone()
    }

    pub fn current_user(&self) -> Option<String> {
        rw_read(&self.inner.state, SOURCE, "current_user")
            .current_user
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        rw_read(&self.inner.state, SOURCE, "is_loaded").loaded
    }

    pub fn is_users_loaded(&self) -> bool {
        rw_read(&self.inner.state, SOURCE, "is_users_loaded").users_loaded
    }

    pub fn is_loading(&self, user_id: &str) -> bool {
        self.inner
            .flights
            .contains(&MenusFlightKey::Menus(user_id.to_owned()))
    }

    pub fn error(&self) -> Option<String> {
        rw_read(&self.inner.state, SOURCE, "error").error.clone()
    }

    // Mutations assume the corresponding remote call already succeeded.

    /// Inserts a summary and re-sorts; the owner's display name is resolved
    /// into the shared cache so later reads are local.
    pub async fn add_menu(&self, menu: MenuSummary) {
        let menu_id = menu.id.clone();
        let date = menu.date;
        let owner = menu.owner.clone();
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "add_menu");
            state.menus.push(menu);
            sort_menus(&mut state.menus);
        }
        self.inner.usernames.resolve(&owner).await;
        self.inner.events.publish(EventKind::MenuUpserted {
            menu_id,
            date: Some(date),
        });
    }

    pub fn update_menu(&self, menu_id: &str, patch: &MenuPatch) {
        let mut date = None;
        let mut changed = false;
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "update_menu");
            if let Some(menu) = state.menus.iter_mut().find(|m| m.id == menu_id) {
                if let Some(name) = &patch.name {
                    menu.name = name.clone();
                }
                if let Some(new_date) = patch.date {
                    menu.date = new_date;
                }
                if let Some(count) = patch.recipe_count {
                    menu.recipe_count = count;
                }
                date = Some(menu.date);
                changed = true;
            }
            if changed {
                sort_menus(&mut state.menus);
            }
        }
        if changed {
            self.inner.events.publish(EventKind::MenuUpserted {
                menu_id: menu_id.to_owned(),
                date,
            });
        }
    }

    pub fn remove_menu(&self, menu_id: &str) {
        {
            let mut state = rw_write(&self.inner.state, SOURCE, "remove_menu");
            state.menus.retain(|menu| menu.id != menu_id);
        }
        self.inner.events.publish(EventKind::MenuRemoved {
            menu_id: menu_id.to_owned(),
        });
    }

    pub fn clear(&self) {
        let mut state = rw_write(&self.inner.state, SOURCE, "clear");
        *state = MenusState::default();
    }
}

impl MenusInner {
    async fn fetch_menus(inner: Arc<Self>, user_id: String) -> Result<(), ApiError> {
        let result = load_summaries(&inner, &user_id).await;
        match result {
            Ok(menus) => {
                debug!(user_id, menus = menus.len(), "menu list loaded");
                let mut state = rw_write(&inner.state, SOURCE, "fetch_menus.store");
                state.menus = menus;
                sort_menus(&mut state.menus);
                state.loaded = true;
                state.current_user = Some(user_id.clone());
                state.error = None;
                drop(state);
                inner
                    .events
                    .publish(EventKind::MenusChanged { user_id });
                Ok(())
            }
            Err(error) => {
                counter!("larder_store_fetch_error_total").increment(1);
                rw_write(&inner.state, SOURCE, "fetch_menus.error").error =
                    Some(error.to_string());
                Err(error)
            }
        }
    }

    async fn fetch_users(inner: Arc<Self>, exclude: Option<String>) -> Result<(), ApiError> {
        let result: Result<Vec<UserEntry>, ApiError> = async {
            let user_ids = inner.backend.auth.list_users().await?;
            // Dedupe while keeping backend order.
            let mut seen = BTreeSet::new();
            let unique: Vec<String> = user_ids
                .into_iter()
                .filter(|id| seen.insert(id.clone()))
                .collect();

            let mut users = Vec::with_capacity(unique.len());
            for id in unique {
                if exclude.as_deref() == Some(id.as_str()) {
                    continue;
                }
                let username = inner.usernames.resolve(&id).await;
                users.push(UserEntry { id, username });
            }
            Ok(users)
        }
        .await;

        match result {
            Ok(users) => {
                let mut state = rw_write(&inner.state, SOURCE, "fetch_users.store");
                state.users = users;
                state.users_loaded = true;
                Ok(())
            }
            Err(error) => {
                counter!("larder_store_fetch_error_total").increment(1);
                rw_write(&inner.state, SOURCE, "fetch_users.error").error =
                    Some(error.to_string());
                Err(error)
            }
        }
    }
}

async fn load_summaries(inner: &MenusInner, user_id: &str) -> Result<Vec<MenuSummary>, ApiError> {
    let menu_ids = inner.backend.menus.menus_owned_by_user(user_id).await?;

    let fetches = menu_ids.into_iter().map(|menu_id| async move {
        let (details, recipes) = try_join(
            inner.backend.menus.menu_details(&menu_id),
            inner.backend.menus.recipes_in_menu(&menu_id),
        )
        .await?;
        Ok::<MenuSummary, ApiError>(MenuSummary {
            id: menu_id,
            name: details.name,
            date: details.date,
            owner: details.owner,
            recipe_count: recipes.len(),
        })
    });
    let menus = join_all(fetches)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    // Warm the username cache for every distinct owner.
    let owners: BTreeSet<String> = menus.iter().map(|m| m.owner.clone()).collect();
    for owner in owners {
        inner.usernames.resolve(&owner).await;
    }

    Ok(menus)
}

/// Newest date first; ties break on id for deterministic rendering.
fn sort_menus(menus: &mut [MenuSummary]) {
    menus.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, date: &str) -> MenuSummary {
        MenuSummary {
            id: id.to_owned(),
            name: format!("menu {id}"),
            date: date.parse().expect("date"),
            owner: "u1".to_owned(),
            recipe_count: 0,
        }
    }

    #[test]
    fn sort_is_date_descending() {
        let mut menus = vec![
            summary("m1", "2025-11-01"),
            summary("m2", "2025-11-20"),
            summary("m3", "2025-11-10"),
        ];
        sort_menus(&mut menus);
        let ids: Vec<&str> = menus.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m3", "m1"]);
    }

    #[test]
    fn sort_breaks_date_ties_by_id() {
        let mut menus = vec![summary("mb", "2025-11-10"), summary("ma", "2025-11-10")];
        sort_menus(&mut menus);
        let ids: Vec<&str> = menus.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["ma", "mb"]);
    }
}
