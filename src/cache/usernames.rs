//! Shared user-id → display-name cache.
//!
//! Write-through and bounded; every store that needs an owner's display
//! name resolves it here so a user is looked up at most once per session.
//! A failed lookup falls back to the raw id, and the fallback is cached so
//! a broken id is not re-fetched on every render.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use metrics::counter;
use tracing::warn;

use super::lock::mutex_lock;
use crate::api::Backend;

const SOURCE: &str = "cache::usernames";
const DEFAULT_CAPACITY: usize = 256;

pub struct UsernameCache {
    backend: Arc<Backend>,
    names: Mutex<LruCache<String, String>>,
}

impl UsernameCache {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self::with_capacity(
            backend,
            NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        )
    }

    pub fn with_capacity(backend: Arc<Backend>, capacity: NonZeroUsize) -> Self {
        Self {
            backend,
            names: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The cached name, without network I/O.
    pub fn cached(&self, user_id: &str) -> Option<String> {
        mutex_lock(&self.names, SOURCE, "cached")
            .get(user_id)
            .cloned()
    }

    /// Seed a known name (e.g. the session user's own).
    pub fn insert(&self, user_id: &str, username: &str) {
        mutex_lock(&self.names, SOURCE, "insert").put(user_id.to_owned(), username.to_owned());
    }

    /// The display name for `user_id`, fetched once and cached. Falls back
    /// to the raw id when the lookup fails.
    pub async fn resolve(&self, user_id: &str) -> String {
        if let Some(name) = self.cached(user_id) {
            counter!("larder_store_hit_total").increment(1);
            return name;
        }
        match self.backend.auth.username(user_id).await {
            Ok(name) => {
                self.insert(user_id, &name);
                name
            }
            Err(error) => {
                warn!(user_id, %error, "username lookup failed; falling back to id");
                self.insert(user_id, user_id);
                user_id.to_owned()
            }
        }
    }

    pub fn clear(&self) {
        mutex_lock(&self.names, SOURCE, "clear").clear();
    }
}
