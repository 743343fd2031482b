//! Durable client-session storage.
//!
//! A flat string key → string value map standing in for the browser-style
//! session storage the backend's clients persist into. Optionally backed by
//! a directory (one file per key): existing values are rehydrated verbatim
//! at startup, and every write lands on disk before returning. Write
//! failures are logged and swallowed so persistence problems never break an
//! otherwise-successful mutation.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

/// Well-known storage keys shared with the backend's other clients.
pub mod keys {
    pub const SESSION: &str = "larder_session";
    pub const SESSION_TOKEN: &str = "larder_session_token";
    pub const ADMIN_FLAG: &str = "larder_admin_flag";
    pub const CATALOG_SNAPSHOT: &str = "larder_catalog_snapshot";
    pub const MENU_DETAIL_SNAPSHOT: &str = "larder_menu_detail_snapshot";
}

pub struct SessionStorage {
    entries: RwLock<HashMap<String, String>>,
    dir: Option<PathBuf>,
}

impl SessionStorage {
    /// Storage that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            dir: None,
        }
    }

    /// Directory-backed storage; any files already present are loaded as
    /// entries, keyed by file name.
    pub fn open(dir: PathBuf) -> Self {
        let mut entries = HashMap::new();
        match fs::create_dir_all(&dir).and_then(|()| fs::read_dir(&dir)) {
            Ok(listing) => {
                for entry in listing.flatten() {
                    let path = entry.path();
                    if !path.is_file() {
                        continue;
                    }
                    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    match fs::read_to_string(&path) {
                        Ok(value) => {
                            entries.insert(name.to_owned(), value);
                        }
                        Err(error) => {
                            warn!(key = name, %error, "failed to rehydrate storage entry");
                        }
                    }
                }
            }
            Err(error) => {
                warn!(dir = %dir.display(), %error, "failed to open storage directory");
            }
        }
        debug!(dir = %dir.display(), entries = entries.len(), "session storage opened");
        Self {
            entries: RwLock::new(entries),
            dir: Some(dir),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(dir) = &self.dir {
            let path = dir.join(key);
            if let Err(error) = fs::write(&path, &value) {
                warn!(key, %error, "failed to persist storage entry");
            }
        }
        self.write().insert(key.to_owned(), value);
    }

    pub fn remove(&self, key: &str) {
        if let Some(dir) = &self.dir {
            let path = dir.join(key);
            if path.exists()
                && let Err(error) = fs::remove_file(&path)
            {
                warn!(key, %error, "failed to remove storage entry");
            }
        }
        self.write().remove(key);
    }

    /// Drop every entry (and its backing file). Used at logout.
    pub fn clear(&self) {
        let mut entries = self.write();
        if let Some(dir) = &self.dir {
            for key in entries.keys() {
                let path = dir.join(key);
                if path.exists()
                    && let Err(error) = fs::remove_file(&path)
                {
                    warn!(key, %error, "failed to remove storage entry");
                }
            }
        }
        entries.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("session storage lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("session storage lock poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_roundtrip() {
        let storage = SessionStorage::in_memory();
        assert!(storage.get(keys::SESSION_TOKEN).is_none());

        storage.set(keys::SESSION_TOKEN, "tok-1");
        assert_eq!(storage.get(keys::SESSION_TOKEN).as_deref(), Some("tok-1"));

        storage.remove(keys::SESSION_TOKEN);
        assert!(storage.get(keys::SESSION_TOKEN).is_none());
    }

    #[test]
    fn file_backed_rehydrates_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");

        {
            let storage = SessionStorage::open(dir.path().to_path_buf());
            storage.set(keys::SESSION, r#"{"id":"u1","username":"amy"}"#);
            storage.set(keys::SESSION_TOKEN, "tok-2");
        }

        let reopened = SessionStorage::open(dir.path().to_path_buf());
        assert_eq!(
            reopened.get(keys::SESSION).as_deref(),
            Some(r#"{"id":"u1","username":"amy"}"#)
        );
        assert_eq!(reopened.get(keys::SESSION_TOKEN).as_deref(), Some("tok-2"));
    }

    #[test]
    fn clear_removes_files() {
        let dir = tempfile::tempdir().expect("tempdir");

        let storage = SessionStorage::open(dir.path().to_path_buf());
        storage.set(keys::SESSION_TOKEN, "tok-3");
        storage.set(keys::ADMIN_FLAG, "true");
        storage.clear();

        assert!(storage.get(keys::SESSION_TOKEN).is_none());
        let reopened = SessionStorage::open(dir.path().to_path_buf());
        assert!(reopened.get(keys::SESSION_TOKEN).is_none());
        assert!(reopened.get(keys::ADMIN_FLAG).is_none());
    }
}
