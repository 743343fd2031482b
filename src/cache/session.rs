//! Authentication session store.
//!
//! Holds the singleton session mirror: who is logged in, whether they are
//! an admin (tri-state, resolved lazily), and the last auth error. The
//! session and its bearer token persist under well-known storage keys and
//! are restored verbatim at startup; logout removes them and signals every
//! other store to clear.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::{debug, info};

use super::events::{EventKind, EventQueue};
use super::lock::{rw_read, rw_write};
use crate::api::Backend;
use crate::domain::types::{AdminStatus, Session};
use crate::infra::storage::{SessionStorage, keys};
use crate::rpc::ApiError;

const SOURCE: &str = "cache::session";

#[derive(Default)]
struct SessionState {
    session: Option<Session>,
    admin: AdminStatus,
    loading: bool,
    error: Option<String>,
}

pub struct SessionStore {
    backend: Arc<Backend>,
    storage: Arc<SessionStorage>,
    events: Arc<EventQueue>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Restores any persisted session from storage.
    pub fn new(
        backend: Arc<Backend>,
        storage: Arc<SessionStorage>,
        events: Arc<EventQueue>,
    ) -> Self {
        let mut state = SessionState::default();
        if let Some(raw) = storage.get(keys::SESSION) {
            match serde_json::from_str::<Session>(&raw) {
                Ok(session) if storage.get(keys::SESSION_TOKEN).is_some() => {
                    debug!(user_id = %session.id, "restored session from storage");
                    state.session = Some(session);
                    if let Some(flag) = storage.get(keys::ADMIN_FLAG) {
                        state.admin = AdminStatus::from_storage_str(&flag);
                    }
                }
                _ => {
                    // Partial or corrupt persisted state is dropped wholesale.
                    storage.remove(keys::SESSION);
                    storage.remove(keys::SESSION_TOKEN);
                    storage.remove(keys::ADMIN_FLAG);
                }
            }
        }
        Self {
            backend,
            storage,
            events,
            state: RwLock::new(state),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        self.authenticate_with(username, password, false).await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        self.authenticate_with(username, password, true).await
    }

    async fn authenticate_with(
        &self,
        username: &str,
        password: &str,
        register: bool,
    ) -> Result<Session, ApiError> {
        {
            let mut state = rw_write(&self.state, SOURCE, "authenticate.start");
            state.loading = true;
            state.error = None;
        }

        let result = if register {
            self.backend.auth.register(username, password).await
        } else {
            self.backend.auth.authenticate(username, password).await
        };
        let mut state = rw_write(&self.state, SOURCE, "authenticate.finish");
        state.loading = false;
        match result {
            Ok(user_id) => {
                let session = Session {
                    id: user_id,
                    username: username.to_owned(),
                    login_time: Utc::now().to_rfc3339(),
                };
                state.session = Some(session.clone());
                state.admin = AdminStatus::Unknown;
                state.error = None;
                drop(state);

                self.persist(&session);
                info!(user_id = %session.id, "session started");
                self.events.publish(EventKind::SessionStarted {
                    user_id: session.id.clone(),
                });
                Ok(session)
            }
            Err(error) => {
                state.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Ends the session: storage keys are removed and `SessionEnded` is
    /// published so the consumer clears every other store.
    pub fn logout(&self) {
        {
            let mut state = rw_write(&self.state, SOURCE, "logout");
            state.session = None;
            state.admin = AdminStatus::Unknown;
            state.error = None;
        }
        self.storage.remove(keys::SESSION);
        self.storage.remove(keys::SESSION_TOKEN);
        self.storage.remove(keys::ADMIN_FLAG);
        info!("session ended");
        self.events.publish(EventKind::SessionEnded);
    }

    pub async fn update_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let user_id = self
            .user_id()
            .ok_or_else(|| ApiError::validation("no user logged in"))?;

        {
            let mut state = rw_write(&self.state, SOURCE, "update_password.start");
            state.loading = true;
            state.error = None;
        }
        let result = self
            .backend
            .auth
            .update_password(&user_id, old_password, new_password)
            .await;
        let mut state = rw_write(&self.state, SOURCE, "update_password.finish");
        state.loading = false;
        match result {
            Ok(true) => Ok(()),
            Ok(false) => {
                let error = ApiError::validation("password update failed");
                state.error = Some(error.to_string());
                Err(error)
            }
            Err(error) => {
                state.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Resolves the admin flag once and caches the answer; subsequent calls
    /// are local. A failed check leaves the flag unknown so it can be
    /// retried.
    pub async fn ensure_admin(&self) -> Result<bool, ApiError> {
        if let Some(known) = self.admin_status().is_admin() {
            return Ok(known);
        }
        let user_id = self
            .user_id()
            .ok_or_else(|| ApiError::validation("no user logged in"))?;

        let is_admin = self.backend.auth.is_user_admin(&user_id).await?;
        let status = AdminStatus::from_flag(is_admin);
        rw_write(&self.state, SOURCE, "ensure_admin").admin = status;
        if let Some(flag) = status.as_storage_str() {
            self.storage.set(keys::ADMIN_FLAG, flag);
        }
        Ok(is_admin)
    }

    pub async fn test_connection(&self) -> bool {
        self.backend.auth.test_connection().await
    }

    fn persist(&self, session: &Session) {
        match serde_json::to_string(session) {
            Ok(json) => {
                self.storage.set(keys::SESSION, json);
                self.storage.set(keys::SESSION_TOKEN, session.id.clone());
            }
            Err(error) => {
                tracing::warn!(%error, "failed to serialize session");
            }
        }
    }

    pub fn session(&self) -> Option<Session> {
        rw_read(&self.state, SOURCE, "session").session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        rw_read(&self.state, SOURCE, "is_authenticated")
            .session
            .is_some()
    }

    pub fn user_id(&self) -> Option<String> {
        rw_read(&self.state, SOURCE, "user_id")
            .session
            .as_ref()
            .map(|s| s.id.clone())
    }

    pub fn username(&self) -> Option<String> {
        rw_read(&self.state, SOURCE, "username")
            .session
            .as_ref()
            .map(|s| s.username.clone())
    }

    pub fn admin_status(&self) -> AdminStatus {
        rw_read(&self.state, SOURCE, "admin_status").admin
    }

    pub fn is_loading(&self) -> bool {
        rw_read(&self.state, SOURCE, "is_loading").loading
    }

    pub fn error(&self) -> Option<String> {
        rw_read(&self.state, SOURCE, "error").error.clone()
    }
}
