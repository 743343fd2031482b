use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use larder::api::Backend;
use larder::cache::Stores;
use larder::domain::export::EmptyExport;
use larder::infra::storage::SessionStorage;
use larder::rpc::{ApiError, RpcClient};

use crate::args::Cli;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid backend origin: {0}")]
    BackendOrigin(#[from] url::ParseError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("not logged in (run `larder-cli auth login` first)")]
    NotLoggedIn,
    #[error(transparent)]
    Export(#[from] EmptyExport),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Everything a handler needs: the stores (for cached reads and patched
/// writes) and the raw backend (for pass-through commands).
pub struct Ctx {
    pub backend: Arc<Backend>,
    pub stores: Stores,
}

impl Ctx {
    pub fn build(cli: &Cli) -> Result<Self, CliError> {
        let storage = Arc::new(SessionStorage::open(cli.storage_dir.clone()));
        let origin = Url::parse(&cli.backend)?;
        let rpc = RpcClient::new(
            origin,
            Duration::from_secs(cli.timeout_seconds),
            Arc::clone(&storage),
        )?;
        let backend = Backend::new(Arc::new(rpc));
        let stores = Stores::new(Arc::clone(&backend), storage);
        Ok(Self { backend, stores })
    }

    /// The session user's id, required by user-scoped commands.
    pub fn user_id(&self) -> Result<String, CliError> {
        self.stores.session.user_id().ok_or(CliError::NotLoggedIn)
    }

    /// Apply pending cross-store invalidations; run after every mutation.
    pub fn settle(&self) {
        self.stores.consumer.consume_all();
    }
}
