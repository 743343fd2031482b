//! Stateless typed services, one per backend aggregate.
//!
//! Each method maps 1:1 to an RPC endpoint: build the request DTO, make
//! exactly one call through the shared [`RpcClient`], unwrap the typed
//! response, and on failure log diagnostic context and rethrow. No caching
//! happens here; that is the stores' job.

mod auth;
mod cook_book;
pub mod costs;
mod instacart;
mod menu_collection;
mod purchase_system;
mod store_catalog;
mod weekly_cart;

use std::sync::Arc;

use crate::config::Settings;
use crate::infra::storage::SessionStorage;
use crate::rpc::{ApiError, RpcClient};

pub use auth::AuthApi;
pub use cook_book::CookBookApi;
pub use instacart::{InstacartApi, ShoppingListOptions};
pub use menu_collection::MenuCollectionApi;
pub use purchase_system::PurchaseSystemApi;
pub use store_catalog::StoreCatalogApi;
pub use weekly_cart::WeeklyCartApi;

/// One instance of every resource service over a shared RPC client.
pub struct Backend {
    pub auth: AuthApi,
    pub cook_book: CookBookApi,
    pub menus: MenuCollectionApi,
    pub catalog: StoreCatalogApi,
    pub purchases: PurchaseSystemApi,
    pub carts: WeeklyCartApi,
    pub instacart: InstacartApi,
}

impl Backend {
    pub fn new(rpc: Arc<RpcClient>) -> Arc<Self> {
        Arc::new(Self {
            auth: AuthApi::new(Arc::clone(&rpc)),
            cook_book: CookBookApi::new(Arc::clone(&rpc)),
            menus: MenuCollectionApi::new(Arc::clone(&rpc)),
            catalog: StoreCatalogApi::new(Arc::clone(&rpc)),
            purchases: PurchaseSystemApi::new(Arc::clone(&rpc)),
            carts: WeeklyCartApi::new(Arc::clone(&rpc)),
            instacart: InstacartApi::new(rpc),
        })
    }

    pub fn from_settings(
        settings: &Settings,
        storage: Arc<SessionStorage>,
    ) -> Result<Arc<Self>, ApiError> {
        let rpc = RpcClient::new(
            settings.backend.origin.clone(),
            settings.backend.timeout,
            storage,
        )?;
        Ok(Self::new(Arc::new(rpc)))
    }
}
