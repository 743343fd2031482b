//! Shopping-list export service.

use std::sync::Arc;

use larder_api_types::instacart::{ShoppingListRequest, ShoppingListResponse};
use tracing::warn;

use crate::domain::export::{CartIngredient, to_line_items};
use crate::rpc::{ApiError, RpcClient};

/// Options for a shopping-list export.
#[derive(Debug, Clone)]
pub struct ShoppingListOptions {
    pub title: String,
    /// Week-start date string used for the provider's linkback URL.
    pub week_start: String,
    pub linkback_origin: String,
}

pub struct InstacartApi {
    rpc: Arc<RpcClient>,
}

impl InstacartApi {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Converts the cart's ingredients into provider line items and creates
    /// a shopping list through the backend; returns the list URL.
    ///
    /// An empty line-item list is a local validation failure: no request is
    /// made.
    pub async fn create_shopping_list(
        &self,
        ingredients: &[CartIngredient],
        options: &ShoppingListOptions,
    ) -> Result<String, ApiError> {
        let line_items =
            to_line_items(ingredients).map_err(|err| ApiError::validation(err.to_string()))?;

        let request = ShoppingListRequest {
            title: options.title.clone(),
            week_start: options.week_start.clone(),
            linkback_origin: options.linkback_origin.clone(),
            line_items,
        };
        let response: ShoppingListResponse = self
            .rpc
            .call("Instacart/createShoppingList", &request)
            .await
            .inspect_err(|error| warn!(%error, "shopping list export failed"))?;
        Ok(response.url)
    }
}
