//! `Instacart` shopping-list export shapes.

use serde::{Deserialize, Serialize};

/// One exported shopping-list line. `display_text` is the pre-composed
/// `"<name> <quantity> <unit>"` string shown by the list provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub display_text: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListRequest {
    pub title: String,
    pub week_start: String,
    pub linkback_origin: String,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShoppingListResponse {
    pub url: String,
}
