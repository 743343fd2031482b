//! `StoreCatalog` aggregate shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCreateRequest {
    pub primary_name: String,
}

/// Body for endpoints addressing a single item by id.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRequest {
    pub item: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemNameRequest {
    pub item: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOptionAddRequest {
    pub item: String,
    pub quantity: f64,
    pub units: String,
    pub price: f64,
    pub store: String,
}

/// Single-field purchase-option update; exactly one optional field is set
/// per call.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOptionUpdateRequest {
    pub purchase_option: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOptionRemoveRequest {
    pub item: String,
    pub purchase_option: String,
}

/// Body for endpoints addressing a single purchase option by id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOptionRequest {
    pub purchase_option: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemCreatedResponse {
    pub item: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllItemsResponse {
    #[serde(default, deserialize_with = "crate::de::id_list")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemLookupResponse {
    #[serde(default)]
    pub item: Option<String>,
}

/// The item's primary display name plus any alternative names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemNamesResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::de::id_list")]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPurchaseOptionsResponse {
    #[serde(default, deserialize_with = "crate::de::id_list")]
    pub purchase_options: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseOptionCreatedResponse {
    #[serde(rename = "purchaseOption")]
    pub purchase_option: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOptionDetailsResponse {
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub units: String,
    #[serde(default, deserialize_with = "crate::de::lenient_price")]
    pub price: f64,
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub confirmed: bool,
}
