//! `PurchaseSystem` aggregate shapes.
//!
//! Orders are opaque to the client; the backend owns the least-cost
//! optimization and cost rollups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociateRequest {
    #[serde(rename = "associateID")]
    pub associate_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicOrderCreateRequest {
    pub select_order: String,
    #[serde(rename = "associateID")]
    pub associate_id: String,
    pub quantity: f64,
    pub units: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicOrderDeleteRequest {
    pub select_order: String,
    pub atomic_order: String,
}

/// Partial update; only the populated fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicOrderUpdateRequest {
    pub atomic_order: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeMemberRequest {
    pub composite_order: String,
    pub select_order: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_factor: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeSubOrderRequest {
    pub parent_order: String,
    pub child_order: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubOrderScaleRequest {
    pub parent_order: String,
    pub child_order: String,
    pub new_scale_factor: f64,
}

/// Body for endpoints addressing a single composite order by id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeOrderRequest {
    pub composite_order: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalPurchaseRequest {
    pub composite_orders: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOrderCreatedResponse {
    pub select_order: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicOrderCreatedResponse {
    pub atomic_order: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeOrderCreatedResponse {
    pub composite_order: String,
}

/// Reference to an order document; only the id is consumed client-side.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRef {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderByAssociateResponse {
    #[serde(default)]
    pub order: Option<OrderRef>,
}

/// Purchase-option id → units to buy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalPurchaseResponse {
    #[serde(default)]
    pub optimal_purchase: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCostResponse {
    #[serde(default)]
    pub total_cost: Option<f64>,
}
