//! `MenuCollection` aggregate shapes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCreateRequest {
    pub name: String,
    pub date: NaiveDate,
    pub acting_user: String,
}

/// Partial update; only the populated fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MenuUpdateRequest {
    pub menu: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRecipeRequest {
    pub menu: String,
    pub recipe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_factor: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeScalingRequest {
    pub menu: String,
    pub recipe: String,
    pub new_scaling_factor: f64,
}

/// Body for endpoints addressing a single menu by id.
#[derive(Debug, Clone, Serialize)]
pub struct MenuRequest {
    pub menu: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuCreatedResponse {
    pub menu: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuDetailsResponse {
    pub name: String,
    #[serde(deserialize_with = "crate::de::calendar_date")]
    pub date: NaiveDate,
    pub owner: String,
}

/// Recipe id → scaling factor for one menu.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipesInMenuResponse {
    #[serde(default)]
    pub menu_recipes: BTreeMap<String, f64>,
}

/// One row of the `_getMenusOwnedByUser` row set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenusOwnedRow {
    #[serde(default, deserialize_with = "crate::de::id_list")]
    pub menus: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuByDateResponse {
    #[serde(default)]
    pub menu: Option<String>,
}
