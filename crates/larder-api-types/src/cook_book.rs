//! `CookBook` aggregate shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct RecipeCreateRequest {
    pub name: String,
    pub user: String,
}

/// Partial update; only the populated fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeUpdateRequest {
    pub recipe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dish_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDuplicateRequest {
    pub original_recipe: String,
    pub user: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientWriteRequest {
    pub recipe: String,
    pub name: String,
    pub quantity: f64,
    pub units: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientRemoveRequest {
    pub recipe: String,
    pub name: String,
}

/// Body for endpoints addressing a single recipe by id.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeRequest {
    pub recipe: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeCreatedResponse {
    pub recipe: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailsResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dish_type: String,
    #[serde(default)]
    pub serving_quantity: f64,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct IngredientDto {
    pub name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub units: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeIngredientsResponse {
    #[serde(default)]
    pub ingredients: Vec<IngredientDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipesOwnedResponse {
    #[serde(default, deserialize_with = "crate::de::id_list")]
    pub recipes: Vec<String>,
}
