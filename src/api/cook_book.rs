//! `CookBook` aggregate service.

use std::sync::Arc;

use larder_api_types::cook_book::{
    IngredientDto, IngredientRemoveRequest, IngredientWriteRequest, RecipeCreateRequest,
    RecipeCreatedResponse, RecipeDetailsResponse, RecipeDuplicateRequest,
    RecipeIngredientsResponse, RecipeRequest, RecipeUpdateRequest, RecipesOwnedResponse,
};
use tracing::warn;

use crate::rpc::{ApiError, RpcClient};

pub struct CookBookApi {
    rpc: Arc<RpcClient>,
}

impl CookBookApi {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Returns the new recipe's id.
    pub async fn create_recipe(&self, name: &str, user: &str) -> Result<String, ApiError> {
        let request = RecipeCreateRequest {
            name: name.to_owned(),
            user: user.to_owned(),
        };
        let response: RecipeCreatedResponse = self
            .rpc
            .call("CookBook/createRecipe", &request)
            .await
            .inspect_err(|error| warn!(user, %error, "create recipe failed"))?;
        Ok(response.recipe)
    }

    pub async fn update_recipe(&self, request: &RecipeUpdateRequest) -> Result<(), ApiError> {
        self.rpc
            .call_ack("CookBook/updateRecipe", request)
            .await
            .inspect_err(|error| warn!(recipe = %request.recipe, %error, "update recipe failed"))
    }

    /// Returns the copied recipe's id.
    pub async fn duplicate_recipe(
        &self,
        original_recipe: &str,
        user: &str,
        new_name: &str,
    ) -> Result<String, ApiError> {
        let request = RecipeDuplicateRequest {
            original_recipe: original_recipe.to_owned(),
            user: user.to_owned(),
            new_name: new_name.to_owned(),
        };
        let response: RecipeCreatedResponse = self
            .rpc
            .call("CookBook/duplicateRecipe", &request)
            .await
            .inspect_err(|error| warn!(original_recipe, %error, "duplicate recipe failed"))?;
        Ok(response.recipe)
    }

    pub async fn add_ingredient(
        &self,
        recipe: &str,
        name: &str,
        quantity: f64,
        units: &str,
    ) -> Result<(), ApiError> {
        let request = IngredientWriteRequest {
            recipe: recipe.to_owned(),
            name: name.to_owned(),
            quantity,
            units: units.to_owned(),
        };
        self.rpc
            .call_ack("CookBook/addRecipeIngredient", &request)
            .await
            .inspect_err(|error| warn!(recipe, name, %error, "add ingredient failed"))
    }

    pub async fn update_ingredient(
        &self,
        recipe: &str,
        name: &str,
        quantity: f64,
        units: &str,
    ) -> Result<(), ApiError> {
        let request = IngredientWriteRequest {
            recipe: recipe.to_owned(),
            name: name.to_owned(),
            quantity,
            units: units.to_owned(),
        };
        self.rpc
            .call_ack("CookBook/updateRecipeIngredient", &request)
            .await
            .inspect_err(|error| warn!(recipe, name, %error, "update ingredient failed"))
    }

    pub async fn remove_ingredient(&self, recipe: &str, name: &str) -> Result<(), ApiError> {
        let request = IngredientRemoveRequest {
            recipe: recipe.to_owned(),
            name: name.to_owned(),
        };
        self.rpc
            .call_ack("CookBook/removeRecipeIngredient", &request)
            .await
            .inspect_err(|error| warn!(recipe, name, %error, "remove ingredient failed"))
    }

    pub async fn recipe_details(&self, recipe: &str) -> Result<RecipeDetailsResponse, ApiError> {
        let request = RecipeRequest {
            recipe: recipe.to_owned(),
        };
        self.rpc
            .call("CookBook/_getRecipeDetails", &request)
            .await
            .inspect_err(|error| warn!(recipe, %error, "recipe details lookup failed"))
    }

    pub async fn recipe_ingredients(&self, recipe: &str) -> Result<Vec<IngredientDto>, ApiError> {
        let request = RecipeRequest {
            recipe: recipe.to_owned(),
        };
        let response: RecipeIngredientsResponse = self
            .rpc
            .call("CookBook/_getRecipeIngredients", &request)
            .await
            .inspect_err(|error| warn!(recipe, %error, "recipe ingredients lookup failed"))?;
        Ok(response.ingredients)
    }

    pub async fn recipes_owned_by_user(&self, user: &str) -> Result<Vec<String>, ApiError> {
        let request = larder_api_types::auth::UserRequest {
            user: user.to_owned(),
        };
        let response: RecipesOwnedResponse = self
            .rpc
            .call("CookBook/_getRecipesOwnedByUser", &request)
            .await
            .inspect_err(|error| warn!(user, %error, "owned recipes lookup failed"))?;
        Ok(response.recipes)
    }
}
