//! `MenuCollection` aggregate service.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use larder_api_types::menu_collection::{
    DateRequest, MenuByDateResponse, MenuCreateRequest, MenuCreatedResponse, MenuDetailsResponse,
    MenuRecipeRequest, MenuRequest, MenuUpdateRequest, MenusOwnedRow, RecipeScalingRequest,
    RecipesInMenuResponse,
};
use tracing::warn;

use crate::rpc::{ApiError, RpcClient};

pub struct MenuCollectionApi {
    rpc: Arc<RpcClient>,
}

impl MenuCollectionApi {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Returns the new menu's id.
    pub async fn create_menu(
        &self,
        name: &str,
        date: NaiveDate,
        acting_user: &str,
    ) -> Result<String, ApiError> {
        let request = MenuCreateRequest {
            name: name.to_owned(),
            date,
            acting_user: acting_user.to_owned(),
        };
        let response: MenuCreatedResponse = self
            .rpc
            .call("MenuCollection/createMenu", &request)
            .await
            .inspect_err(|error| warn!(acting_user, %error, "create menu failed"))?;
        Ok(response.menu)
    }

    /// Updates the name and/or date of an existing menu.
    pub async fn update_menu(&self, request: &MenuUpdateRequest) -> Result<(), ApiError> {
        self.rpc
            .call_ack("MenuCollection/updateMenu", request)
            .await
            .inspect_err(|error| warn!(menu = %request.menu, %error, "update menu failed"))
    }

    pub async fn add_recipe(
        &self,
        menu: &str,
        recipe: &str,
        scaling_factor: f64,
    ) -> Result<(), ApiError> {
        let request = MenuRecipeRequest {
            menu: menu.to_owned(),
            recipe: recipe.to_owned(),
            scaling_factor: Some(scaling_factor),
        };
        self.rpc
            .call_ack("MenuCollection/addRecipe", &request)
            .await
            .inspect_err(|error| warn!(menu, recipe, %error, "add recipe to menu failed"))
    }

    pub async fn remove_recipe(&self, menu: &str, recipe: &str) -> Result<(), ApiError> {
        let request = MenuRecipeRequest {
            menu: menu.to_owned(),
            recipe: recipe.to_owned(),
            scaling_factor: None,
        };
        self.rpc
            .call_ack("MenuCollection/removeRecipe", &request)
            .await
            .inspect_err(|error| warn!(menu, recipe, %error, "remove recipe from menu failed"))
    }

    pub async fn change_recipe_scaling(
        &self,
        menu: &str,
        recipe: &str,
        new_scaling_factor: f64,
    ) -> Result<(), ApiError> {
        let request = RecipeScalingRequest {
            menu: menu.to_owned(),
            recipe: recipe.to_owned(),
            new_scaling_factor,
        };
        self.rpc
            .call_ack("MenuCollection/changeRecipeScaling", &request)
            .await
            .inspect_err(|error| warn!(menu, recipe, %error, "change recipe scaling failed"))
    }

    pub async fn menu_details(&self, menu: &str) -> Result<MenuDetailsResponse, ApiError> {
        let request = MenuRequest {
            menu: menu.to_owned(),
        };
        self.rpc
            .call("MenuCollection/_getMenuDetails", &request)
            .await
            .inspect_err(|error| warn!(menu, %error, "menu details lookup failed"))
    }

    /// Recipe id → scaling factor for one menu.
    pub async fn recipes_in_menu(&self, menu: &str) -> Result<BTreeMap<String, f64>, ApiError> {
        let request = MenuRequest {
            menu: menu.to_owned(),
        };
        let response: RecipesInMenuResponse = self
            .rpc
            .call("MenuCollection/_getRecipesInMenu", &request)
            .await
            .inspect_err(|error| warn!(menu, %error, "menu recipes lookup failed"))?;
        Ok(response.menu_recipes)
    }

    /// Every menu owned by `user`. The backend answers with a row set; the
    /// rows' id lists are flattened here.
    pub async fn menus_owned_by_user(&self, user: &str) -> Result<Vec<String>, ApiError> {
        let request = larder_api_types::auth::UserRequest {
            user: user.to_owned(),
        };
        let rows: Vec<MenusOwnedRow> = self
            .rpc
            .call_list("MenuCollection/_getMenusOwnedByUser", &request)
            .await
            .inspect_err(|error| warn!(user, %error, "owned menus lookup failed"))?;
        Ok(rows.into_iter().flat_map(|row| row.menus).collect())
    }

    /// The menu scheduled on `date`, from any user.
    pub async fn menu_by_date(&self, date: NaiveDate) -> Result<Option<String>, ApiError> {
        let request = DateRequest { date };
        let response: MenuByDateResponse = self
            .rpc
            .call("MenuCollection/_getMenuByDate", &request)
            .await
            .inspect_err(|error| warn!(%date, %error, "menu by date lookup failed"))?;
        Ok(response.menu)
    }
}
