//! `WeeklyCart` aggregate service.

use std::sync::Arc;

use chrono::NaiveDate;
use larder_api_types::weekly_cart::{
    AddMenuToCartRequest, CartDateRequest, CartDatesResponse, CartByDateResponse, CartRequest,
    CartResponse, DateInWeekRequest, MenusInCartResponse, RemoveMenuFromCartRequest,
};
use tracing::warn;

use crate::rpc::{ApiError, RpcClient};

pub struct WeeklyCartApi {
    rpc: Arc<RpcClient>,
}

impl WeeklyCartApi {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Creates the cart for the week containing `date_in_week`; returns the
    /// cart id.
    pub async fn create_cart(&self, date_in_week: NaiveDate) -> Result<String, ApiError> {
        let request = DateInWeekRequest { date_in_week };
        let response: CartResponse = self
            .rpc
            .call("WeeklyCart/createCart", &request)
            .await
            .inspect_err(|error| warn!(%date_in_week, %error, "create cart failed"))?;
        Ok(response.cart)
    }

    /// Deletes the cart for the week containing `date_in_week`; returns the
    /// deleted cart's id.
    pub async fn delete_cart(&self, date_in_week: NaiveDate) -> Result<String, ApiError> {
        let request = DateInWeekRequest { date_in_week };
        let response: CartResponse = self
            .rpc
            .call("WeeklyCart/deleteCart", &request)
            .await
            .inspect_err(|error| warn!(%date_in_week, %error, "delete cart failed"))?;
        Ok(response.cart)
    }

    /// Adds a menu to the cart of the week containing its date, creating
    /// the cart if needed; returns the cart id.
    pub async fn add_menu_to_cart(
        &self,
        menu: &str,
        menu_date: NaiveDate,
    ) -> Result<String, ApiError> {
        let request = AddMenuToCartRequest {
            menu: menu.to_owned(),
            menu_date,
        };
        let response: CartResponse = self
            .rpc
            .call("WeeklyCart/addMenuToCart", &request)
            .await
            .inspect_err(|error| warn!(menu, %menu_date, %error, "add menu to cart failed"))?;
        Ok(response.cart)
    }

    /// Removes a menu from whichever cart holds it; returns that cart's id.
    pub async fn remove_menu_from_cart(&self, menu: &str) -> Result<String, ApiError> {
        let request = RemoveMenuFromCartRequest {
            menu: menu.to_owned(),
        };
        let response: CartResponse = self
            .rpc
            .call("WeeklyCart/removeMenuFromCart", &request)
            .await
            .inspect_err(|error| warn!(menu, %error, "remove menu from cart failed"))?;
        Ok(response.cart)
    }

    pub async fn cart_dates(&self, cart: &str) -> Result<CartDatesResponse, ApiError> {
        let request = CartRequest {
            cart: cart.to_owned(),
        };
        self.rpc
            .call("WeeklyCart/_getCartDates", &request)
            .await
            .inspect_err(|error| warn!(cart, %error, "cart dates lookup failed"))
    }

    pub async fn menus_in_cart(&self, cart: &str) -> Result<Vec<String>, ApiError> {
        let request = CartRequest {
            cart: cart.to_owned(),
        };
        let response: MenusInCartResponse = self
            .rpc
            .call("WeeklyCart/_getMenusInCart", &request)
            .await
            .inspect_err(|error| warn!(cart, %error, "menus in cart lookup failed"))?;
        Ok(response.menus)
    }

    /// The cart whose week contains `date`, if any.
    pub async fn cart_by_date(&self, date: NaiveDate) -> Result<Option<String>, ApiError> {
        let request = CartDateRequest { date };
        let response: CartByDateResponse = self
            .rpc
            .call("WeeklyCart/_getCartByDate", &request)
            .await
            .inspect_err(|error| warn!(%date, %error, "cart by date lookup failed"))?;
        Ok(response.cart)
    }
}
