//! `WeeklyCart` aggregate shapes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Any date inside the target week selects that week's cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateInWeekRequest {
    pub date_in_week: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMenuToCartRequest {
    pub menu: String,
    pub menu_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveMenuFromCartRequest {
    pub menu: String,
}

/// Body for endpoints addressing a single cart by id.
#[derive(Debug, Clone, Serialize)]
pub struct CartRequest {
    pub cart: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartDateRequest {
    pub date: NaiveDate,
}

/// Cart mutations all answer with the affected cart's id.
#[derive(Debug, Clone, Deserialize)]
pub struct CartResponse {
    pub cart: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDatesResponse {
    #[serde(deserialize_with = "crate::de::calendar_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "crate::de::calendar_date")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenusInCartResponse {
    #[serde(default, deserialize_with = "crate::de::id_list")]
    pub menus: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CartByDateResponse {
    #[serde(default)]
    pub cart: Option<String>,
}
