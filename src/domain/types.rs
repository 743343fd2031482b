//! Client-side mirrors of backend entities.
//!
//! The server is the source of truth; these are the copy-on-read,
//! patch-on-write shapes the stores hold and persist.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The authenticated user, as persisted to session storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub username: String,
    /// RFC 3339 timestamp of the login that created this session.
    pub login_time: String,
}

/// Tri-state admin flag: unknown until the first backend check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminStatus {
    #[default]
    Unknown,
    No,
    Yes,
}

impl AdminStatus {
    pub fn is_admin(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::No => Some(false),
            Self::Yes => Some(true),
        }
    }

    pub fn from_flag(flag: bool) -> Self {
        if flag { Self::Yes } else { Self::No }
    }

    /// Storage encoding; `Unknown` is simply not persisted.
    pub fn as_storage_str(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::No => Some("false"),
            Self::Yes => Some("true"),
        }
    }

    pub fn from_storage_str(raw: &str) -> Self {
        match raw {
            "true" => Self::Yes,
            "false" => Self::No,
            _ => Self::Unknown,
        }
    }
}

/// One way to buy a catalog item at a particular store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOption {
    pub id: String,
    pub quantity: f64,
    pub units: String,
    pub price: f64,
    pub store: String,
    #[serde(default)]
    pub confirmed: bool,
}

/// A catalog item with its purchase options, newest option first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub purchase_options: Vec<PurchaseOption>,
}

impl CatalogItem {
    pub fn find_option(&self, option_id: &str) -> Option<&PurchaseOption> {
        self.purchase_options.iter().find(|po| po.id == option_id)
    }
}

/// The card-level view of a menu held in the menus list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSummary {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub owner: String,
    pub recipe_count: usize,
}

/// Core attributes of a single menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDetails {
    pub name: String,
    pub date: NaiveDate,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub units: String,
}

/// A recipe as embedded in a menu, carrying its menu-level scaling factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeEntry {
    pub id: String,
    pub name: String,
    pub dish_type: String,
    pub serving_quantity: f64,
    pub instructions: String,
    pub scaling_factor: f64,
    pub ingredients: Vec<Ingredient>,
}

/// Fully-resolved menu held by the detail store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDetailEntry {
    pub details: MenuDetails,
    pub owner_username: String,
    pub recipes: Vec<RecipeEntry>,
}

/// A week's cart membership. `cart_id` is `None` when the backend has no
/// cart for the week yet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub cart_id: Option<String>,
    pub menu_ids: Vec<String>,
}

impl CartEntry {
    pub fn contains(&self, menu_id: &str) -> bool {
        self.menu_ids.iter().any(|id| id == menu_id)
    }
}

/// A menu placed on a calendar date within a week mapping, enriched for
/// display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedMenu {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub owner: String,
    pub owner_name: String,
    pub recipe_names: Vec<String>,
}
