pub mod auth;
pub mod catalog;
pub mod costs;
pub mod export;
pub mod menu;
pub mod menus;
pub mod week;
