//! Shared request and response types for the Larder menu-planning RPC API.
//!
//! Every backend endpoint has exactly one request and one response shape
//! declared here. The backend occasionally wraps results in a one-element
//! array and encodes a few fields loosely (numeric strings, comma-separated
//! id lists); the `de` module normalizes those at deserialization time so
//! nothing downstream has to sniff shapes.

pub mod auth;
pub mod cook_book;
pub mod de;
pub mod instacart;
pub mod menu_collection;
pub mod purchase_system;
pub mod store_catalog;
pub mod weekly_cart;

use serde::Serialize;

/// Body for parameterless query endpoints; serializes to `{}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmptyRequest {}
