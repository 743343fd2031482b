//! Larder client core.
//!
//! The backend owns all menu-planning business logic (recipe scaling, unit
//! conversion, least-cost purchase optimization) behind a JSON-over-HTTP
//! RPC surface. This crate is the client side of that contract:
//!
//! - [`rpc`]: the single HTTP chokepoint (auth injection, timeouts, error
//!   taxonomy, response normalization)
//! - [`api`]: stateless typed services, one per backend aggregate
//! - [`cache`]: session-persisted entity mirrors with single-flight
//!   loading, explicit invalidation, and change events
//! - [`domain`]: plain entity types, week arithmetic, unit tables, and the
//!   shopping-list export conversion
//! - [`proxy`]: the `/api/*` edge forwarder served by the `larder` binary

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod proxy;
pub mod rpc;
