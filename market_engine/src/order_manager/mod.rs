//! # Market order manager
//!
//! The public API objects of the engine. Each wraps a database backend (and, where reads are
//! cached, the [`crate::cache::MarketCache`]) and exposes the operations the server routes call.

pub mod auth_api;
pub mod cart_api;
pub mod catalog_api;
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;

pub use errors::{AuthApiError, CartApiError, CatalogApiError, OrderFlowError};
