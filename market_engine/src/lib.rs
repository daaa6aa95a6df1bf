//! Artisan Market Engine
//!
//! The core library for the artisan marketplace server. It is HTTP-agnostic; the server crate
//! wires its APIs to routes.
//!
//! The library is divided into:
//! 1. Data types and storage. The [`mod@db_types`] module defines the records, the traits in
//!    [`mod@traits`] define the storage contract, and the SQLite backend implements them. Callers
//!    never touch the database directly; they go through the API objects.
//! 2. The public APIs ([`OrderFlowApi`], [`CartApi`], [`CatalogApi`], [`AuthApi`]), which compose
//!    the database, the read-through [`mod@cache`], the payment gateway and the notifier.
//! 3. Pure domain logic: cart pricing ([`mod@pricing`]) and the payment signature check
//!    ([`mod@helpers`]).

pub mod cache;
pub mod db_types;
pub mod helpers;
mod order_manager;
pub mod pricing;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use order_manager::{
    auth_api::AuthApi,
    cart_api::CartApi,
    catalog_api::CatalogApi,
    errors::{AuthApiError, CartApiError, CatalogApiError, OrderFlowError},
    order_flow_api::{OrderFlowApi, DIRECT_PAYMENT_METHOD, GATEWAY_PAYMENT_METHOD},
    order_objects,
};
