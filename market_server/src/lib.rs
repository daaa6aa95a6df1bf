//! The marketplace HTTP server.
//!
//! Thin actix-web handlers over the engine APIs. The server owns everything request-shaped
//! (tokens, payloads, status codes) and the engine owns everything domain-shaped (checkout,
//! caching, storage). Wiring happens in [`server::create_server_instance`], which is also what the
//! endpoint tests call with mocked externals.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
