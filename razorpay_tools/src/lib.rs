//! A minimal client for the Razorpay Orders API.
//!
//! Only the two calls the order flow needs are implemented: creating an order (the payment
//! intent) and fetching it back. Authentication is HTTP basic with the key id and key secret.

mod api;
mod config;
mod data_objects;
mod error;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{NewRazorpayOrder, RazorpayOrder};
pub use error::RazorpayApiError;
