//! Behaviour contracts for storage backends and external collaborators.
//!
//! The database traits use native `async fn` and are implemented by [`crate::SqliteDatabase`].
//! [`PaymentGateway`] and [`OrderNotifier`] are object-safe (`async_trait`) because the order flow
//! holds them behind `Arc<dyn ...>` and the endpoint tests substitute mocks.

mod auth_management;
mod cart_management;
mod catalog_management;
mod notifier;
mod order_management;
mod payment_gateway;

pub use auth_management::{AuthManagement, AuthDbError};
pub use cart_management::{CartDbError, CartManagement};
pub use catalog_management::{CatalogDbError, CatalogManagement};
pub use notifier::{ConfirmationLine, NotifyError, OrderConfirmation, OrderNotifier};
pub use order_management::{OrderDbError, OrderManagement};
pub use payment_gateway::{NewPaymentIntent, PaymentGateway, PaymentGatewayError, PaymentIntent};
