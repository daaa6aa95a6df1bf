use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_common::Money;
use thiserror::Error;

use crate::db_types::{Address, OrderId};

#[derive(Debug, Clone, Error)]
#[error("Could not deliver notification: {0}")]
pub struct NotifyError(pub String);

#[derive(Debug, Clone)]
pub struct ConfirmationLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

#[derive(Debug, Clone)]
pub struct OrderConfirmation {
    pub recipient_email: String,
    pub recipient_name: String,
    pub order_id: OrderId,
    pub lines: Vec<ConfirmationLine>,
    pub total: Money,
    pub shipping_address: Option<Address>,
    pub placed_at: DateTime<Utc>,
    pub payment_method: String,
}

/// Order-confirmation delivery. Fired after the order transaction commits, off the request path;
/// a delivery failure never affects the order.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn order_confirmation(&self, confirmation: OrderConfirmation) -> Result<(), NotifyError>;
}
