use std::collections::HashMap;

use async_trait::async_trait;
use market_common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("Payment gateway unreachable: {0}")]
    Unreachable(String),
    #[error("Unexpected response from payment gateway: {0}")]
    InvalidResponse(String),
    #[error("Payment intent {0} was not found at the gateway")]
    IntentNotFound(String),
}

/// Request to create a remote payment intent. `notes` is opaque metadata echoed back when the
/// intent is fetched; the order flow uses it to carry the buyer and address context, since no
/// local order exists yet to anchor them.
#[derive(Debug, Clone, Serialize)]
pub struct NewPaymentIntent {
    pub amount: Money,
    pub currency: String,
    pub receipt: String,
    pub notes: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: Money,
    pub currency: String,
    pub receipt: String,
    pub notes: HashMap<String, String>,
    pub status: String,
}

/// The two calls the order flow needs from a payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, PaymentGatewayError>;

    async fn fetch_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayError>;
}
