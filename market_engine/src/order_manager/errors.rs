use market_common::Money;
use thiserror::Error;

use crate::{
    db_types::OrderId,
    traits::{AuthDbError, CartDbError, CatalogDbError, OrderDbError, PaymentGatewayError},
};

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    OrderDatabase(#[from] OrderDbError),
    #[error("Database error: {0}")]
    CartDatabase(#[from] CartDbError),
    #[error("Database error: {0}")]
    CatalogDatabase(#[from] CatalogDbError),
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Address {0} was not found")]
    AddressNotFound(i64),
    #[error("Unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),
    #[error("The payment signature is invalid")]
    InvalidPaymentSignature,
    #[error("The payment intent does not carry usable order context")]
    IntentMissingContext,
    #[error("The payment intent belongs to a different buyer")]
    ForeignIntent,
    #[error("The payment was authorized for {authorized}, but the order now totals {current}")]
    PaymentAmountMismatch { authorized: Money, current: Money },
    #[error(transparent)]
    Gateway(#[from] PaymentGatewayError),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
}

#[derive(Debug, Error)]
pub enum CartApiError {
    #[error(transparent)]
    Database(#[from] CartDbError),
}

#[derive(Debug, Error)]
pub enum CatalogApiError {
    #[error(transparent)]
    Database(#[from] CatalogDbError),
}

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error(transparent)]
    Database(#[from] AuthDbError),
    #[error("Invalid email or password")]
    InvalidCredentials,
}
