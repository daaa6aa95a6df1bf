//! Error translation for the HTTP surface.
//!
//! Engine errors carry raw driver detail; the conversions here map each one onto a closed set of
//! server errors with a curated status code, so clients see a stable taxonomy and never a raw
//! database or gateway message.

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use market_engine::{
    traits::{AuthDbError, CartDbError, CatalogDbError, OrderDbError},
    AuthApiError,
    CartApiError,
    CatalogApiError,
    OrderFlowError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Invalid request: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Conflict. {0}")]
    Conflict(String),
    #[error("Payment verification failed")]
    PaymentDeclined,
    #[error("The payment provider could not be reached")]
    GatewayError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::PaymentDeclined => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) |
            Self::BackendError(_) |
            Self::IOError(_) |
            Self::ConfigurationError(_) |
            Self::Unspecified(_) |
            Self::GatewayError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            // The client gets the generic Display message only; details go to the log
            match self {
                Self::BackendError(detail) => error!("💻️ Backend error: {detail}"),
                Self::GatewayError(detail) => error!("💻️ Gateway error: {detail}"),
                other => error!("💻️ Server error: {other}"),
            }
        }
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Access token is invalid. {0}")]
    InvalidToken(String),
    #[error("Access token has expired.")]
    ExpiredToken,
    #[error("Access token was not provided.")]
    MissingToken,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Invalid email or password.")]
    InvalidCredentials,
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::EmptyCart |
            OrderFlowError::UnsupportedPaymentMethod(_) |
            OrderFlowError::IntentMissingContext => Self::InvalidRequestBody(e.to_string()),
            OrderFlowError::InvalidPaymentSignature => Self::PaymentDeclined,
            OrderFlowError::PaymentAmountMismatch { .. } => Self::Conflict(e.to_string()),
            OrderFlowError::ForeignIntent => Self::InsufficientPermissions(e.to_string()),
            OrderFlowError::AddressNotFound(_) | OrderFlowError::OrderNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            OrderFlowError::Gateway(g) => Self::GatewayError(g.to_string()),
            OrderFlowError::OrderDatabase(db) => db.into(),
            OrderFlowError::CartDatabase(db) => db.into(),
            OrderFlowError::CatalogDatabase(db) => db.into(),
        }
    }
}

impl From<OrderDbError> for ServerError {
    fn from(e: OrderDbError) -> Self {
        match e {
            OrderDbError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderDbError::InsufficientStock { .. } |
            OrderDbError::NotCancellable(_, _) |
            OrderDbError::StatusTransitionForbidden(_, _) |
            OrderDbError::PaymentTransitionForbidden(_, _) => Self::InvalidRequestBody(e.to_string()),
            OrderDbError::DatabaseError(db) => Self::BackendError(db.to_string()),
        }
    }
}

impl From<CartDbError> for ServerError {
    fn from(e: CartDbError) -> Self {
        match e {
            CartDbError::ProductNotFound(_) => Self::NoRecordFound(e.to_string()),
            CartDbError::InvalidQuantity => Self::InvalidRequestBody(e.to_string()),
            CartDbError::DatabaseError(db) => Self::BackendError(db.to_string()),
        }
    }
}

impl From<CatalogDbError> for ServerError {
    fn from(e: CatalogDbError) -> Self {
        match e {
            CatalogDbError::ProductNotFound(_) | CatalogDbError::ReviewNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            CatalogDbError::DuplicateReview => Self::Conflict(e.to_string()),
            CatalogDbError::InvalidRating | CatalogDbError::EmptyUpdate => Self::InvalidRequestBody(e.to_string()),
            CatalogDbError::DatabaseError(db) => Self::BackendError(db.to_string()),
        }
    }
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::Database(db) => db.into(),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::Database(db) => db.into(),
        }
    }
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AuthApiError::Database(db) => db.into(),
        }
    }
}

impl From<AuthDbError> for ServerError {
    fn from(e: AuthDbError) -> Self {
        match e {
            AuthDbError::EmailTaken => Self::Conflict(e.to_string()),
            AuthDbError::SignupNotFound | AuthDbError::InvalidVerification => Self::InvalidRequestBody(e.to_string()),
            AuthDbError::DatabaseError(db) => Self::BackendError(db.to_string()),
        }
    }
}
