//! Payment Error Types
//!
//! This module provides payment-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! [`PaymentError`] is what the router reports to its caller; [`ProviderError`]
//! stays below the router, which turns it into a failed outcome.

use crate::domain::method::PaymentMethod;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Payment-specific result type alias
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Provider call result type alias
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Fields a payment request cannot omit
pub const REQUIRED_FIELDS: [&str; 3] = ["method", "amount", "orderId"];

/// Payment-specific error variants
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Body was not a JSON payment request
    #[error("Invalid JSON payload")]
    InvalidPayload(String),

    /// Required request fields absent or empty
    #[error("Missing required payment data")]
    MissingFields(Vec<&'static str>),

    /// Method not in the supported set
    #[error("Invalid payment method")]
    InvalidMethod { supported: Vec<&'static str> },

    /// Amount not a finite positive number
    #[error("Amount must be a positive number")]
    InvalidAmount,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    pub fn missing_fields() -> Self {
        PaymentError::MissingFields(REQUIRED_FIELDS.to_vec())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::InvalidPayload(_)
            | PaymentError::MissingFields(_)
            | PaymentError::InvalidMethod { .. }
            | PaymentError::InvalidAmount => StatusCode::BAD_REQUEST,
            PaymentError::Database(_) | PaymentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::InvalidPayload(_)
            | PaymentError::MissingFields(_)
            | PaymentError::InvalidMethod { .. }
            | PaymentError::InvalidAmount => ErrorKind::BadRequest,
            PaymentError::Database(_) | PaymentError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            PaymentError::InvalidPayload(reason) => {
                AppError::bad_request(self.to_string()).with_reason(reason.clone())
            }
            PaymentError::MissingFields(required) => {
                AppError::bad_request(self.to_string()).with_detail("required", required.clone())
            }
            PaymentError::InvalidMethod { supported } => AppError::bad_request(self.to_string())
                .with_detail("success", false)
                .with_detail("supportedMethods", supported.clone()),
            PaymentError::InvalidAmount => {
                AppError::bad_request(self.to_string()).with_detail("success", false)
            }
            PaymentError::Database(_) | PaymentError::Internal(_) => {
                AppError::internal(self.kind().as_str())
            }
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            PaymentError::Database(e) => {
                tracing::error!(error = %e, "Payment database error");
            }
            PaymentError::Internal(msg) => {
                tracing::error!(message = %msg, "Payment internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Payment request rejected");
            }
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

/// Failure talking to a payment provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Credentials absent from configuration
    #[error("{0} credentials not configured")]
    MissingCredentials(&'static str),

    /// Request lacks a field this provider needs
    #[error("Missing {0} for this payment method")]
    MissingField(&'static str),

    /// Network failure, client timeout or unreadable body
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the JSON the provider documents
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// No answer within the configured bound
    #[error("Provider did not respond within {}s", .0.as_secs_f64())]
    Timeout(std::time::Duration),

    /// Access token could not be obtained
    #[error("Provider authentication failed: {0}")]
    Auth(String),

    /// Operation not offered by this provider
    #[error("{} does not support this operation", .0.display_name())]
    Unsupported(PaymentMethod),
}

impl ProviderError {
    /// Classification of the provider fault
    ///
    /// Used for logging only; provider faults reach clients as failed outcomes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::MissingField(_) | ProviderError::Unsupported(_) => ErrorKind::BadRequest,
            ProviderError::Transport(e) if e.is_timeout() => ErrorKind::GatewayTimeout,
            ProviderError::Timeout(_) => ErrorKind::GatewayTimeout,
            ProviderError::Transport(_) | ProviderError::InvalidResponse(_) => ErrorKind::BadGateway,
            ProviderError::MissingCredentials(_) | ProviderError::Auth(_) => {
                ErrorKind::InternalServerError
            }
        }
    }
}
