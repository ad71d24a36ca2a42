//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::crypto::SignerError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Why a token was not accepted (or could not be produced)
#[derive(Debug, Error)]
pub enum TokenError {
    /// Wrong segment count, undecodable segment or unparsable JSON
    #[error("Invalid token format")]
    Malformed,

    /// Signature does not match header and payload
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature valid but `exp` is in the past
    #[error("Token expired")]
    Expired,

    /// Valid token issued for another purpose
    #[error("Invalid reset token")]
    WrongPurpose,

    /// Secret missing at issuance
    #[error("Token signing failed: {0}")]
    Signing(#[from] SignerError),

    /// Claims could not be serialized
    #[error("Token encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl TokenError {
    /// Rejections of a presented token, as opposed to issuance failures
    pub fn is_rejection(&self) -> bool {
        !matches!(self, TokenError::Signing(_) | TokenError::Encoding(_))
    }
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer` header
    #[error("Missing or invalid authorization header")]
    MissingCredentials,

    /// Presented token rejected
    #[error("{0}")]
    InvalidToken(TokenError),

    /// Authenticated but not an administrator
    #[error("Admin access required")]
    AdminRequired,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        if err.is_rejection() {
            AuthError::InvalidToken(err)
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::AdminRequired => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => ErrorKind::Unauthorized,
            AuthError::AdminRequired => ErrorKind::Forbidden,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// 401 bodies are `{"error":"Authentication required","message":<reason>}`.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => {
                AppError::unauthorized("Authentication required").with_reason(self.to_string())
            }
            AuthError::AdminRequired => AppError::forbidden(self.to_string()),
            AuthError::Internal(_) => AppError::internal(self.kind().as_str()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidToken(TokenError::InvalidSignature) => {
                tracing::warn!("Token with invalid signature rejected");
            }
            AuthError::AdminRequired => {
                tracing::warn!("Non-admin principal denied");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        AuthError::from(self).into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
