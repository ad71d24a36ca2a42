//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Claims, token lifetimes, principal
//! - `application/` - Token service, auth gate, configuration
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Stateless HS256 tokens (issue / verify / refresh)
//! - Single-purpose password-reset tokens
//! - `require_auth` / `require_admin` middleware and a [`Principal`] extractor
//!
//! ## Security Model
//! - Signatures compared in constant time
//! - Empty signing secret fails closed
//! - Expiry is the only invalidation path (no revocation list)
//! - Admin access comes from the `isAdmin` claim, never from the email

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token_service::{RefreshedToken, TokenService};
pub use domain::{Claims, Principal, TokenTtl};
pub use error::{AuthError, AuthResult, TokenError};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
