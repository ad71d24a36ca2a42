//! Application Layer
//!
//! Token service, auth gate and configuration.

pub mod config;
pub mod gate;
pub mod token_service;

// Re-exports
pub use config::AuthConfig;
pub use gate::{authenticate, authenticate_admin, authorize_admin, bearer_token};
pub use token_service::{RefreshedToken, TokenService};
