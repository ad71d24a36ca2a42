//! Domain Layer
//!
//! Claims, token lifetimes and the authenticated principal.

pub mod claims;
pub mod principal;
pub mod token_ttl;

// Re-exports
pub use claims::{Claims, TokenHeader};
pub use principal::Principal;
pub use token_ttl::TokenTtl;
