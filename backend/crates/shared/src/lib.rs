//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of storefront vocabulary:
//! - Common error types and result aliases
//! - Typed ID wrappers
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across the auth, rate limiting and payment crates.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
