//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Token framing primitives (base64url codec, HMAC-SHA256 signer)
//! - Client identification from proxy headers
//! - Key-value counter store abstraction (in-memory and Postgres)
//! - Sliding-window rate limiting and its axum middleware

pub mod client;
pub mod crypto;
pub mod kv;
pub mod rate_limit;
