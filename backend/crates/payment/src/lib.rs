//! Payment Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Methods, requests, normalized outcomes, transaction records
//! - `application/` - Provider configuration and the payment router
//! - `infra/` - Provider HTTP clients, Postgres and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - MADA, STC Pay, Stripe and PayPal behind one [`PaymentProcessor`] seam
//! - Exactly one provider call per payment, bounded by a timeout
//! - Insert-only transaction log; a failed write never changes the outcome
//!
//! ## Security Model
//! - Card data is never logged
//! - Provider faults are reported as a generic failure plus details
//! - Verification is admin-only

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::PaymentConfig;
pub use application::router::{PaymentRouter, ProcessedPayment, RecordOutcome};
pub use domain::{
    PaymentMethod, PaymentOutcome, PaymentProcessor, PaymentRequest, TransactionRecord,
    TransactionRepository, VerificationOutcome,
};
pub use error::{PaymentError, PaymentResult, ProviderError, ProviderResult};
pub use infra::{MemoryTransactionRepository, PgTransactionRepository, Processor, build_processors};
pub use presentation::router::payment_router;
