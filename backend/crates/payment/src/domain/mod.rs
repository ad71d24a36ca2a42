//! Domain Layer
//!
//! Payment methods, requests, normalized outcomes, transaction records and
//! the provider/repository traits.

pub mod method;
pub mod outcome;
pub mod repository;
pub mod request;
pub mod transaction;

// Re-exports
pub use method::PaymentMethod;
pub use outcome::{PaymentOutcome, VerificationOutcome};
pub use repository::{PaymentProcessor, TransactionRepository};
pub use request::{CardData, PaymentRequest};
pub use transaction::TransactionRecord;
