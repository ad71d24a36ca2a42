//! Application Layer
//!
//! Provider configuration and the payment router.

pub mod config;
pub mod router;

// Re-exports
pub use config::{MerchantConfig, PayPalConfig, PaymentConfig, StripeConfig};
pub use router::{PROCESSING_FAILED, PaymentRouter, ProcessedPayment, RecordOutcome};
