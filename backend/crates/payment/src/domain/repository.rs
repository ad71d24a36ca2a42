//! Repository and Processor Traits
//!
//! Interfaces for providers and persistence. Implementations are in the infra layer.

use crate::domain::method::PaymentMethod;
use crate::domain::outcome::{PaymentOutcome, VerificationOutcome};
use crate::domain::request::PaymentRequest;
use crate::domain::transaction::TransactionRecord;
use crate::error::{PaymentResult, ProviderResult};

/// A payment provider
///
/// `Err` means the provider could not be reached or answered unusably;
/// a declined payment is an `Ok` outcome with `success == false`.
#[trait_variant::make(PaymentProcessor: Send)]
pub trait LocalPaymentProcessor {
    /// Method this processor serves
    fn method(&self) -> PaymentMethod;

    /// Charge or initiate a payment
    async fn process_payment(&self, request: &PaymentRequest) -> ProviderResult<PaymentOutcome>;

    /// Re-query the provider for a transaction's current state
    async fn verify_payment(&self, transaction_id: &str) -> ProviderResult<VerificationOutcome>;

    /// Capture an approved order (approval-flow providers only)
    async fn capture_payment(&self, order_id: &str) -> ProviderResult<VerificationOutcome>;
}

/// Transaction repository trait
#[trait_variant::make(TransactionRepository: Send)]
pub trait LocalTransactionRepository {
    /// Append a transaction record
    async fn insert(&self, record: &TransactionRecord) -> PaymentResult<()>;
}
