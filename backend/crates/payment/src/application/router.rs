//! Payment Router
//!
//! Resolves the method, dispatches to exactly one processor under a timeout,
//! normalizes provider faults into failed outcomes and records transactions.

use crate::domain::method::PaymentMethod;
use crate::domain::outcome::{PaymentOutcome, VerificationOutcome};
use crate::domain::repository::{PaymentProcessor, TransactionRepository};
use crate::domain::request::PaymentRequest;
use crate::domain::transaction::TransactionRecord;
use crate::error::{PaymentError, PaymentResult, ProviderError, ProviderResult};
use kernel::id::TransactionRecordId;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Generic error text for a processor fault or timeout
pub const PROCESSING_FAILED: &str = "Payment processing failed";

/// What happened to the transaction record of a payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Outcome carried no transaction id
    Skipped,
    Stored(TransactionRecordId),
    /// Write failed; the payment outcome is unaffected
    Failed(String),
}

/// Outcome of [`PaymentRouter::process_payment`]
#[derive(Debug, Clone)]
pub struct ProcessedPayment {
    pub outcome: PaymentOutcome,
    pub record: RecordOutcome,
}

/// Dispatches payments to one processor per method
pub struct PaymentRouter<P, T> {
    processors: BTreeMap<PaymentMethod, P>,
    transactions: Arc<T>,
    timeout: Duration,
}

impl<P, T> PaymentRouter<P, T>
where
    P: PaymentProcessor + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
{
    /// Register `processors`, keyed by [`PaymentProcessor::method`]; a later
    /// processor for the same method replaces an earlier one
    pub fn new(processors: impl IntoIterator<Item = P>, transactions: Arc<T>, timeout: Duration) -> Self {
        let processors = processors
            .into_iter()
            .map(|p| (p.method(), p))
            .collect();
        Self {
            processors,
            transactions,
            timeout,
        }
    }

    pub fn supported_methods(&self) -> Vec<PaymentMethod> {
        self.processors.keys().copied().collect()
    }

    fn resolve(&self, code: &str) -> PaymentResult<(PaymentMethod, &P)> {
        PaymentMethod::from_code(code)
            .and_then(|method| self.processors.get(&method).map(|p| (method, p)))
            .ok_or_else(|| PaymentError::InvalidMethod {
                supported: self.processors.keys().map(|m| m.code()).collect(),
            })
    }

    async fn bounded<F, O>(&self, call: F) -> ProviderResult<O>
    where
        F: Future<Output = ProviderResult<O>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        }
    }

    /// Process a payment
    ///
    /// Only request validation fails this call. Provider faults and timeouts
    /// become a failed outcome, and a failed record write is reported in
    /// [`ProcessedPayment::record`] without touching the outcome.
    pub async fn process_payment(&self, request: &PaymentRequest) -> PaymentResult<ProcessedPayment> {
        let (method, processor) = self.resolve(&request.method)?;
        if !request.has_valid_amount() {
            return Err(PaymentError::InvalidAmount);
        }

        tracing::info!(method = %method, order_id = %request.order_id, "Processing payment");

        let outcome = match self.bounded(processor.process_payment(request)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    method = %method,
                    order_id = %request.order_id,
                    kind = e.kind().as_str(),
                    error = %e,
                    "Payment provider failure"
                );
                PaymentOutcome::failed(method, PROCESSING_FAILED).with_details(e.to_string())
            }
        };

        if !outcome.success {
            tracing::debug!(method = %method, order_id = %request.order_id, error = ?outcome.error, "Payment not successful");
        }

        let record = self.store_transaction(method, request, &outcome).await;
        Ok(ProcessedPayment { outcome, record })
    }

    async fn store_transaction(
        &self,
        method: PaymentMethod,
        request: &PaymentRequest,
        outcome: &PaymentOutcome,
    ) -> RecordOutcome {
        let Some(record) = TransactionRecord::from_outcome(method, request, outcome) else {
            return RecordOutcome::Skipped;
        };

        match self.transactions.insert(&record).await {
            Ok(()) => RecordOutcome::Stored(record.id),
            Err(e) => {
                tracing::error!(
                    method = %method,
                    order_id = %record.order_id,
                    transaction_id = %record.transaction_id,
                    error = %e,
                    "Failed to store transaction"
                );
                RecordOutcome::Failed(e.to_string())
            }
        }
    }

    /// Ask the provider for the current state of `transaction_id`
    pub async fn verify_payment(&self, transaction_id: &str, method: &str) -> PaymentResult<VerificationOutcome> {
        let (method, processor) = self.resolve(method)?;

        Ok(match self.bounded(processor.verify_payment(transaction_id)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(method = %method, transaction_id = %transaction_id, error = %e, "Payment verification failed");
                VerificationOutcome::failed(e.to_string())
            }
        })
    }

    /// Capture an approved PayPal order
    pub async fn capture_payment(&self, order_id: &str) -> PaymentResult<VerificationOutcome> {
        let (method, processor) = self.resolve(PaymentMethod::Paypal.code())?;

        Ok(match self.bounded(processor.capture_payment(order_id)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(method = %method, order_id = %order_id, error = %e, "Payment capture failed");
                VerificationOutcome::failed(e.to_string())
            }
        })
    }
}
