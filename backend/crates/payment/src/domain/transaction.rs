//! Persisted transaction records

use crate::domain::method::PaymentMethod;
use crate::domain::outcome::PaymentOutcome;
use crate::domain::request::PaymentRequest;
use chrono::{DateTime, Utc};
use kernel::id::TransactionRecordId;

/// Status stored when the provider did not report one
pub const DEFAULT_STATUS: &str = "pending";

/// Insert-only record of a provider transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub id: TransactionRecordId,
    pub transaction_id: String,
    pub order_id: String,
    pub payment_method: PaymentMethod,
    pub amount: f64,
    pub status: String,
    /// Serialized provider body (`"{}"` when there was none)
    pub provider_response: String,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Record for an outcome that carries a provider transaction id
    pub fn from_outcome(
        method: PaymentMethod,
        request: &PaymentRequest,
        outcome: &PaymentOutcome,
    ) -> Option<Self> {
        let transaction_id = outcome.transaction_id.clone()?;
        let provider_response = outcome
            .provider_response
            .as_ref()
            .map_or_else(|| "{}".to_string(), |v| v.to_string());

        Some(Self {
            id: TransactionRecordId::new(),
            transaction_id,
            order_id: request.order_id.clone(),
            payment_method: method,
            amount: request.amount,
            status: outcome
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            provider_response,
            created_at: Utc::now(),
        })
    }
}
