//! Normalized provider results

use crate::domain::method::PaymentMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a payment attempt, identical in shape for every provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub success: bool,
    pub provider: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Where the customer completes a redirect flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Provider error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Raw provider body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_response: Option<Value>,
}

impl PaymentOutcome {
    fn empty(provider: PaymentMethod, success: bool) -> Self {
        Self {
            success,
            provider,
            transaction_id: None,
            status: None,
            error: None,
            payment_url: None,
            amount: None,
            currency: None,
            code: None,
            details: None,
            provider_response: None,
        }
    }

    pub fn succeeded(provider: PaymentMethod) -> Self {
        Self::empty(provider, true)
    }

    pub fn failed(provider: PaymentMethod, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(provider, false)
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    pub fn with_transaction_id(mut self, id: Option<String>) -> Self {
        self.transaction_id = id;
        self
    }

    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }

    pub fn with_payment_url(mut self, url: Option<String>) -> Self {
        self.payment_url = url;
        self
    }

    pub fn with_amount(mut self, amount: f64, currency: impl Into<String>) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.into());
        self
    }

    pub fn with_code(mut self, code: Option<Value>) -> Self {
        self.code = code.filter(|c| !c.is_null());
        self
    }

    pub fn with_details(mut self, details: impl Into<Value>) -> Self {
        let details = details.into();
        self.details = (!details.is_null()).then_some(details);
        self
    }

    pub fn with_provider_response(mut self, response: Value) -> Self {
        self.provider_response = Some(response);
        self
    }
}

/// Current state of a transaction as reported by its provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Raw provider body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationOutcome {
    pub fn reported(success: bool, status: Option<String>, transaction: Value) -> Self {
        Self {
            success,
            status,
            transaction: Some(transaction),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status: None,
            transaction: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_serializes_sparse_camel_case() {
        let outcome = PaymentOutcome::succeeded(PaymentMethod::StcPay)
            .with_transaction_id(Some("tx1".into()))
            .with_status(Some("pending".into()))
            .with_payment_url(Some("https://pay.example/tx1".into()));

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "success": true,
                "provider": "stc_pay",
                "transactionId": "tx1",
                "status": "pending",
                "paymentUrl": "https://pay.example/tx1",
            })
        );
    }

    #[test]
    fn test_null_code_and_details_are_dropped() {
        let outcome = PaymentOutcome::failed(PaymentMethod::Mada, "MADA payment failed")
            .with_code(Some(Value::Null))
            .with_details(Value::Null);
        assert_eq!(outcome.code, None);
        assert_eq!(outcome.details, None);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "provider": "mada", "error": "MADA payment failed"})
        );
    }
}
