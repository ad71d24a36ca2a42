//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::method::PaymentMethod;
use crate::domain::request::{CardData, DEFAULT_CURRENCY, PaymentRequest};
use crate::error::{PaymentError, PaymentResult};

// ============================================================================
// Create Payment
// ============================================================================

/// Checkout request body
///
/// Everything is optional here so that absent fields surface as
/// `MissingFields` rather than a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub method: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub order_id: Option<String>,
    pub customer_email: Option<String>,
    pub card_data: Option<CardData>,
    pub phone_number: Option<String>,
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
    pub callback_url: Option<String>,
}

impl CreatePaymentRequest {
    /// Check presence of `method`, `amount` and `orderId`
    ///
    /// A zero amount counts as absent. Range checks on the amount and method
    /// resolution happen in the router.
    pub fn into_request(self) -> PaymentResult<PaymentRequest> {
        let method = self.method.filter(|m| !m.is_empty());
        let amount = self.amount.filter(|a| *a != 0.0);
        let order_id = self.order_id.filter(|o| !o.is_empty());

        let (Some(method), Some(amount), Some(order_id)) = (method, amount, order_id) else {
            return Err(PaymentError::missing_fields());
        };

        let mut request = PaymentRequest::new(method, amount, order_id);
        request.currency = self
            .currency
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        request.customer_email = self.customer_email;
        request.card_data = self.card_data;
        request.phone_number = self.phone_number;
        request.return_url = self.return_url;
        request.cancel_url = self.cancel_url;
        request.callback_url = self.callback_url;
        Ok(request)
    }
}

// ============================================================================
// Verify
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub method: String,
}

// ============================================================================
// Methods
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub currencies: &'static [&'static str],
}

impl From<PaymentMethod> for MethodInfo {
    fn from(method: PaymentMethod) -> Self {
        Self {
            id: method.code(),
            name: method.display_name(),
            currencies: method.currencies(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodsData {
    pub payment_methods: Vec<MethodInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodsResponse {
    pub status: &'static str,
    pub data: MethodsData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> CreatePaymentRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_fields_are_reported_together() {
        for value in [
            json!({}),
            json!({"method": "mada", "amount": 10}),
            json!({"method": "", "amount": 10, "orderId": "o1"}),
            json!({"method": "mada", "amount": 0, "orderId": "o1"}),
            json!({"method": "mada", "amount": 10, "orderId": ""}),
        ] {
            let err = body(value).into_request().unwrap_err();
            match err {
                PaymentError::MissingFields(fields) => {
                    assert_eq!(fields, vec!["method", "amount", "orderId"])
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_currency_defaults_to_sar() {
        let request = body(json!({"method": "stc_pay", "amount": 5.5, "orderId": "o1"}))
            .into_request()
            .unwrap();
        assert_eq!(request.currency, "SAR");
        assert_eq!(request.method, "stc_pay");

        let request = body(json!({"method": "stripe", "amount": 5, "orderId": "o1", "currency": "USD"}))
            .into_request()
            .unwrap();
        assert_eq!(request.currency, "USD");
    }

    #[test]
    fn test_negative_amount_passes_presence_check() {
        let request = body(json!({"method": "mada", "amount": -3, "orderId": "o1"}))
            .into_request()
            .unwrap();
        assert!(!request.has_valid_amount());
    }
}
