//! Payment request passed from the checkout handler to the router

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

pub const DEFAULT_CURRENCY: &str = "SAR";

/// Card details for card-network providers
///
/// Never logged: `Debug` shows only the last four digits.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    #[serde(deserialize_with = "string_or_number")]
    pub expiry_month: String,
    #[serde(deserialize_with = "string_or_number")]
    pub expiry_year: String,
    #[serde(deserialize_with = "string_or_number")]
    pub cvv: String,
    #[serde(default)]
    pub holder_name: Option<String>,
}

impl CardData {
    pub fn last4(&self) -> &str {
        let len = self.number.len();
        self.number.get(len.saturating_sub(4)..).unwrap_or_default()
    }
}

impl fmt::Debug for CardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardData")
            .field("number", &format_args!("****{}", self.last4()))
            .field("cvv", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// A checkout payment
///
/// `method` is the raw code sent by the client; the router resolves it.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub method: String,
    /// Decimal amount in major units (`10.50` SAR)
    pub amount: f64,
    pub currency: String,
    pub order_id: String,
    /// Injected from the authenticated principal
    pub user_id: Option<Value>,
    pub user_email: Option<String>,
    /// Receipt address; falls back to `user_email`
    pub customer_email: Option<String>,
    pub card_data: Option<CardData>,
    pub phone_number: Option<String>,
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
    pub callback_url: Option<String>,
}

impl PaymentRequest {
    pub fn new(method: impl Into<String>, amount: f64, order_id: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            order_id: order_id.into(),
            user_id: None,
            user_email: None,
            customer_email: None,
            card_data: None,
            phone_number: None,
            return_url: None,
            cancel_url: None,
            callback_url: None,
        }
    }

    /// Amount in the smallest currency unit (halalas, cents), rounded half up
    pub fn minor_units(&self) -> i64 {
        (self.amount * 100.0).round() as i64
    }

    /// Amount with exactly two decimals (`"10.50"`)
    pub fn decimal_amount(&self) -> String {
        let minor = self.minor_units();
        format!("{}.{:02}", minor / 100, minor % 100)
    }

    pub fn has_valid_amount(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }

    pub fn receipt_email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .or(self.user_email.as_deref())
    }
}
