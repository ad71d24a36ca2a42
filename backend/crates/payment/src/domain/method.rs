use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported payment providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Domestic card network (card present, amounts in halalas)
    Mada,
    /// Phone-linked wallet with redirect
    StcPay,
    /// International cards via payment intents
    Stripe,
    /// Redirect/approval wallet with a later capture
    Paypal,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Mada,
        PaymentMethod::StcPay,
        PaymentMethod::Stripe,
        PaymentMethod::Paypal,
    ];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use PaymentMethod::*;
        match self {
            Mada => "mada",
            StcPay => "stc_pay",
            Stripe => "stripe",
            Paypal => "paypal",
        }
    }

    #[inline]
    pub const fn display_name(&self) -> &'static str {
        use PaymentMethod::*;
        match self {
            Mada => "MADA",
            StcPay => "STC Pay",
            Stripe => "Stripe",
            Paypal => "PayPal",
        }
    }

    /// Currencies the provider settles in
    pub const fn currencies(&self) -> &'static [&'static str] {
        use PaymentMethod::*;
        match self {
            Mada | StcPay => &["SAR"],
            Stripe | Paypal => &["SAR", "USD"],
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Unknown payment method code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown payment method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownMethod(s.to_string()))
    }
}
