//! Application Configuration
//!
//! Provider credentials, base URLs and the outbound timeout.

use std::fmt;
use std::time::Duration;

pub const MADA_DEFAULT_URL: &str = "https://api.mada.sa/v1";
pub const STC_PAY_DEFAULT_URL: &str = "https://api.stcpay.com.sa/v2";
pub const STRIPE_DEFAULT_URL: &str = "https://api.stripe.com/v1";
pub const PAYPAL_DEFAULT_URL: &str = "https://api.sandbox.paypal.com";

/// Bearer-key provider settings (MADA, STC Pay)
#[derive(Clone)]
pub struct MerchantConfig {
    pub api_key: Option<String>,
    pub merchant_id: Option<String>,
    pub base_url: String,
}

impl MerchantConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            merchant_id: None,
            base_url: base_url.into(),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, merchant_id: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self.merchant_id = Some(merchant_id.into());
        self
    }

    /// Both key and merchant id, when present and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.api_key.as_deref().filter(|k| !k.is_empty())?;
        let merchant = self.merchant_id.as_deref().filter(|m| !m.is_empty())?;
        Some((key, merchant))
    }
}

/// Stripe settings
#[derive(Clone)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub base_url: String,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            base_url: STRIPE_DEFAULT_URL.to_string(),
        }
    }
}

/// PayPal settings
#[derive(Clone)]
pub struct PayPalConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub base_url: String,
}

impl Default for PayPalConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            base_url: PAYPAL_DEFAULT_URL.to_string(),
        }
    }
}

/// Payment application configuration
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub mada: MerchantConfig,
    pub stc_pay: MerchantConfig,
    pub stripe: StripeConfig,
    pub paypal: PayPalConfig,
    /// Upper bound on one provider operation
    pub timeout: Duration,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            mada: MerchantConfig::new(MADA_DEFAULT_URL),
            stc_pay: MerchantConfig::new(STC_PAY_DEFAULT_URL),
            stripe: StripeConfig::default(),
            paypal: PayPalConfig::default(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl PaymentConfig {
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}

fn redacted(value: &Option<String>) -> &'static str {
    if value.is_some() { "[REDACTED]" } else { "None" }
}

impl fmt::Debug for MerchantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantConfig")
            .field("api_key", &redacted(&self.api_key))
            .field("merchant_id", &self.merchant_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &redacted(&self.secret_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("base_url", &self.base_url)
            .finish()
    }
}
