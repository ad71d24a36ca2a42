//! Server Configuration
//!
//! Everything is read from the environment (after `.env` is loaded).

use anyhow::{Context, bail};
use auth::AuthConfig;
use payment::PaymentConfig;
use payment::application::config::{MerchantConfig, PayPalConfig, StripeConfig};
use platform::rate_limit::RateLimitConfig;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,
    pub api_limit: RateLimitConfig,
    pub auth_limit: RateLimitConfig,
    pub payments_limit: RateLimitConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let frontend_origins = optional("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            auth: auth_config()?,
            payment: payment_config()?,
            api_limit: rate_limit("API", RateLimitConfig::api())?,
            auth_limit: rate_limit("AUTH", RateLimitConfig::auth())?,
            payments_limit: rate_limit("PAYMENTS", RateLimitConfig::payments())?,
        })
    }
}

/// Non-empty value of `key`
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional(key)
        .map(|value| value.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{key} is not valid"))
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match optional("JWT_SECRET") {
        Some(secret) => AuthConfig::with_secret(secret),
        None if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET not set, using a random development secret");
            AuthConfig::development()
        }
        None => bail!("JWT_SECRET must be set in production"),
    };

    if let Some(ttl) = optional("JWT_DEFAULT_TTL") {
        config.default_ttl = ttl;
    }
    Ok(config)
}

fn merchant(prefix: &str, default_url: &str) -> MerchantConfig {
    let base_url = optional(&format!("{prefix}_API_URL")).unwrap_or_else(|| default_url.to_string());
    MerchantConfig {
        api_key: optional(&format!("{prefix}_API_KEY")),
        merchant_id: optional(&format!("{prefix}_MERCHANT_ID")),
        base_url,
    }
}

fn payment_config() -> anyhow::Result<PaymentConfig> {
    let defaults = PaymentConfig::default();

    let stripe_defaults = StripeConfig::default();
    let paypal_defaults = PayPalConfig::default();

    let timeout = parsed::<u64>("PAYMENT_TIMEOUT_SECS")?
        .map(Duration::from_secs)
        .unwrap_or(defaults.timeout);

    Ok(PaymentConfig {
        mada: merchant("MADA", &defaults.mada.base_url),
        stc_pay: merchant("STC_PAY", &defaults.stc_pay.base_url),
        stripe: StripeConfig {
            secret_key: optional("STRIPE_SECRET_KEY"),
            base_url: optional("STRIPE_API_URL").unwrap_or(stripe_defaults.base_url),
        },
        paypal: PayPalConfig {
            client_id: optional("PAYPAL_CLIENT_ID"),
            client_secret: optional("PAYPAL_CLIENT_SECRET"),
            base_url: optional("PAYPAL_API_URL").unwrap_or(paypal_defaults.base_url),
        },
        timeout,
    })
}

/// Override `RATE_LIMIT_<name>_MAX` / `RATE_LIMIT_<name>_WINDOW_MS` on a preset
fn rate_limit(name: &str, mut config: RateLimitConfig) -> anyhow::Result<RateLimitConfig> {
    if let Some(max) = parsed::<u32>(&format!("RATE_LIMIT_{name}_MAX"))? {
        config.max_requests = max;
    }
    if let Some(window_ms) = parsed::<u64>(&format!("RATE_LIMIT_{name}_WINDOW_MS"))? {
        config.window = Duration::from_millis(window_ms);
    }
    Ok(config)
}
