//! STC Pay wallet processor
//!
//! Initiates a wallet payment and hands back the URL the customer must visit.
//! The payment stays `pending` until the wallet callback settles it.

use crate::application::config::MerchantConfig;
use crate::domain::method::PaymentMethod;
use crate::domain::outcome::{PaymentOutcome, VerificationOutcome};
use crate::domain::repository::PaymentProcessor;
use crate::domain::request::PaymentRequest;
use crate::error::{ProviderError, ProviderResult};
use crate::infra::http::{endpoint, message_or, read_json, string_field};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;

pub const INITIATED_STATUS: &str = "pending";

/// Initiation body; amount in major units
#[derive(Debug, Serialize)]
pub(crate) struct StcPayInitiateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<&'a str>,
    pub amount: f64,
    pub currency: &'a str,
    pub order_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<&'a str>,
    pub timestamp: i64,
}

impl<'a> StcPayInitiateBody<'a> {
    pub fn new(config: &'a MerchantConfig, request: &'a PaymentRequest, now_ms: i64) -> Self {
        Self {
            merchant_id: config.merchant_id.as_deref(),
            amount: request.amount,
            currency: &request.currency,
            order_id: &request.order_id,
            customer_phone: request.phone_number.as_deref(),
            return_url: request.return_url.as_deref(),
            callback_url: request.callback_url.as_deref(),
            timestamp: now_ms,
        }
    }
}

#[derive(Clone)]
pub struct StcPayProcessor {
    client: Client,
    config: MerchantConfig,
}

impl StcPayProcessor {
    pub fn new(client: Client, config: MerchantConfig) -> Self {
        Self { client, config }
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }
}

impl PaymentProcessor for StcPayProcessor {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::StcPay
    }

    async fn process_payment(&self, request: &PaymentRequest) -> ProviderResult<PaymentOutcome> {
        let body = StcPayInitiateBody::new(&self.config, request, Utc::now().timestamp_millis());

        let response = self
            .client
            .post(endpoint(&self.config.base_url, "/payments/initiate"))
            .bearer_auth(self.api_key())
            .json(&body)
            .send()
            .await?;
        let (ok, result) = read_json(response).await?;

        if !ok {
            return Ok(PaymentOutcome::failed(
                PaymentMethod::StcPay,
                message_or(&result, "STC Pay payment failed"),
            )
            .with_code(result.get("error_code").cloned()));
        }

        Ok(PaymentOutcome::succeeded(PaymentMethod::StcPay)
            .with_payment_url(string_field(&result, "payment_url"))
            .with_transaction_id(string_field(&result, "transaction_id"))
            .with_status(Some(INITIATED_STATUS.to_string()))
            .with_provider_response(result))
    }

    async fn verify_payment(&self, transaction_id: &str) -> ProviderResult<VerificationOutcome> {
        let response = self
            .client
            .get(endpoint(
                &self.config.base_url,
                &format!("/payments/{transaction_id}/status"),
            ))
            .bearer_auth(self.api_key())
            .send()
            .await?;
        let (ok, result) = read_json(response).await?;
        Ok(VerificationOutcome::reported(ok, string_field(&result, "status"), result))
    }

    async fn capture_payment(&self, _order_id: &str) -> ProviderResult<VerificationOutcome> {
        Err(ProviderError::Unsupported(PaymentMethod::StcPay))
    }
}
