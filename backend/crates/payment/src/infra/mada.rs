//! MADA card processor

use crate::application::config::MerchantConfig;
use crate::domain::method::PaymentMethod;
use crate::domain::outcome::{PaymentOutcome, VerificationOutcome};
use crate::domain::repository::PaymentProcessor;
use crate::domain::request::PaymentRequest;
use crate::error::{ProviderError, ProviderResult};
use crate::infra::http::{endpoint, message_or, read_json, string_field};
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;

/// Charge body; amount in halalas
#[derive(Debug, Serialize)]
pub(crate) struct MadaChargeBody<'a> {
    pub merchant_id: &'a str,
    pub amount: i64,
    pub currency: &'a str,
    pub order_id: &'a str,
    pub card_number: &'a str,
    pub expiry_month: &'a str,
    pub expiry_year: &'a str,
    pub cvv: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<&'a str>,
    pub timestamp: String,
}

#[derive(Clone)]
pub struct MadaProcessor {
    client: Client,
    config: MerchantConfig,
}

impl MadaProcessor {
    pub fn new(client: Client, config: MerchantConfig) -> Self {
        Self { client, config }
    }
}

impl PaymentProcessor for MadaProcessor {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Mada
    }

    async fn process_payment(&self, request: &PaymentRequest) -> ProviderResult<PaymentOutcome> {
        let (api_key, merchant_id) = self
            .config
            .credentials()
            .ok_or(ProviderError::MissingCredentials("MADA"))?;
        let card = request
            .card_data
            .as_ref()
            .ok_or(ProviderError::MissingField("cardData"))?;

        let body = MadaChargeBody {
            merchant_id,
            amount: request.minor_units(),
            currency: &request.currency,
            order_id: &request.order_id,
            card_number: &card.number,
            expiry_month: &card.expiry_month,
            expiry_year: &card.expiry_year,
            cvv: &card.cvv,
            cardholder_name: card.holder_name.as_deref(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let response = self
            .client
            .post(endpoint(&self.config.base_url, "/payments"))
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;
        let (ok, result) = read_json(response).await?;

        if !ok {
            return Ok(PaymentOutcome::failed(
                PaymentMethod::Mada,
                message_or(&result, "MADA payment failed"),
            )
            .with_code(result.get("error_code").cloned()));
        }

        Ok(PaymentOutcome::succeeded(PaymentMethod::Mada)
            .with_transaction_id(string_field(&result, "transaction_id"))
            .with_status(string_field(&result, "status"))
            .with_amount(request.amount, request.currency.clone())
            .with_provider_response(result))
    }

    async fn verify_payment(&self, transaction_id: &str) -> ProviderResult<VerificationOutcome> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let response = self
            .client
            .get(endpoint(&self.config.base_url, &format!("/payments/{transaction_id}")))
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let (ok, result) = read_json(response).await?;
        Ok(VerificationOutcome::reported(ok, string_field(&result, "status"), result))
    }

    async fn capture_payment(&self, _order_id: &str) -> ProviderResult<VerificationOutcome> {
        Err(ProviderError::Unsupported(PaymentMethod::Mada))
    }
}

