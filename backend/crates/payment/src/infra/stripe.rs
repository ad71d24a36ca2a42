//! Stripe card processor
//!
//! Creates and confirms a payment intent in one form-encoded call.

use crate::application::config::StripeConfig;
use crate::domain::method::PaymentMethod;
use crate::domain::outcome::{PaymentOutcome, VerificationOutcome};
use crate::domain::repository::PaymentProcessor;
use crate::domain::request::PaymentRequest;
use crate::error::{ProviderError, ProviderResult};
use crate::infra::http::{endpoint, read_json, string_field};
use reqwest::Client;
use serde_json::Value;

pub const SUCCEEDED_STATUS: &str = "succeeded";

/// Form fields of a confirmed card payment intent
pub(crate) fn intent_form(request: &PaymentRequest) -> ProviderResult<Vec<(&'static str, String)>> {
    let card = request
        .card_data
        .as_ref()
        .ok_or(ProviderError::MissingField("cardData"))?;

    Ok(vec![
        ("amount", request.minor_units().to_string()),
        ("currency", request.currency.to_lowercase()),
        ("metadata[order_id]", request.order_id.clone()),
        ("receipt_email", request.receipt_email().unwrap_or_default().to_string()),
        ("confirm", "true".to_string()),
        ("payment_method_data[type]", "card".to_string()),
        ("payment_method_data[card][number]", card.number.clone()),
        ("payment_method_data[card][exp_month]", card.expiry_month.clone()),
        ("payment_method_data[card][exp_year]", card.expiry_year.clone()),
        ("payment_method_data[card][cvc]", card.cvv.clone()),
    ])
}

fn error_field(body: &Value, key: &str) -> Option<Value> {
    body.get("error")?.get(key).cloned()
}

#[derive(Clone)]
pub struct StripeProcessor {
    client: Client,
    config: StripeConfig,
}

impl StripeProcessor {
    pub fn new(client: Client, config: StripeConfig) -> Self {
        Self { client, config }
    }

    fn secret_key(&self) -> &str {
        self.config.secret_key.as_deref().unwrap_or_default()
    }
}

impl PaymentProcessor for StripeProcessor {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Stripe
    }

    async fn process_payment(&self, request: &PaymentRequest) -> ProviderResult<PaymentOutcome> {
        let form = intent_form(request)?;

        let response = self
            .client
            .post(endpoint(&self.config.base_url, "/payment_intents"))
            .bearer_auth(self.secret_key())
            .form(&form)
            .send()
            .await?;
        let (ok, result) = read_json(response).await?;

        if !ok {
            let message = error_field(&result, "message")
                .and_then(|m| m.as_str().map(str::to_string))
                .unwrap_or_else(|| "Stripe payment failed".to_string());
            return Ok(PaymentOutcome::failed(PaymentMethod::Stripe, message)
                .with_code(error_field(&result, "code")));
        }

        let status = string_field(&result, "status");
        Ok(PaymentOutcome::succeeded(PaymentMethod::Stripe)
            .with_success(status.as_deref() == Some(SUCCEEDED_STATUS))
            .with_transaction_id(string_field(&result, "id"))
            .with_status(status)
            .with_amount(request.amount, request.currency.clone())
            .with_provider_response(result))
    }

    async fn verify_payment(&self, transaction_id: &str) -> ProviderResult<VerificationOutcome> {
        let response = self
            .client
            .get(endpoint(
                &self.config.base_url,
                &format!("/payment_intents/{transaction_id}"),
            ))
            .bearer_auth(self.secret_key())
            .send()
            .await?;
        let (ok, result) = read_json(response).await?;
        Ok(VerificationOutcome::reported(ok, string_field(&result, "status"), result))
    }

    async fn capture_payment(&self, _order_id: &str) -> ProviderResult<VerificationOutcome> {
        Err(ProviderError::Unsupported(PaymentMethod::Stripe))
    }
}
