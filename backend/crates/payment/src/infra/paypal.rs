//! PayPal approval-flow processor
//!
//! Every call first exchanges the client credentials for an access token.
//! A created order must be approved by the customer at `paymentUrl` and then
//! captured.

use crate::application::config::PayPalConfig;
use crate::domain::method::PaymentMethod;
use crate::domain::outcome::{PaymentOutcome, VerificationOutcome};
use crate::domain::repository::PaymentProcessor;
use crate::domain::request::PaymentRequest;
use crate::error::{ProviderError, ProviderResult};
use crate::infra::http::{endpoint, message_or, read_json, string_field};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

pub const COMPLETED_STATUS: &str = "COMPLETED";
const APPROVE_REL: &str = "approve";

#[derive(Debug, Serialize)]
pub(crate) struct OrderBody<'a> {
    pub intent: &'static str,
    pub purchase_units: [PurchaseUnit<'a>; 1],
    pub application_context: ApplicationContext<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PurchaseUnit<'a> {
    pub reference_id: &'a str,
    pub amount: OrderAmount<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderAmount<'a> {
    pub currency_code: &'a str,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApplicationContext<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<&'a str>,
}

impl<'a> OrderBody<'a> {
    pub fn new(request: &'a PaymentRequest) -> Self {
        Self {
            intent: "CAPTURE",
            purchase_units: [PurchaseUnit {
                reference_id: &request.order_id,
                amount: OrderAmount {
                    currency_code: &request.currency,
                    value: request.decimal_amount(),
                },
            }],
            application_context: ApplicationContext {
                return_url: request.return_url.as_deref(),
                cancel_url: request.cancel_url.as_deref(),
            },
        }
    }
}

/// `href` of the link with `rel == "approve"`
pub(crate) fn approval_url(order: &Value) -> Option<String> {
    order
        .get("links")?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some(APPROVE_REL))
        .and_then(|link| string_field(link, "href"))
}

#[derive(Clone)]
pub struct PayPalProcessor {
    client: Client,
    config: PayPalConfig,
}

impl PayPalProcessor {
    pub fn new(client: Client, config: PayPalConfig) -> Self {
        Self { client, config }
    }

    async fn access_token(&self) -> ProviderResult<String> {
        let response = self
            .client
            .post(endpoint(&self.config.base_url, "/v1/oauth2/token"))
            .basic_auth(
                self.config.client_id.as_deref().unwrap_or_default(),
                self.config.client_secret.as_deref(),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let (ok, body) = read_json(response).await?;

        match string_field(&body, "access_token") {
            Some(token) if ok => Ok(token),
            _ => {
                let reason = body
                    .get("error_description")
                    .and_then(Value::as_str)
                    .unwrap_or("no access token returned");
                Err(ProviderError::Auth(reason.to_string()))
            }
        }
    }
}

impl PaymentProcessor for PayPalProcessor {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Paypal
    }

    async fn process_payment(&self, request: &PaymentRequest) -> ProviderResult<PaymentOutcome> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(endpoint(&self.config.base_url, "/v2/checkout/orders"))
            .bearer_auth(&token)
            .json(&OrderBody::new(request))
            .send()
            .await?;
        let (ok, result) = read_json(response).await?;

        if !ok {
            let details = result.get("details").cloned().unwrap_or(Value::Null);
            return Ok(PaymentOutcome::failed(
                PaymentMethod::Paypal,
                message_or(&result, "PayPal payment failed"),
            )
            .with_details(details));
        }

        Ok(PaymentOutcome::succeeded(PaymentMethod::Paypal)
            .with_payment_url(approval_url(&result))
            .with_transaction_id(string_field(&result, "id"))
            .with_status(string_field(&result, "status"))
            .with_provider_response(result))
    }

    async fn verify_payment(&self, transaction_id: &str) -> ProviderResult<VerificationOutcome> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(endpoint(
                &self.config.base_url,
                &format!("/v2/checkout/orders/{transaction_id}"),
            ))
            .bearer_auth(&token)
            .send()
            .await?;
        let (ok, result) = read_json(response).await?;
        Ok(VerificationOutcome::reported(ok, string_field(&result, "status"), result))
    }

    async fn capture_payment(&self, order_id: &str) -> ProviderResult<VerificationOutcome> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(endpoint(
                &self.config.base_url,
                &format!("/v2/checkout/orders/{order_id}/capture"),
            ))
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let (ok, result) = read_json(response).await?;

        let status = string_field(&result, "status");
        let completed = ok && status.as_deref() == Some(COMPLETED_STATUS);
        if completed {
            tracing::info!(order_id = %order_id, "PayPal order captured");
        }
        Ok(VerificationOutcome::reported(completed, status, result))
    }
}
