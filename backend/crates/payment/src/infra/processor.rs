//! Configured processor set
//!
//! [`Processor`] closes the provider set so the router can hold all four in
//! one map without boxing.

use crate::application::config::PaymentConfig;
use crate::domain::method::PaymentMethod;
use crate::domain::outcome::{PaymentOutcome, VerificationOutcome};
use crate::domain::repository::PaymentProcessor;
use crate::domain::request::PaymentRequest;
use crate::error::ProviderResult;
use crate::infra::http::build_client;
use crate::infra::mada::MadaProcessor;
use crate::infra::paypal::PayPalProcessor;
use crate::infra::stc_pay::StcPayProcessor;
use crate::infra::stripe::StripeProcessor;

#[derive(Clone)]
pub enum Processor {
    Mada(MadaProcessor),
    StcPay(StcPayProcessor),
    Stripe(StripeProcessor),
    Paypal(PayPalProcessor),
}

/// One processor per supported method, sharing a single HTTP client
pub fn build_processors(config: &PaymentConfig) -> ProviderResult<Vec<Processor>> {
    let client = build_client(config.timeout)?;

    Ok(vec![
        Processor::Mada(MadaProcessor::new(client.clone(), config.mada.clone())),
        Processor::StcPay(StcPayProcessor::new(client.clone(), config.stc_pay.clone())),
        Processor::Stripe(StripeProcessor::new(client.clone(), config.stripe.clone())),
        Processor::Paypal(PayPalProcessor::new(client, config.paypal.clone())),
    ])
}

impl PaymentProcessor for Processor {
    fn method(&self) -> PaymentMethod {
        match self {
            Processor::Mada(p) => p.method(),
            Processor::StcPay(p) => p.method(),
            Processor::Stripe(p) => p.method(),
            Processor::Paypal(p) => p.method(),
        }
    }

    async fn process_payment(&self, request: &PaymentRequest) -> ProviderResult<PaymentOutcome> {
        match self {
            Processor::Mada(p) => p.process_payment(request).await,
            Processor::StcPay(p) => p.process_payment(request).await,
            Processor::Stripe(p) => p.process_payment(request).await,
            Processor::Paypal(p) => p.process_payment(request).await,
        }
    }

    async fn verify_payment(&self, transaction_id: &str) -> ProviderResult<VerificationOutcome> {
        match self {
            Processor::Mada(p) => p.verify_payment(transaction_id).await,
            Processor::StcPay(p) => p.verify_payment(transaction_id).await,
            Processor::Stripe(p) => p.verify_payment(transaction_id).await,
            Processor::Paypal(p) => p.verify_payment(transaction_id).await,
        }
    }

    async fn capture_payment(&self, order_id: &str) -> ProviderResult<VerificationOutcome> {
        match self {
            Processor::Mada(p) => p.capture_payment(order_id).await,
            Processor::StcPay(p) => p.capture_payment(order_id).await,
            Processor::Stripe(p) => p.capture_payment(order_id).await,
            Processor::Paypal(p) => p.capture_payment(order_id).await,
        }
    }
}
