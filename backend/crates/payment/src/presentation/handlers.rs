//! HTTP Handlers

use auth::Principal;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

use crate::application::router::PaymentRouter;
use crate::domain::outcome::{PaymentOutcome, VerificationOutcome};
use crate::domain::repository::{PaymentProcessor, TransactionRepository};
use crate::error::{PaymentError, PaymentResult};
use crate::presentation::dto::{
    CreatePaymentRequest, MethodInfo, MethodsData, MethodsResponse, VerifyQuery,
};

/// Shared state for payment handlers
pub struct PaymentAppState<P, T> {
    pub router: Arc<PaymentRouter<P, T>>,
}

impl<P, T> Clone for PaymentAppState<P, T> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
        }
    }
}

fn status_for(success: bool) -> StatusCode {
    if success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}

/// POST /api/payments
pub async fn create_payment<P, T>(
    State(state): State<PaymentAppState<P, T>>,
    principal: Principal,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> PaymentResult<(StatusCode, Json<PaymentOutcome>)>
where
    P: PaymentProcessor + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
{
    let Json(body) = payload.map_err(|e| PaymentError::InvalidPayload(e.body_text()))?;

    let mut request = body.into_request()?;
    request.user_id = principal.user_id().cloned();
    request.user_email = principal.email().map(str::to_string);

    let processed = state.router.process_payment(&request).await?;
    let outcome = processed.outcome;
    Ok((status_for(outcome.success), Json(outcome)))
}

/// GET /api/payments/{transaction_id}/verify?method=
pub async fn verify_payment<P, T>(
    State(state): State<PaymentAppState<P, T>>,
    Path(transaction_id): Path<String>,
    Query(query): Query<VerifyQuery>,
) -> PaymentResult<Json<VerificationOutcome>>
where
    P: PaymentProcessor + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
{
    let outcome = state
        .router
        .verify_payment(&transaction_id, &query.method)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/payments/paypal/{order_id}/capture
pub async fn capture_payment<P, T>(
    State(state): State<PaymentAppState<P, T>>,
    Path(order_id): Path<String>,
) -> PaymentResult<(StatusCode, Json<VerificationOutcome>)>
where
    P: PaymentProcessor + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
{
    let outcome = state.router.capture_payment(&order_id).await?;
    Ok((status_for(outcome.success), Json(outcome)))
}

/// GET /api/payments/methods
pub async fn list_methods<P, T>(State(state): State<PaymentAppState<P, T>>) -> Json<MethodsResponse>
where
    P: PaymentProcessor + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
{
    let payment_methods = state
        .router
        .supported_methods()
        .into_iter()
        .map(MethodInfo::from)
        .collect();

    Json(MethodsResponse {
        status: "success",
        data: MethodsData { payment_methods },
    })
}
