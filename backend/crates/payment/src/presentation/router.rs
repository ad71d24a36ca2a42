//! Payment Router (HTTP)

use auth::TokenService;
use auth::middleware::{require_admin, require_auth};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::router::PaymentRouter;
use crate::domain::repository::{PaymentProcessor, TransactionRepository};
use crate::presentation::handlers::{self, PaymentAppState};

/// Create the Payment router
///
/// `GET /methods` is public, creating and capturing need a bearer token and
/// verification needs an admin token.
pub fn payment_router<P, T>(router: Arc<PaymentRouter<P, T>>, tokens: Arc<TokenService>) -> Router
where
    P: PaymentProcessor + Send + Sync + 'static,
    T: TransactionRepository + Send + Sync + 'static,
{
    let state = PaymentAppState { router };

    let authenticated = Router::new()
        .route("/", post(handlers::create_payment::<P, T>))
        .route(
            "/paypal/{order_id}/capture",
            post(handlers::capture_payment::<P, T>),
        )
        .route_layer(from_fn_with_state(tokens.clone(), require_auth));

    let admin = Router::new()
        .route(
            "/{transaction_id}/verify",
            get(handlers::verify_payment::<P, T>),
        )
        .route_layer(from_fn_with_state(tokens, require_admin));

    Router::new()
        .route("/methods", get(handlers::list_methods::<P, T>))
        .merge(authenticated)
        .merge(admin)
        .with_state(state)
}
