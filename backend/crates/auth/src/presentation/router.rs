//! Auth Router

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use platform::kv::KvStore;
use platform::rate_limit::{RateLimitState, enforce_rate_limit};
use std::sync::Arc;

use crate::application::token_service::TokenService;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_auth;

/// Create the Auth router
///
/// `attempts` limits the routes that accept a credential (`/refresh`,
/// `/password-reset/verify`); `/me` is left to the caller's general limit.
pub fn auth_router<S>(tokens: Arc<TokenService>, attempts: RateLimitState<S>) -> Router
where
    S: KvStore + Send + Sync + 'static,
{
    let state = AuthAppState {
        tokens: tokens.clone(),
    };

    let session = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(from_fn_with_state(tokens, require_auth));

    let credentials = Router::new()
        .route("/refresh", post(handlers::refresh))
        .route(
            "/password-reset/verify",
            post(handlers::verify_password_reset),
        )
        .route_layer(from_fn_with_state(attempts, enforce_rate_limit::<S>));

    session.merge(credentials).with_state(state)
}
