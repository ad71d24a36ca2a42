//! Auth Middleware
//!
//! Middleware for requiring authentication on protected routes, and the
//! [`Principal`] extractor that reads what they attach.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::application::gate::{authenticate, authenticate_admin};
use crate::application::token_service::TokenService;
use crate::domain::principal::Principal;
use crate::error::AuthError;

/// Middleware that requires a valid bearer token
///
/// Use with `axum::middleware::from_fn_with_state(tokens, require_auth)`.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = authenticate(req.headers(), &tokens)?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Middleware that requires a valid bearer token with a truthy `isAdmin` claim
pub async fn require_admin(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = authenticate_admin(req.headers(), &tokens)?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}
