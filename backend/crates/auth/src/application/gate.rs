//! Auth Gate
//!
//! Bearer-token authentication and the admin check, independent of axum
//! plumbing so they can be called from middleware, extractors or handlers.

use crate::application::token_service::TokenService;
use crate::domain::principal::Principal;
use crate::error::{AuthError, AuthResult};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

const BEARER_PREFIX: &str = "Bearer ";

/// Token from `Authorization: Bearer <token>`; the scheme is case-sensitive
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}

/// Verify the bearer token and return the caller's principal
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> AuthResult<Principal> {
    let token = bearer_token(headers).ok_or(AuthError::MissingCredentials)?;
    let claims = tokens.verify(token)?;
    Ok(Principal::new(claims))
}

/// Admit only principals whose `isAdmin` claim is truthy
pub fn authorize_admin(principal: Principal) -> AuthResult<Principal> {
    if principal.is_admin() {
        Ok(principal)
    } else {
        Err(AuthError::AdminRequired)
    }
}

/// [`authenticate`] then [`authorize_admin`]; authentication failures stay 401
pub fn authenticate_admin(headers: &HeaderMap, tokens: &TokenService) -> AuthResult<Principal> {
    authorize_admin(authenticate(headers, tokens)?)
}
