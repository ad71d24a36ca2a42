//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use kernel::error::app_error::AppError;
use std::sync::Arc;

use crate::application::gate::bearer_token;
use crate::application::token_service::TokenService;
use crate::domain::principal::Principal;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    PasswordResetVerifyRequest, PasswordResetVerifyResponse, RefreshResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState {
    pub tokens: Arc<TokenService>,
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AuthAppState>,
    headers: HeaderMap,
) -> AuthResult<Json<RefreshResponse>> {
    let token = bearer_token(&headers).ok_or(AuthError::MissingCredentials)?;
    let refreshed = state.tokens.refresh(token)?;

    Ok(Json(RefreshResponse {
        token: refreshed.token,
        refreshed: refreshed.refreshed,
    }))
}

/// GET /api/auth/me
pub async fn me(principal: Principal) -> Json<Principal> {
    Json(principal)
}

/// POST /api/auth/password-reset/verify
pub async fn verify_password_reset(
    State(state): State<AuthAppState>,
    Json(req): Json<PasswordResetVerifyRequest>,
) -> Result<Json<PasswordResetVerifyResponse>, AppError> {
    match state.tokens.verify_password_reset(&req.token) {
        Ok(user_id) => Ok(Json(PasswordResetVerifyResponse {
            valid: true,
            user_id,
        })),
        Err(e) => Err(AppError::bad_request(e.to_string()).with_detail("valid", false)),
    }
}
