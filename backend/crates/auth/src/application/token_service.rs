//! Token Service
//!
//! Issues, verifies and refreshes HS256 tokens, and the single-purpose
//! password-reset tokens built on them.
//!
//! Wire format: `b64url(header) "." b64url(claims) "." b64url(hmac(header.claims))`.

use crate::application::config::AuthConfig;
use crate::domain::claims::{Claims, PASSWORD_RESET_TYPE, TYPE_CLAIM, TokenHeader};
use crate::domain::token_ttl::TokenTtl;
use crate::error::TokenError;
use chrono::Utc;
use platform::crypto::{Signer, decode_base64url_text, encode_base64url_text};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Result of [`TokenService::refresh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    pub token: String,
    /// False when the presented token was returned unchanged
    pub refreshed: bool,
}

/// Stateless token issuer and verifier
pub struct TokenService {
    signer: Signer,
    config: Arc<AuthConfig>,
}

impl TokenService {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        if config.secret.is_empty() {
            tracing::warn!("Token signing secret is empty; every token will be rejected");
        }
        Self {
            signer: Signer::new(config.secret.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Issue a token for `payload`, valid for `ttl` (default lifetime when `None`)
    pub fn issue(&self, payload: Map<String, Value>, ttl: Option<&str>) -> Result<String, TokenError> {
        self.issue_at(payload, ttl, now_secs())
    }

    /// [`issue`](Self::issue) with an explicit clock (seconds since epoch)
    pub fn issue_at(
        &self,
        payload: Map<String, Value>,
        ttl: Option<&str>,
        now: i64,
    ) -> Result<String, TokenError> {
        let ttl = TokenTtl::parse(ttl.unwrap_or(&self.config.default_ttl));
        let claims = Claims::from_payload(payload).stamped(now, ttl.as_secs());

        let header = encode_base64url_text(&serde_json::to_string(&TokenHeader::default())?);
        let body = encode_base64url_text(&serde_json::to_string(&claims)?);
        let signing_input = format!("{header}.{body}");
        let signature = self.signer.sign(&signing_input)?;

        tracing::info!(ttl_secs = ttl.as_secs(), exp = ?claims.exp, "Issued token");

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, now_secs())
    }

    /// [`verify`](Self::verify) with an explicit clock (seconds since epoch)
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header, body, signature] = parts.as_slice() else {
            return Err(TokenError::Malformed);
        };

        if !self.signer.verify(&format!("{header}.{body}"), signature) {
            return Err(TokenError::InvalidSignature);
        }

        let header: TokenHeader = decode_segment(header)?;
        if !header.is_supported() {
            return Err(TokenError::Malformed);
        }

        let claims: Claims = decode_segment(body)?;
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Reissue a valid token that expires within the refresh threshold
    ///
    /// The new token keeps every claim except `iat`/`exp` and gets the default lifetime.
    pub fn refresh(&self, token: &str) -> Result<RefreshedToken, TokenError> {
        self.refresh_at(token, now_secs())
    }

    pub fn refresh_at(&self, token: &str, now: i64) -> Result<RefreshedToken, TokenError> {
        let claims = self.verify_at(token, now)?;

        let expiring = claims
            .remaining_secs(now)
            .is_some_and(|left| left < self.config.refresh_threshold_secs);
        if !expiring {
            return Ok(RefreshedToken {
                token: token.to_string(),
                refreshed: false,
            });
        }

        let token = self.issue_at(claims.into_payload(), None, now)?;
        tracing::debug!("Refreshed expiring token");
        Ok(RefreshedToken {
            token,
            refreshed: true,
        })
    }

    /// Issue a one-hour password-reset token for `user_id`
    pub fn issue_password_reset(&self, user_id: impl Into<Value>) -> Result<String, TokenError> {
        self.issue_password_reset_at(user_id, now_secs())
    }

    pub fn issue_password_reset_at(
        &self,
        user_id: impl Into<Value>,
        now: i64,
    ) -> Result<String, TokenError> {
        let mut payload = Map::new();
        payload.insert("userId".to_string(), user_id.into());
        payload.insert(TYPE_CLAIM.to_string(), Value::from(PASSWORD_RESET_TYPE));
        payload.insert("timestamp".to_string(), Value::from(now * 1000));
        self.issue_at(payload, Some(&self.config.password_reset_ttl), now)
    }

    /// Verify a password-reset token and return its `userId`
    ///
    /// Any failure, including a valid token of another type, is [`TokenError::WrongPurpose`].
    pub fn verify_password_reset(&self, token: &str) -> Result<Value, TokenError> {
        self.verify_password_reset_at(token, now_secs())
    }

    pub fn verify_password_reset_at(&self, token: &str, now: i64) -> Result<Value, TokenError> {
        let claims = self.verify_at(token, now).map_err(|e| {
            tracing::debug!(error = %e, "Password reset token rejected");
            TokenError::WrongPurpose
        })?;

        if claims.token_type() != Some(PASSWORD_RESET_TYPE) {
            return Err(TokenError::WrongPurpose);
        }
        claims.user_id().cloned().ok_or(TokenError::WrongPurpose)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .finish()
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let json = decode_base64url_text(segment).map_err(|_| TokenError::Malformed)?;
    serde_json::from_str(&json).map_err(|_| TokenError::Malformed)
}

fn now_secs() -> i64 {
    Utc::now().timestamp()
}
