//! Token claims and header

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Only supported signing algorithm
pub const ALG_HS256: &str = "HS256";
pub const TYP_JWT: &str = "JWT";

/// Claim carried by single-purpose tokens
pub const TYPE_CLAIM: &str = "type";
pub const PASSWORD_RESET_TYPE: &str = "password_reset";

/// JOSE header of an issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: ALG_HS256.to_string(),
            typ: TYP_JWT.to_string(),
        }
    }
}

impl TokenHeader {
    pub fn is_supported(&self) -> bool {
        self.alg == ALG_HS256
    }
}

/// Claims payload
///
/// `iat`/`exp` are seconds since the epoch. Every other caller-supplied field
/// (`userId`, `email`, `isAdmin`, `type`, ...) is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Build claims from caller fields; reserved `iat`/`exp` keys are dropped
    pub fn from_payload(mut payload: Map<String, Value>) -> Self {
        payload.remove("iat");
        payload.remove("exp");
        Self {
            iat: None,
            exp: None,
            extra: payload,
        }
    }

    /// Stamp issued-at and expiry; the expiry saturates at `i64::MAX`
    pub fn stamped(mut self, now: i64, ttl_secs: i64) -> Self {
        self.iat = Some(now);
        self.exp = Some(now.saturating_add(ttl_secs));
        self
    }

    /// Caller fields without the time stamps
    pub fn into_payload(self) -> Map<String, Value> {
        self.extra
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn user_id(&self) -> Option<&Value> {
        self.get("userId")
    }

    pub fn email(&self) -> Option<&str> {
        self.get("email").and_then(Value::as_str)
    }

    /// Admin flag, following JSON truthiness (`1`, `"yes"` count; `0`, `""`, `null` do not)
    pub fn is_admin(&self) -> bool {
        self.get("isAdmin").is_some_and(is_truthy)
    }

    pub fn token_type(&self) -> Option<&str> {
        self.get(TYPE_CLAIM).and_then(Value::as_str)
    }

    /// Seconds left before `exp`, if the token expires at all
    pub fn remaining_secs(&self, now: i64) -> Option<i64> {
        self.exp.map(|exp| exp - now)
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| exp < now)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
