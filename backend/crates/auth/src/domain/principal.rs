//! Authenticated principal

use crate::domain::claims::Claims;
use serde::Serialize;
use serde_json::Value;

/// Verified claims of the caller, attached to the request after authentication
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Principal {
    claims: Claims,
}

impl Principal {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }

    pub fn user_id(&self) -> Option<&Value> {
        self.claims.user_id()
    }

    pub fn email(&self) -> Option<&str> {
        self.claims.email()
    }

    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self::new(claims)
    }
}
