//! Application Configuration
//!
//! Configuration for the Auth application layer.

use platform::crypto::random_bytes;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing secret (empty fails closed)
    pub secret: Vec<u8>,
    /// Lifetime of tokens issued without an explicit TTL
    pub default_ttl: String,
    /// Lifetime of password-reset tokens
    pub password_reset_ttl: String,
    /// Tokens with less than this many seconds left are reissued on refresh
    pub refresh_threshold_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: Vec::new(),
            default_ttl: "7d".to_string(),
            password_reset_ttl: "1h".to_string(),
            refresh_threshold_secs: 86_400,
        }
    }
}

impl AuthConfig {
    /// Create config with the given signing secret
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create config with a random signing secret (for development)
    ///
    /// Tokens do not survive a restart.
    pub fn development() -> Self {
        Self::with_secret(random_bytes(32))
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[REDACTED]")
            .field("default_ttl", &self.default_ttl)
            .field("password_reset_ttl", &self.password_reset_ttl)
            .field("refresh_threshold_secs", &self.refresh_threshold_secs)
            .finish()
    }
}
