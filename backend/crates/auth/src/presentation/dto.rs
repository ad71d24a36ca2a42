//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Refresh
// ============================================================================

/// Refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    /// False when the presented token still had enough lifetime left
    pub refreshed: bool,
}

// ============================================================================
// Password Reset
// ============================================================================

/// Password reset verification request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetVerifyRequest {
    pub token: String,
}

/// Password reset verification response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetVerifyResponse {
    pub valid: bool,
    pub user_id: Value,
}
