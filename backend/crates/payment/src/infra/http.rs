//! Shared HTTP plumbing for provider clients

use crate::error::{ProviderError, ProviderResult};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Build the client shared by every provider
pub fn build_client(timeout: Duration) -> ProviderResult<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("payment/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Read a provider body as JSON, returning it with the 2xx flag
///
/// An empty body reads as `{}`; anything else that is not JSON is an
/// [`ProviderError::InvalidResponse`].
pub async fn read_json(response: reqwest::Response) -> ProviderResult<(bool, Value)> {
    let ok = response.status().is_success();
    let status = response.status();
    let text = response.text().await?;

    if text.trim().is_empty() {
        return Ok((ok, Value::Object(Default::default())));
    }

    let body = serde_json::from_str(&text).map_err(|e| {
        ProviderError::InvalidResponse(format!("HTTP {status}: {e}"))
    })?;
    Ok((ok, body))
}

/// A string field, accepting numbers as well
pub fn string_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Provider message or the given fallback
pub fn message_or(body: &Value, fallback: &str) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Base URL without a trailing slash
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
