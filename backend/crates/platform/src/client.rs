//! Client identification utilities
//!
//! Derives the client identity used to compose rate-limit keys.
//!
//! The forwarding headers are taken at face value. Deploy behind a proxy that
//! overwrites `CF-Connecting-IP` and `X-Forwarded-For`; otherwise a client can
//! pick its own rate-limit key by sending them.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Header set by Cloudflare to the original client address
pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";
/// Standard proxy chain header; the first entry is the client
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Extract client IP address from headers
///
/// Checks `CF-Connecting-IP`, then the first entry of `X-Forwarded-For`,
/// then falls back to the direct connection IP.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
///
/// ## Returns
/// The client IP address, or None if not determinable
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    if let Some(ip) = header_ip(headers, CF_CONNECTING_IP) {
        return Some(ip);
    }

    if let Some(xff) = headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

/// Client identity string for keying per-client state
///
/// Requests whose address cannot be determined share the `"unknown"` bucket.
pub fn client_key(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    extract_client_ip(headers, direct_ip)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_ip_cloudflare_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(CF_CONNECTING_IP, HeaderValue::from_static("203.0.113.7"));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("192.168.1.1"));

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let mut headers = HeaderMap::new();
        headers.insert(CF_CONNECTING_IP, HeaderValue::from_static("garbage"));
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_forwarded_header_overrides_peer() {
        let peer: IpAddr = "198.51.100.2".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("10.9.8.7"));
        assert_eq!(client_key(&headers, Some(peer)), "10.9.8.7");
        assert_eq!(client_key(&HeaderMap::new(), Some(peer)), "198.51.100.2");
    }

    #[test]
    fn test_client_key_unknown() {
        assert_eq!(client_key(&HeaderMap::new(), None), "unknown");
    }
}
