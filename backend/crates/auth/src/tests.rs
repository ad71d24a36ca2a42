//! Unit tests for Auth crate

#[cfg(test)]
mod support {
    use crate::application::config::AuthConfig;
    use crate::application::token_service::TokenService;
    use serde_json::{Map, Value};
    use std::sync::Arc;

    pub const NOW: i64 = 1_700_000_000;

    pub fn service() -> TokenService {
        TokenService::new(Arc::new(AuthConfig::with_secret("test-secret")))
    }

    pub fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }
}

#[cfg(test)]
mod token_service_tests {
    use super::support::{NOW, payload, service};
    use crate::application::config::AuthConfig;
    use crate::application::token_service::TokenService;
    use crate::error::TokenError;
    use platform::crypto::{Signer, encode_base64url_text};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_issue_verify_round_trip() {
        let tokens = service();
        let token = tokens
            .issue(payload(json!({"userId": 42, "email": "a@example.com", "isAdmin": false})), Some("1h"))
            .unwrap();

        assert_eq!(token.split('.').count(), 3);
        assert!(token.starts_with("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9."));

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id(), Some(&json!(42)));
        assert_eq!(claims.email(), Some("a@example.com"));
        assert!(!claims.is_admin());
        let (iat, exp) = (claims.iat.unwrap(), claims.exp.unwrap());
        assert_eq!(exp - iat, 3600);
        assert_eq!(claims.extra.len(), 3);
    }

    #[test]
    fn test_default_ttl_is_seven_days() {
        let tokens = service();
        let token = tokens.issue_at(payload(json!({"userId": 1})), None, NOW).unwrap();
        let claims = tokens.verify_at(&token, NOW).unwrap();
        assert_eq!(claims.exp, Some(NOW + 7 * 86_400));
    }

    #[test]
    fn test_malformed_ttl_defaults_to_one_day() {
        let tokens = service();
        let token = tokens
            .issue_at(payload(json!({"userId": 1})), Some("soon"), NOW)
            .unwrap();
        let claims = tokens.verify_at(&token, NOW).unwrap();
        assert_eq!(claims.exp, Some(NOW + 86_400));
    }

    #[test]
    fn test_oversized_ttl_defaults_to_one_day() {
        let tokens = service();
        let token = tokens
            .issue_at(payload(json!({"userId": 1})), Some("15250284452471w"), NOW)
            .unwrap();
        let claims = tokens.verify_at(&token, NOW).unwrap();
        assert_eq!(claims.exp, Some(NOW + 86_400));
    }

    #[test]
    fn test_caller_supplied_stamps_are_overwritten() {
        let tokens = service();
        let token = tokens
            .issue_at(payload(json!({"userId": 1, "iat": 1, "exp": 2})), Some("1m"), NOW)
            .unwrap();
        let claims = tokens.verify_at(&token, NOW).unwrap();
        assert_eq!(claims.iat, Some(NOW));
        assert_eq!(claims.exp, Some(NOW + 60));
    }

    #[test]
    fn test_expiry() {
        let tokens = service();
        let token = tokens
            .issue_at(payload(json!({"userId": 1})), Some("1s"), NOW)
            .unwrap();

        assert!(tokens.verify_at(&token, NOW + 1).is_ok());
        assert!(matches!(tokens.verify_at(&token, NOW + 2), Err(TokenError::Expired)));
    }

    #[test]
    fn test_expiry_in_real_time() {
        let tokens = service();
        let token = tokens.issue(payload(json!({"userId": 1})), Some("1s")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2100));
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_signature_tamper_detection() {
        let tokens = service();
        let token = tokens.issue(payload(json!({"userId": 7})), Some("1h")).unwrap();
        let sig_start = token.rfind('.').unwrap() + 1;

        for i in sig_start..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(
                matches!(tokens.verify(&tampered), Err(TokenError::InvalidSignature)),
                "position {i}"
            );
        }
    }

    #[test]
    fn test_payload_tamper_detection() {
        let tokens = service();
        let token = tokens.issue(payload(json!({"isAdmin": false})), Some("1h")).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged = encode_base64url_text(r#"{"isAdmin":true,"exp":9999999999}"#);
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);
        assert!(matches!(tokens.verify(&tampered), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_segment_count() {
        let tokens = service();
        for token in ["", "abc", "a.b", "a.b.c.d", "...."] {
            assert!(matches!(tokens.verify(token), Err(TokenError::Malformed)), "{token:?}");
        }
    }

    #[test]
    fn test_signed_garbage_is_malformed() {
        let signer = Signer::new("test-secret");
        let tokens = service();

        let header = encode_base64url_text(r#"{"alg":"HS256","typ":"JWT"}"#);
        for body in [encode_base64url_text("not json"), encode_base64url_text("[1,2]"), "%%%".to_string()] {
            let input = format!("{header}.{body}");
            let token = format!("{input}.{}", signer.sign(&input).unwrap());
            assert!(matches!(tokens.verify(&token), Err(TokenError::Malformed)));
        }
    }

    #[test]
    fn test_unsupported_alg_is_malformed() {
        let signer = Signer::new("test-secret");
        let header = encode_base64url_text(r#"{"alg":"none","typ":"JWT"}"#);
        let body = encode_base64url_text(r#"{"userId":1}"#);
        let input = format!("{header}.{body}");
        let token = format!("{input}.{}", signer.sign(&input).unwrap());

        assert!(matches!(service().verify(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = service().issue(payload(json!({"userId": 1})), None).unwrap();
        let other = TokenService::new(Arc::new(AuthConfig::with_secret("other-secret")));
        assert!(matches!(other.verify(&token), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_empty_secret_fails_closed() {
        let empty = TokenService::new(Arc::new(AuthConfig::default()));
        assert!(matches!(
            empty.issue(payload(json!({"userId": 1})), None),
            Err(TokenError::Signing(_))
        ));

        let token = service().issue(payload(json!({"userId": 1})), None).unwrap();
        assert!(matches!(empty.verify(&token), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_refresh_expiring_token() {
        let tokens = service();
        let token = tokens
            .issue_at(payload(json!({"userId": 5, "isAdmin": true})), Some("1h"), NOW)
            .unwrap();

        let later = NOW + 600;
        let refreshed = tokens.refresh_at(&token, later).unwrap();
        assert!(refreshed.refreshed);
        assert_ne!(refreshed.token, token);

        let claims = tokens.verify_at(&refreshed.token, later).unwrap();
        assert_eq!(claims.iat, Some(later));
        assert_eq!(claims.exp, Some(later + 7 * 86_400));
        assert_eq!(claims.user_id(), Some(&json!(5)));
        assert!(claims.is_admin());
    }

    #[test]
    fn test_refresh_keeps_fresh_token() {
        let tokens = service();
        let token = tokens.issue_at(payload(json!({"userId": 5})), Some("7d"), NOW).unwrap();

        let result = tokens.refresh_at(&token, NOW + 60).unwrap();
        assert!(!result.refreshed);
        assert_eq!(result.token, token);
    }

    #[test]
    fn test_refresh_rejects_invalid_token() {
        let tokens = service();
        let token = tokens.issue_at(payload(json!({"userId": 5})), Some("1m"), NOW).unwrap();
        assert!(matches!(tokens.refresh_at(&token, NOW + 120), Err(TokenError::Expired)));
        assert!(matches!(tokens.refresh("a.b"), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_password_reset_round_trip() {
        let tokens = service();
        let token = tokens.issue_password_reset_at("user-9", NOW).unwrap();

        let claims = tokens.verify_at(&token, NOW).unwrap();
        assert_eq!(claims.token_type(), Some("password_reset"));
        assert_eq!(claims.get("timestamp"), Some(&json!(NOW * 1000)));
        assert_eq!(claims.exp, Some(NOW + 3600));

        assert_eq!(tokens.verify_password_reset_at(&token, NOW + 10).unwrap(), json!("user-9"));
    }

    #[test]
    fn test_password_reset_rejections() {
        let tokens = service();

        let session = tokens.issue_at(payload(json!({"userId": "user-9"})), None, NOW).unwrap();
        let err = tokens.verify_password_reset_at(&session, NOW).unwrap_err();
        assert!(matches!(err, TokenError::WrongPurpose));
        assert_eq!(err.to_string(), "Invalid reset token");

        let reset = tokens.issue_password_reset_at("user-9", NOW).unwrap();
        assert!(matches!(
            tokens.verify_password_reset_at(&reset, NOW + 3601),
            Err(TokenError::WrongPurpose)
        ));
        assert!(matches!(
            tokens.verify_password_reset("garbage"),
            Err(TokenError::WrongPurpose)
        ));
    }
}

#[cfg(test)]
mod gate_tests {
    use super::support::{payload, service};
    use crate::application::gate::{authenticate, authenticate_admin, bearer_token};
    use crate::error::{AuthError, TokenError};
    use axum::http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION};
    use serde_json::json;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Bearer ")), Some(""));
        assert_eq!(bearer_token(&headers("bearer abc")), None);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_end_to_end_user_flow() {
        let tokens = service();
        let token = tokens
            .issue(payload(json!({"userId": 42, "isAdmin": false})), Some("1h"))
            .unwrap();
        let auth = headers(&format!("Bearer {token}"));

        let principal = authenticate(&auth, &tokens).unwrap();
        assert_eq!(principal.user_id(), Some(&json!(42)));
        assert!(!principal.is_admin());

        let err = authenticate_admin(&auth, &tokens).unwrap_err();
        assert!(matches!(err, AuthError::AdminRequired));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = authenticate(&headers(""), &tokens).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_admin_gate() {
        let tokens = service();
        let admin = tokens
            .issue(payload(json!({"userId": 1, "isAdmin": true})), Some("1h"))
            .unwrap();
        let principal = authenticate_admin(&headers(&format!("Bearer {admin}")), &tokens).unwrap();
        assert!(principal.is_admin());

        // A broken token is never reported as forbidden
        let err = authenticate_admin(&headers("Bearer x.y.z"), &tokens).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(TokenError::InvalidSignature)));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::{AuthError, TokenError};
    use kernel::error::kind::ErrorKind;
    use platform::crypto::SignerError;
    use serde_json::json;

    #[test]
    fn test_rejection_bodies() {
        let body = AuthError::from(TokenError::Expired).to_app_error().to_body();
        assert_eq!(body, json!({"error": "Authentication required", "message": "Token expired"}));

        let body = AuthError::MissingCredentials.to_app_error().to_body();
        assert_eq!(body["message"], "Missing or invalid authorization header");

        let body = AuthError::AdminRequired.to_app_error().to_body();
        assert_eq!(body, json!({"error": "Admin access required"}));
    }

    #[test]
    fn test_issuance_failures_are_internal() {
        let err = AuthError::from(TokenError::Signing(SignerError::EmptySecret));
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
        let body = err.to_app_error().to_body();
        assert!(!body.to_string().contains("secret"));
    }

    #[test]
    fn test_token_error_messages() {
        assert_eq!(TokenError::Malformed.to_string(), "Invalid token format");
        assert_eq!(TokenError::InvalidSignature.to_string(), "Invalid signature");
        assert_eq!(TokenError::Expired.to_string(), "Token expired");
    }
}

#[cfg(test)]
mod router_tests {
    use super::support::{payload, service};
    use crate::application::token_service::TokenService;
    use crate::presentation::middleware::require_admin;
    use crate::presentation::router::auth_router;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use platform::kv::MemoryKvStore;
    use platform::rate_limit::{RateLimitConfig, RateLimitState};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn attempts(max_requests: u32) -> RateLimitState<MemoryKvStore> {
        let config = RateLimitConfig::new("auth", max_requests, 60_000, "Too many authentication attempts");
        RateLimitState::new(Arc::new(MemoryKvStore::new()), config)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn bearer(tokens: &TokenService, claims: Value) -> String {
        format!("Bearer {}", tokens.issue(payload(claims), Some("1h")).unwrap())
    }

    #[tokio::test]
    async fn test_me_requires_auth() {
        let tokens = Arc::new(service());
        let app = auth_router(tokens.clone(), attempts(5));

        let response = app
            .clone()
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Authentication required", "message": "Missing or invalid authorization header"})
        );

        let response = app
            .oneshot(
                Request::get("/me")
                    .header("authorization", bearer(&tokens, json!({"userId": 3})))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["userId"], 3);
        assert!(body["exp"].is_i64());
    }

    #[tokio::test]
    async fn test_refresh_route() {
        let tokens = Arc::new(service());
        let app = auth_router(tokens.clone(), attempts(5));

        let response = app
            .oneshot(
                Request::post("/refresh")
                    .header("authorization", bearer(&tokens, json!({"userId": 3})))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        // A one-hour token is inside the refresh threshold
        assert_eq!(body["refreshed"], true);
        assert!(tokens.verify(body["token"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_password_reset_verify_route() {
        let tokens = Arc::new(service());
        let app = auth_router(tokens.clone(), attempts(5));
        let reset = tokens.issue_password_reset("user-1").unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::post("/password-reset/verify")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"token": reset}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"valid": true, "userId": "user-1"}));

        let response = app
            .oneshot(
                Request::post("/password-reset/verify")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"token": "nope"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Invalid reset token", "valid": false})
        );
    }

    #[tokio::test]
    async fn test_attempt_limit_spares_me() {
        let tokens = Arc::new(service());
        let app = auth_router(tokens.clone(), attempts(1));
        let auth = bearer(&tokens, json!({"userId": 3}));

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(
                    Request::get("/me")
                        .header("authorization", auth.clone())
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get("x-ratelimit-limit").is_none());
        }

        let refresh = || {
            Request::post("/refresh")
                .header("authorization", auth.clone())
                .body(Body::empty())
                .unwrap()
        };
        let response = app.clone().oneshot(refresh()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");

        let response = app.clone().oneshot(refresh()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(response).await["error"], "Too many authentication attempts");

        let response = app
            .oneshot(
                Request::post("/password-reset/verify")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"token": "nope"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_require_admin_middleware() {
        let tokens = Arc::new(service());
        let app = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .layer(from_fn_with_state(tokens.clone(), require_admin));

        let send = |auth: Option<String>| {
            let app = app.clone();
            async move {
                let mut req = Request::get("/admin");
                if let Some(auth) = auth {
                    req = req.header("authorization", auth);
                }
                app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap().status()
            }
        };

        assert_eq!(send(None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            send(Some(bearer(&tokens, json!({"isAdmin": false})))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            send(Some(bearer(&tokens, json!({"isAdmin": true})))).await,
            StatusCode::OK
        );
    }
}
