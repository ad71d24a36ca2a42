//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use auth::{TokenService, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
    middleware::from_fn_with_state,
};
use payment::{PaymentRouter, PgTransactionRepository, build_processors, payment_router};
use platform::kv::PgKvStore;
use platform::rate_limit::{RateLimitState, enforce_rate_limit};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,payment=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired rate-limit windows
    // Errors here should not prevent server startup
    let kv = Arc::new(PgKvStore::new(pool.clone()));
    if let Err(e) = kv.cleanup_expired().await {
        tracing::warn!(
            error = %e,
            "KV cleanup failed, continuing anyway"
        );
    }

    // Auth
    let tokens = Arc::new(TokenService::new(Arc::new(config.auth)));

    // Payments
    let processors = build_processors(&config.payment)?;
    let transactions = Arc::new(PgTransactionRepository::new(pool.clone()));
    let payments = Arc::new(PaymentRouter::new(
        processors,
        transactions,
        config.payment.timeout,
    ));
    tracing::info!(
        methods = ?payments.supported_methods(),
        timeout_secs = config.payment.timeout_secs(),
        "Payment router ready"
    );

    // Rate limits
    let api_limit = RateLimitState::new(kv.clone(), config.api_limit);
    let auth_limit = RateLimitState::new(kv.clone(), config.auth_limit);
    let payments_limit = RateLimitState::new(kv, config.payments_limit);

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            auth_router(tokens.clone(), auth_limit),
        )
        .nest(
            "/api/payments",
            payment_router(payments, tokens)
                .layer(from_fn_with_state(payments_limit, enforce_rate_limit::<PgKvStore>)),
        )
        .layer(from_fn_with_state(api_limit, enforce_rate_limit::<PgKvStore>))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = config.bind_addr;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
