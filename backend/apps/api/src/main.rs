//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::{AuthAppState, KvAuthRepository, auth_routes};
use axum::{
    Router,
    http::{Method, header},
    routing::get,
};
use platform::kv::{KvStore, RedisStore};
use redemption::{KvBeneficiaryRepository, redemption_router};
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
                "api=info,auth=info,redemption=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Store pool; connections are opened lazily
    let store = Arc::new(RedisStore::connect(&config.store)?);

    // An unreachable store should not prevent server startup
    match store.ping().await {
        Ok(()) => tracing::info!(url = %config.store.url, "Connected to store"),
        Err(e) => tracing::warn!(error = %e, "Store ping failed, continuing anyway"),
    }

    let session_key_prefix = config.auth.session_key_prefix.clone();
    let auth_state = AuthAppState::new(
        KvAuthRepository::new(store.clone(), session_key_prefix),
        config.auth,
    );
    let beneficiaries = KvBeneficiaryRepository::new(store.clone());

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(config.frontend_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth_routes(auth_state.clone()))
        .nest(
            "/api",
            redemption_router(auth_state, beneficiaries, config.redemption),
        )
        .merge(
            Router::new()
                .route("/health", get(health::health::<RedisStore>))
                .with_state(store),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
