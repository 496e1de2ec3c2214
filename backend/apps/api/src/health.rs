//! Liveness endpoint

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use platform::kv::KvStore;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub store: &'static str,
}

/// GET /health
pub async fn health<S>(State(store): State<Arc<S>>) -> (StatusCode, Json<HealthResponse>)
where
    S: KvStore + Send + Sync + 'static,
{
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                success: true,
                store: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    success: false,
                    store: "unavailable",
                }),
            )
        }
    }
}
