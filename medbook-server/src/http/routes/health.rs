//! Health check endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// GET /health
async fn health(State(pool): State<PgPool>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database, code) = match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => ("ok", "ok", StatusCode::OK),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            ("degraded", "unavailable", StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Health routes
pub fn router(pool: PgPool) -> Router {
    Router::new().route("/health", get(health)).with_state(pool)
}
