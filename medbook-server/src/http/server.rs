//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use medbook_core::config::GatewayConfig;

use super::routes::{entity, health, patients};
use crate::error::ServerError;
use crate::service::Services;

const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(LOCAL_ORIGINS.map(HeaderValue::from_static))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// The full gateway: every entity under `/v1`, plus `/health`.
pub fn build_router(services: &Services, pool: PgPool, config: &GatewayConfig) -> Router {
    let h = &services.healthcare;
    let b = &services.booking;
    let u = &services.user;

    Router::new()
        .merge(health::router(pool))
        .merge(entity::router("/v1/departments", h.departments.clone()))
        .merge(entity::router("/v1/specializations", h.specializations.clone()))
        .merge(entity::router("/v1/doctors", h.doctors.clone()))
        .merge(entity::router("/v1/doctor-working-hours", h.working_hours.clone()))
        .merge(entity::router("/v1/doctor-services", h.doctor_services.clone()))
        .merge(entity::router("/v1/reasons", h.reasons.clone()))
        .merge(entity::router("/v1/appointments", b.appointments.clone()))
        .merge(entity::router("/v1/doctor-notes", b.doctor_notes.clone()))
        .merge(entity::router("/v1/patients", b.patients.clone()))
        .merge(entity::router("/v1/patient-payments", b.patient_payments.clone()))
        .merge(patients::router(b.clone()))
        .merge(entity::router("/v1/users", u.users.clone()))
        .merge(entity::router("/v1/sessions", u.sessions.clone()))
        .layer(cors_layer(config.cors_permissive))
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` on the configured address until Ctrl+C or SIGTERM.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config.database).await?;
/// let services = Services::new(pool.clone(), &config.services);
/// run_server(build_router(&services, pool, &config.gateway), &config.gateway).await?;
/// ```
pub async fn run_server(app: Router, config: &GatewayConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("Server listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}
