//! medbook-server: data access, service handles and the HTTP gateway
//!
//! - [`db`] owns the pool, the schema and the generic entity repository
//! - [`models`] declares the twelve entity row types
//! - [`service`] bundles per-entity handles into the three services
//! - [`http`] exposes them over axum

pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod service;

use medbook_core::MedbookConfig;

pub use error::{ServerError, ServerResult};
pub use service::{BookingService, EntityService, HealthcareService, Services, UserService};

/// Apply the schema and return.
pub async fn migrate(config: &MedbookConfig) -> ServerResult<()> {
    let pool = db::create_pool(&config.database).await?;
    db::migrations::run(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Connect, optionally migrate, then serve the gateway until shutdown.
pub async fn serve(config: &MedbookConfig, run_migrations: bool) -> ServerResult<()> {
    let pool = db::create_pool(&config.database).await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "database pool ready"
    );

    if run_migrations {
        db::migrations::run(&pool).await?;
    } else {
        tracing::info!("skipping migrations");
    }

    let services = Services::new(pool.clone(), &config.services);
    let app = http::build_router(&services, pool.clone(), &config.gateway);
    http::run_server(app, &config.gateway).await?;

    pool.close().await;
    Ok(())
}
