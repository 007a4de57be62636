//! HTTP gateway
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses (400 for bad input, 500 for everything else)

pub mod error;
pub mod extractors;
pub mod params;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server};
