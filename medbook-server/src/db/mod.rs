//! Database layer - connection pool, schema and the generic repository
//!
//! - One `PgPool` shared by every service handle
//! - Every statement is built by `medbook_core::query` and bound here
//! - Single-statement writes; no multi-step transactions

mod bind;
pub mod enrich;
pub mod migrations;
pub mod pool;
pub mod repo;

pub use enrich::{DoctorSpecializations, Enrich};
pub use pool::{create_pool, create_pool_with_options};
pub use repo::{DbError, Entity, EntityRepo, SurrogateId};
