//! medbook-core: the database-agnostic half of the data-access layer
//!
//! - [`query`] builds parameterized Postgres statements
//! - [`entity`] describes tables and guards caller-supplied column names
//! - [`filter`] turns lookup/list/delete requests into predicates
//! - [`config`] loads service configuration

pub mod config;
pub mod entity;
pub mod error;
pub mod filter;
pub mod query;
pub mod value;

pub use config::{MedbookConfig, ServiceConfig};
pub use entity::{Column, EntityDescriptor, IdSource};
pub use error::{ConfigError, QueryError, ValidationError};
pub use filter::{DeleteMode, DeleteQuery, FieldValueQuery, ListQuery, Listed};
pub use query::{Predicate, Query, Statement};
pub use value::{ColumnKind, SqlValue};
