//! Generic entity repository
//!
//! One engine serves every table. Statement planning is split from execution
//! so the SQL each operation sends can be checked without a database:
//! - create: INSERT ... RETURNING (server-assigned columns come back)
//! - get: SELECT with the soft-delete guard unless bypassed
//! - list: paginated SELECT plus an independent COUNT(*) with the same filter
//! - update/patch: UPDATE ... SET updated_at = now() ... RETURNING
//! - delete: soft (tombstone) or hard (physical) by explicit mode

use std::fmt::Display;
use std::marker::PhantomData;

use medbook_core::entity::{DELETED_AT, UPDATED_AT};
use medbook_core::query::Statement;
use medbook_core::{
    DeleteMode, DeleteQuery, EntityDescriptor, FieldValueQuery, IdSource, ListQuery, Listed, Query,
    QueryError, SqlValue, ValidationError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::bind::{bind_query, bind_query_as, bind_scalar};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} where {field} = '{value}'")]
    NotFound {
        resource: &'static str,
        field: String,
        value: String,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("failed to build statement: {0}")]
    Query(#[from] QueryError),

    #[error("{operation} on {resource} exceeded the {seconds}s deadline")]
    Timeout {
        resource: &'static str,
        operation: &'static str,
        seconds: u64,
    },
}

impl DbError {
    fn not_found(resource: &'static str, lookup: &FieldValueQuery) -> Self {
        Self::NotFound {
            resource,
            field: lookup.field.clone(),
            value: lookup.value.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Primary key types the engine can fill in before an insert
pub trait SurrogateId: Clone + Display {
    /// Generate a value if the caller left it unset.
    fn fill_if_unset(&mut self);
    fn is_unset(&self) -> bool;
}

impl SurrogateId for Uuid {
    fn fill_if_unset(&mut self) {
        if self.is_nil() {
            *self = Uuid::new_v4();
        }
    }

    fn is_unset(&self) -> bool {
        self.is_nil()
    }
}

/// Identity columns are assigned by Postgres.
impl SurrogateId for i64 {
    fn fill_if_unset(&mut self) {}

    fn is_unset(&self) -> bool {
        *self == 0
    }
}

/// A row type the generic repository can persist
pub trait Entity:
    for<'r> FromRow<'r, PgRow> + Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static
{
    type Id: SurrogateId;

    const DESCRIPTOR: &'static EntityDescriptor;

    fn id(&self) -> &Self::Id;
    fn id_mut(&mut self) -> &mut Self::Id;

    /// Business column values, in descriptor order.
    fn business_values(&self) -> Vec<SqlValue>;

    fn id_value(&self) -> SqlValue;
}

/// INSERT ... RETURNING for a new row.
pub fn plan_create<E: Entity>(entity: &E) -> Result<Statement, QueryError> {
    let d = E::DESCRIPTOR;
    let mut values = Vec::with_capacity(d.columns.len() + 1);
    if d.id_source == IdSource::Client {
        values.push(entity.id_value());
    }
    values.extend(entity.business_values());

    Query::insert(d.table)
        .columns(d.insert_columns())
        .values(values)
        .returning(d.select_columns())
        .build()
}

pub fn plan_get(d: &EntityDescriptor, lookup: &FieldValueQuery) -> Result<Statement, DbError> {
    let mut select = Query::select(d.select_columns(), d.table);
    for predicate in lookup.predicates(d)? {
        select = select.filter(predicate);
    }
    Ok(select.limit(1).build()?)
}

/// Page statement and count statement sharing one filter.
pub fn plan_list(d: &EntityDescriptor, list: &ListQuery) -> Result<(Statement, Statement), DbError> {
    let select = list.select(d)?;
    Ok((select.build()?, select.count().build()?))
}

/// UPDATE of the given columns plus `updated_at = now()`.
pub fn plan_update(
    d: &EntityDescriptor,
    target: &FieldValueQuery,
    assignments: Vec<(&'static str, SqlValue)>,
) -> Result<Statement, DbError> {
    let mut update = Query::update(d.table)
        .set_many(assignments)
        .set_now(UPDATED_AT);
    for predicate in target.predicates(d)? {
        update = update.filter(predicate);
    }
    Ok(update.returning(d.select_columns()).build()?)
}

/// Assignments for a full-row update: every business column except the
/// write-only ones, which a round-tripped body never carries.
pub fn full_row_assignments<E: Entity>(patch: &E) -> Vec<(&'static str, SqlValue)> {
    E::DESCRIPTOR
        .columns
        .iter()
        .zip(patch.business_values())
        .filter(|(column, _)| !column.write_only)
        .map(|(column, value)| (column.name, value))
        .collect()
}

/// Check caller-named assignments against the writable columns.
pub fn checked_assignments(
    d: &EntityDescriptor,
    assignments: Vec<(String, SqlValue)>,
) -> Result<Vec<(&'static str, SqlValue)>, ValidationError> {
    if assignments.is_empty() {
        return Err(ValidationError::Empty {
            field: "assignments",
        });
    }

    assignments
        .into_iter()
        .map(|(name, value)| {
            let column = d.writable(&name)?;
            if value.kind() != column.kind {
                return Err(ValidationError::InvalidValue {
                    field: column.name.to_owned(),
                    value: format!("{:?}", value),
                    expected: column.kind.as_str(),
                });
            }
            Ok((column.name, value))
        })
        .collect()
}

pub fn plan_delete(d: &EntityDescriptor, delete: &DeleteQuery) -> Result<Statement, DbError> {
    let predicates = delete.predicates(d)?;
    let stmt = match delete.mode {
        DeleteMode::Soft => predicates
            .into_iter()
            .fold(Query::update(d.table).set_now(DELETED_AT), |q, p| q.filter(p))
            .build()?,
        DeleteMode::Hard => predicates
            .into_iter()
            .fold(Query::delete(d.table), |q, p| q.filter(p))
            .build()?,
    };
    Ok(stmt)
}

/// Whether a delete touched the rows its mode promises.
pub fn delete_succeeded(mode: DeleteMode, rows_affected: u64) -> bool {
    match mode {
        DeleteMode::Soft => rows_affected == 1,
        DeleteMode::Hard => rows_affected >= 1,
    }
}

/// Repository for one entity type
pub struct EntityRepo<'a, E> {
    pool: &'a PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity> EntityRepo<'a, E> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// Insert a row and return it as persisted.
    pub async fn create(&self, entity: &E) -> Result<E, DbError> {
        let stmt = plan_create(entity)?;
        tracing::debug!(sql = %stmt.sql, "create");

        let row = bind_query_as(sqlx::query_as::<_, E>(&stmt.sql), stmt.args)
            .fetch_one(self.pool)
            .await?;
        Ok(row)
    }

    /// Fetch exactly one row by `field = value`.
    pub async fn get(&self, lookup: &FieldValueQuery) -> Result<E, DbError> {
        let stmt = plan_get(E::DESCRIPTOR, lookup)?;
        tracing::debug!(sql = %stmt.sql, "get");

        bind_query_as(sqlx::query_as::<_, E>(&stmt.sql), stmt.args)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(E::DESCRIPTOR.name, lookup))
    }

    /// List a page of rows with the total count of the same filter.
    pub async fn list(&self, list: &ListQuery) -> Result<Listed<E>, DbError> {
        let (page, count) = plan_list(E::DESCRIPTOR, list)?;
        tracing::debug!(sql = %page.sql, count_sql = %count.sql, "list");

        let items = bind_query_as(sqlx::query_as::<_, E>(&page.sql), page.args)
            .fetch_all(self.pool)
            .await?;
        let count = bind_scalar(sqlx::query_scalar::<_, i64>(&count.sql), count.args)
            .fetch_one(self.pool)
            .await?;

        Ok(Listed { items, count })
    }

    /// Overwrite every business column of the target row except write-only ones.
    pub async fn update(&self, target: &FieldValueQuery, patch: &E) -> Result<E, DbError> {
        let d = E::DESCRIPTOR;
        let assignments = full_row_assignments(patch);
        self.run_update(target, plan_update(d, target, assignments)?)
            .await
    }

    /// Overwrite only the named business columns of the target row.
    pub async fn patch(
        &self,
        target: &FieldValueQuery,
        assignments: Vec<(String, SqlValue)>,
    ) -> Result<E, DbError> {
        let d = E::DESCRIPTOR;
        let assignments = checked_assignments(d, assignments)?;
        self.run_update(target, plan_update(d, target, assignments)?)
            .await
    }

    async fn run_update(&self, target: &FieldValueQuery, stmt: Statement) -> Result<E, DbError> {
        tracing::debug!(sql = %stmt.sql, "update");

        bind_query_as(sqlx::query_as::<_, E>(&stmt.sql), stmt.args)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(E::DESCRIPTOR.name, target))
    }

    /// Soft or hard delete; `true` when the mode's row-count rule holds.
    pub async fn delete(&self, delete: &DeleteQuery) -> Result<bool, DbError> {
        let stmt = plan_delete(E::DESCRIPTOR, delete)?;
        tracing::debug!(sql = %stmt.sql, mode = %delete.mode, "delete");

        let result = bind_query(sqlx::query(&stmt.sql), stmt.args)
            .execute(self.pool)
            .await?;
        Ok(delete_succeeded(delete.mode, result.rows_affected()))
    }
}
