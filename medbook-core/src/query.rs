//! Parameterized SQL construction
//!
//! Builders produce a [`Statement`] (SQL text with `$n` placeholders plus the
//! positional arguments) and never execute anything. Identifiers are always
//! double-quoted and values are always bound, so the only way caller input
//! reaches the SQL text is through a column name, which the repository checks
//! against the entity's allow-list before it gets here.
//!
//! ```
//! use medbook_core::query::{Predicate, Query};
//!
//! let stmt = Query::select(["id", "name"], "departments")
//!     .filter(Predicate::is_null("deleted_at"))
//!     .filter(Predicate::ilike_prefix("name", "card"))
//!     .order_by("name")
//!     .limit(10)
//!     .offset(0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     stmt.sql,
//!     r#"SELECT "id", "name" FROM "departments" WHERE "deleted_at" IS NULL AND "name" ILIKE $1 || '%' ORDER BY "name" LIMIT $2 OFFSET $3"#
//! );
//! assert_eq!(stmt.args.len(), 3);
//! ```

use crate::error::QueryError;
use crate::value::SqlValue;

/// SQL text plus positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

/// Quote a SQL identifier with double quotes (PostgreSQL convention).
fn quote_ident(name: &str) -> Result<String, QueryError> {
    if name.trim().is_empty() {
        return Err(QueryError::EmptyColumn);
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

fn quote_table(name: &str) -> Result<String, QueryError> {
    if name.trim().is_empty() {
        return Err(QueryError::EmptyTable);
    }
    quote_ident(name)
}

fn quote_list(columns: &[String]) -> Result<String, QueryError> {
    if columns.is_empty() {
        return Err(QueryError::NoColumns);
    }
    let quoted = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quoted.join(", "))
}

/// Escape LIKE wildcards so the value matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Accumulates arguments and hands out placeholders
#[derive(Default)]
struct Args {
    values: Vec<SqlValue>,
}

impl Args {
    fn push(&mut self, value: SqlValue) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }
}

/// A WHERE-clause condition
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = $n`, or `column IS NULL` when the value is NULL
    Eq { column: String, value: SqlValue },
    /// `column IS NULL`
    IsNull { column: String },
    /// `column ILIKE $n || '%'`
    ILikePrefix {
        column: String,
        value: String,
        cast_to_text: bool,
    },
    /// Conjunction of several predicates
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            column: column.into(),
        }
    }

    /// Case-insensitive "starts with" on a text column.
    pub fn ilike_prefix(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ILikePrefix {
            column: column.into(),
            value: value.into(),
            cast_to_text: false,
        }
    }

    /// Prefix match on a non-text column, compared through its text form.
    pub fn ilike_prefix_cast(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ILikePrefix {
            column: column.into(),
            value: value.into(),
            cast_to_text: true,
        }
    }

    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::All(predicates.into_iter().collect())
    }

    /// AND of several equalities.
    pub fn eq_many<C, V>(pairs: impl IntoIterator<Item = (C, V)>) -> Self
    where
        C: Into<String>,
        V: Into<SqlValue>,
    {
        Self::All(
            pairs
                .into_iter()
                .map(|(column, value)| Self::eq(column, value))
                .collect(),
        )
    }

    fn render(&self, args: &mut Args) -> Result<Option<String>, QueryError> {
        let sql = match self {
            Self::Eq { column, value } if value.is_null() => {
                format!("{} IS NULL", quote_ident(column)?)
            }
            Self::Eq { column, value } => {
                let col = quote_ident(column)?;
                format!("{} = {}", col, args.push(value.clone()))
            }
            Self::IsNull { column } => format!("{} IS NULL", quote_ident(column)?),
            Self::ILikePrefix {
                column,
                value,
                cast_to_text,
            } => {
                let col = quote_ident(column)?;
                let col = if *cast_to_text {
                    format!("CAST({} AS TEXT)", col)
                } else {
                    col
                };
                let placeholder = args.push(SqlValue::Text(Some(escape_like(value))));
                format!("{} ILIKE {} || '%'", col, placeholder)
            }
            Self::All(predicates) => {
                let parts = render_conjunction(predicates, args)?;
                match parts.len() {
                    0 => return Ok(None),
                    1 => parts.into_iter().next().unwrap_or_default(),
                    _ => format!("({})", parts.join(" AND ")),
                }
            }
        };
        Ok(Some(sql))
    }
}

fn render_conjunction(predicates: &[Predicate], args: &mut Args) -> Result<Vec<String>, QueryError> {
    let mut parts = Vec::with_capacity(predicates.len());
    for predicate in predicates {
        if let Some(part) = predicate.render(args)? {
            parts.push(part);
        }
    }
    Ok(parts)
}

fn push_where(sql: &mut String, predicates: &[Predicate], args: &mut Args) -> Result<(), QueryError> {
    let parts = render_conjunction(predicates, args)?;
    if !parts.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&parts.join(" AND "));
    }
    Ok(())
}

fn push_returning(sql: &mut String, returning: &[String]) -> Result<(), QueryError> {
    if !returning.is_empty() {
        sql.push_str(" RETURNING ");
        sql.push_str(&quote_list(returning)?);
    }
    Ok(())
}

/// Entry point for the statement builders
pub struct Query;

impl Query {
    pub fn select<I, S>(columns: I, table: impl Into<String>) -> Select
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Select {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            predicates: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
            count: false,
        }
    }

    pub fn insert(table: impl Into<String>) -> Insert {
        Insert {
            table: table.into(),
            columns: Vec::new(),
            values: Vec::new(),
            returning: Vec::new(),
        }
    }

    pub fn update(table: impl Into<String>) -> Update {
        Update {
            table: table.into(),
            assignments: Vec::new(),
            predicates: Vec::new(),
            returning: Vec::new(),
        }
    }

    pub fn delete(table: impl Into<String>) -> Delete {
        Delete {
            table: table.into(),
            predicates: Vec::new(),
        }
    }
}

/// SELECT builder
#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    predicates: Vec<Predicate>,
    order_by: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    count: bool,
}

impl Select {
    /// AND a predicate into the WHERE clause.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// The matching `SELECT COUNT(*)`: same predicates, no ordering or paging.
    #[must_use]
    pub fn count(&self) -> Self {
        Self {
            table: self.table.clone(),
            columns: Vec::new(),
            predicates: self.predicates.clone(),
            order_by: None,
            limit: None,
            offset: None,
            count: true,
        }
    }

    pub fn build(&self) -> Result<Statement, QueryError> {
        let table = quote_table(&self.table)?;
        let projection = if self.count {
            "COUNT(*)".to_owned()
        } else {
            quote_list(&self.columns)?
        };

        let mut args = Args::default();
        let mut sql = format!("SELECT {} FROM {}", projection, table);
        push_where(&mut sql, &self.predicates, &mut args)?;

        if let Some(column) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(&quote_ident(column)?);
        }
        if let Some(limit) = self.limit {
            let placeholder = args.push(SqlValue::BigInt(Some(clamp_i64(limit))));
            sql.push_str(" LIMIT ");
            sql.push_str(&placeholder);
        }
        if let Some(offset) = self.offset {
            let placeholder = args.push(SqlValue::BigInt(Some(clamp_i64(offset))));
            sql.push_str(" OFFSET ");
            sql.push_str(&placeholder);
        }

        Ok(Statement {
            sql,
            args: args.values,
        })
    }
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// INSERT builder
#[derive(Debug, Clone)]
pub struct Insert {
    table: String,
    columns: Vec<String>,
    values: Vec<SqlValue>,
    returning: Vec<String>,
}

impl Insert {
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn values(mut self, values: impl IntoIterator<Item = SqlValue>) -> Self {
        self.values.extend(values);
        self
    }

    #[must_use]
    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(&self) -> Result<Statement, QueryError> {
        let table = quote_table(&self.table)?;
        let columns = quote_list(&self.columns)?;
        if self.columns.len() != self.values.len() {
            return Err(QueryError::ArityMismatch {
                columns: self.columns.len(),
                values: self.values.len(),
            });
        }

        let mut args = Args::default();
        let placeholders: Vec<String> = self
            .values
            .iter()
            .map(|v| args.push(v.clone()))
            .collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns,
            placeholders.join(", ")
        );
        push_returning(&mut sql, &self.returning)?;

        Ok(Statement {
            sql,
            args: args.values,
        })
    }
}

/// Right-hand side of a SET assignment
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Value(SqlValue),
    /// The database clock, `now()`
    Now,
}

/// UPDATE builder
#[derive(Debug, Clone)]
pub struct Update {
    table: String,
    assignments: Vec<(String, Assignment)>,
    predicates: Vec<Predicate>,
    returning: Vec<String>,
}

impl Update {
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.assignments
            .push((column.into(), Assignment::Value(value.into())));
        self
    }

    /// Set several columns from parallel name/value lists.
    #[must_use]
    pub fn set_many<I, S>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlValue)>,
        S: Into<String>,
    {
        self.assignments.extend(
            pairs
                .into_iter()
                .map(|(c, v)| (c.into(), Assignment::Value(v))),
        );
        self
    }

    #[must_use]
    pub fn set_now(mut self, column: impl Into<String>) -> Self {
        self.assignments.push((column.into(), Assignment::Now));
        self
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(&self) -> Result<Statement, QueryError> {
        let table = quote_table(&self.table)?;
        if self.assignments.is_empty() {
            return Err(QueryError::EmptyUpdate);
        }

        let mut args = Args::default();
        let mut sets = Vec::with_capacity(self.assignments.len());
        for (column, assignment) in &self.assignments {
            let rhs = match assignment {
                Assignment::Value(v) => args.push(v.clone()),
                Assignment::Now => "now()".to_owned(),
            };
            sets.push(format!("{} = {}", quote_ident(column)?, rhs));
        }

        let mut sql = format!("UPDATE {} SET {}", table, sets.join(", "));
        push_where(&mut sql, &self.predicates, &mut args)?;
        push_returning(&mut sql, &self.returning)?;

        Ok(Statement {
            sql,
            args: args.values,
        })
    }
}

/// DELETE builder
#[derive(Debug, Clone)]
pub struct Delete {
    table: String,
    predicates: Vec<Predicate>,
}

impl Delete {
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn build(&self) -> Result<Statement, QueryError> {
        let table = quote_table(&self.table)?;
        let mut args = Args::default();
        let mut sql = format!("DELETE FROM {}", table);
        push_where(&mut sql, &self.predicates, &mut args)?;

        Ok(Statement {
            sql,
            args: args.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn select_without_filters() {
        let stmt = Query::select(["id", "name"], "departments").build().unwrap();
        assert_eq!(stmt.sql, r#"SELECT "id", "name" FROM "departments""#);
        assert!(stmt.args.is_empty());
    }

    #[test]
    fn eq_many_combines_soft_delete_guard() {
        let id = Uuid::new_v4();
        let stmt = Query::select(["id"], "doctors")
            .filter(Predicate::eq_many([
                ("deleted_at", SqlValue::Timestamp(None)),
                ("id", SqlValue::from(id)),
            ]))
            .build()
            .unwrap();

        assert_eq!(
            stmt.sql,
            r#"SELECT "id" FROM "doctors" WHERE ("deleted_at" IS NULL AND "id" = $1)"#
        );
        assert_eq!(stmt.args, vec![SqlValue::Uuid(Some(id))]);
    }

    #[test]
    fn ilike_prefix_escapes_wildcards() {
        let stmt = Query::select(["id"], "patients")
            .filter(Predicate::ilike_prefix("phone_number", "+99_5%"))
            .build()
            .unwrap();

        assert_eq!(
            stmt.sql,
            r#"SELECT "id" FROM "patients" WHERE "phone_number" ILIKE $1 || '%'"#
        );
        assert_eq!(stmt.args, vec![SqlValue::from(r"+99\_5\%")]);
    }

    #[test]
    fn ilike_prefix_casts_non_text() {
        let stmt = Query::select(["id"], "departments")
            .filter(Predicate::ilike_prefix_cast("floor_number", "1"))
            .build()
            .unwrap();
        assert!(stmt.sql.contains(r#"CAST("floor_number" AS TEXT) ILIKE $1 || '%'"#));
    }

    #[test]
    fn count_drops_paging_and_keeps_predicates() {
        let select = Query::select(["id", "name"], "reasons")
            .filter(Predicate::is_null("deleted_at"))
            .filter(Predicate::ilike_prefix("name", "hea"))
            .order_by("name")
            .limit(5)
            .offset(10);

        let count = select.count().build().unwrap();
        assert_eq!(
            count.sql,
            r#"SELECT COUNT(*) FROM "reasons" WHERE "deleted_at" IS NULL AND "name" ILIKE $1 || '%'"#
        );
        assert_eq!(count.args, vec![SqlValue::from("hea")]);

        let page = select.build().unwrap();
        assert!(page.sql.ends_with(r#"ORDER BY "name" LIMIT $2 OFFSET $3"#));
        assert_eq!(page.args[1], SqlValue::BigInt(Some(5)));
        assert_eq!(page.args[2], SqlValue::BigInt(Some(10)));
    }

    #[test]
    fn identifiers_are_quoted() {
        let stmt = Query::select(["id"], "departments")
            .order_by(r#"name"; DROP TABLE departments; --"#)
            .build()
            .unwrap();
        assert!(stmt
            .sql
            .ends_with(r#"ORDER BY "name""; DROP TABLE departments; --""#));
    }

    #[test]
    fn insert_with_returning() {
        let stmt = Query::insert("departments")
            .columns(["id", "name", "floor_number"])
            .values([
                SqlValue::from(Uuid::nil()),
                SqlValue::from("Cardiology"),
                SqlValue::from(2),
            ])
            .returning(["id", "created_at"])
            .build()
            .unwrap();

        assert_eq!(
            stmt.sql,
            r#"INSERT INTO "departments" ("id", "name", "floor_number") VALUES ($1, $2, $3) RETURNING "id", "created_at""#
        );
        assert_eq!(stmt.args.len(), 3);
    }

    #[test]
    fn insert_arity_mismatch() {
        let err = Query::insert("departments")
            .columns(["id", "name"])
            .values([SqlValue::from("x")])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::ArityMismatch {
                columns: 2,
                values: 1
            }
        );
    }

    #[test]
    fn update_numbers_set_before_where() {
        let stmt = Query::update("patients")
            .set("phone_number", "+998950230605")
            .set_now("updated_at")
            .filter(Predicate::is_null("deleted_at"))
            .filter(Predicate::eq("id", Uuid::nil()))
            .returning(["id"])
            .build()
            .unwrap();

        assert_eq!(
            stmt.sql,
            r#"UPDATE "patients" SET "phone_number" = $1, "updated_at" = now() WHERE "deleted_at" IS NULL AND "id" = $2 RETURNING "id""#
        );
    }

    #[test]
    fn soft_delete_shape() {
        let stmt = Query::update("departments")
            .set_now("deleted_at")
            .filter(Predicate::is_null("deleted_at"))
            .filter(Predicate::eq("name", "Cardiology"))
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            r#"UPDATE "departments" SET "deleted_at" = now() WHERE "deleted_at" IS NULL AND "name" = $1"#
        );
    }

    #[test]
    fn hard_delete_shape() {
        let stmt = Query::delete("departments")
            .filter(Predicate::eq("id", Uuid::nil()))
            .build()
            .unwrap();
        assert_eq!(stmt.sql, r#"DELETE FROM "departments" WHERE "id" = $1"#);
    }

    #[test]
    fn structural_misuse() {
        assert_eq!(
            Query::select(["id"], "").build().unwrap_err(),
            QueryError::EmptyTable
        );
        assert_eq!(
            Query::select(Vec::<String>::new(), "t").build().unwrap_err(),
            QueryError::NoColumns
        );
        assert_eq!(
            Query::select(["id", " "], "t").build().unwrap_err(),
            QueryError::EmptyColumn
        );
        assert_eq!(
            Query::update("t").build().unwrap_err(),
            QueryError::EmptyUpdate
        );
    }

    #[test]
    fn empty_conjunction_renders_nothing() {
        let stmt = Query::select(["id"], "t")
            .filter(Predicate::all([]))
            .build()
            .unwrap();
        assert_eq!(stmt.sql, r#"SELECT "id" FROM "t""#);
    }
}
