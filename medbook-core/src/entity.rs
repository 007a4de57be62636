//! Static per-entity table descriptions
//!
//! An [`EntityDescriptor`] is the only thing the generic repository knows
//! about a table: its name, how ids are assigned, which business columns
//! exist and of what kind. It doubles as the allow-list for every column
//! name that arrives from a caller (filter fields and order-by keys).
//! Write-only columns are stored and read back but never named by callers
//! in filters or ordering, and a full-row update leaves them alone.

use crate::error::ValidationError;
use crate::query::Predicate;
use crate::value::ColumnKind;

pub const ID: &str = "id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";
pub const DELETED_AT: &str = "deleted_at";

const AUDIT_COLUMNS: [Column; 3] = [
    Column::new(CREATED_AT, ColumnKind::Timestamp),
    Column::new(UPDATED_AT, ColumnKind::Timestamp),
    Column::new(DELETED_AT, ColumnKind::Timestamp),
];

/// A named, typed column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Set on create or by an explicit patch only
    pub write_only: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            write_only: false,
        }
    }

    pub const fn write_only(self) -> Self {
        Self {
            write_only: true,
            ..self
        }
    }
}

/// Who assigns the primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    /// UUID supplied with the insert
    Client,
    /// Identity column filled in by Postgres
    Database,
}

/// Table layout of one entity type
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Singular name used in errors and spans
    pub name: &'static str,
    pub table: &'static str,
    pub id: Column,
    pub id_source: IdSource,
    /// Business columns, in bind order
    pub columns: &'static [Column],
    /// Columns the database fills in on insert (e.g. sequence numbers)
    pub generated: &'static [Column],
}

impl EntityDescriptor {
    /// Every column the descriptor knows about.
    pub fn all_columns(&self) -> impl Iterator<Item = Column> + '_ {
        std::iter::once(self.id)
            .chain(self.columns.iter().copied())
            .chain(self.generated.iter().copied())
            .chain(AUDIT_COLUMNS)
    }

    /// Column list for SELECT and RETURNING.
    pub fn select_columns(&self) -> Vec<&'static str> {
        self.all_columns().map(|c| c.name).collect()
    }

    /// Columns written by an INSERT, matching the entity's insert values.
    pub fn insert_columns(&self) -> Vec<&'static str> {
        let id = match self.id_source {
            IdSource::Client => Some(self.id.name),
            IdSource::Database => None,
        };
        id.into_iter()
            .chain(self.columns.iter().map(|c| c.name))
            .collect()
    }

    /// Look up a caller-supplied column name for filtering or ordering.
    pub fn resolve(&self, name: &str) -> Result<Column, ValidationError> {
        let name = name.trim();
        self.all_columns()
            .find(|c| c.name == name && !c.write_only)
            .ok_or_else(|| ValidationError::UnknownColumn {
                entity: self.name,
                column: name.to_owned(),
            })
    }

    /// Look up a column the caller is allowed to assign.
    pub fn writable(&self, name: &str) -> Result<Column, ValidationError> {
        let name = name.trim();
        if let Some(column) = self.columns.iter().find(|c| c.name == name) {
            return Ok(*column);
        }
        let column = self.resolve(name)?;
        Err(ValidationError::ReadOnlyColumn {
            entity: self.name,
            column: column.name.to_owned(),
        })
    }

    /// Map an order-by key through the allow-list; empty means unordered.
    pub fn order_column(&self, key: &str) -> Result<Option<&'static str>, ValidationError> {
        if key.trim().is_empty() {
            return Ok(None);
        }
        self.resolve(key).map(|c| Some(c.name))
    }

    /// Exact match of `field` against a raw string value.
    pub fn equals(&self, field: &str, value: &str) -> Result<Predicate, ValidationError> {
        let column = self.resolve(field)?;
        let value = column.kind.parse(column.name, value)?;
        Ok(Predicate::eq(column.name, value))
    }

    /// Case-insensitive prefix match of `field`.
    pub fn starts_with(&self, field: &str, value: &str) -> Result<Predicate, ValidationError> {
        let column = self.resolve(field)?;
        Ok(if column.kind.is_text() {
            Predicate::ilike_prefix(column.name, value)
        } else {
            Predicate::ilike_prefix_cast(column.name, value)
        })
    }
}
