//! Lookup, listing and delete requests
//!
//! These are the request shapes every entity shares. Each one knows how to
//! turn itself into predicates for a given descriptor, including the
//! soft-delete guard, so the repository only has to execute.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityDescriptor, DELETED_AT};
use crate::error::ValidationError;
use crate::query::{Predicate, Query, Select};

/// Single-row lookup by exact equality on one column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValueQuery {
    pub field: String,
    pub value: String,
    /// Bypass the `deleted_at IS NULL` guard
    #[serde(default)]
    pub include_soft_deleted: bool,
}

impl FieldValueQuery {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            include_soft_deleted: false,
        }
    }

    pub fn by_id(id: impl ToString) -> Self {
        Self::new(crate::entity::ID, id.to_string())
    }

    #[must_use]
    pub fn including_deleted(mut self) -> Self {
        self.include_soft_deleted = true;
        self
    }

    /// Target predicates: the equality plus, unless bypassed, the soft-delete guard.
    pub fn predicates(&self, descriptor: &EntityDescriptor) -> Result<Vec<Predicate>, ValidationError> {
        if self.field.trim().is_empty() {
            return Err(ValidationError::Empty { field: "field" });
        }
        let target = descriptor.equals(&self.field, &self.value)?;
        let mut predicates = Vec::with_capacity(2);
        if !self.include_soft_deleted {
            predicates.push(Predicate::is_null(DELETED_AT));
        }
        predicates.push(target);
        Ok(predicates)
    }
}

/// Filtered, ordered, paginated listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Column searched when `value` is non-empty
    #[serde(default)]
    pub field: String,
    /// Prefix to match, case-insensitively
    #[serde(default)]
    pub value: String,
    /// 1-based page number
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub order_by: String,
    #[serde(default)]
    pub include_soft_deleted: bool,
}

impl ListQuery {
    /// A page of everything, unfiltered.
    pub fn page(page: u64, limit: u64) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn search(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.field = field.into();
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn ordered_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = column.into();
        self
    }

    #[must_use]
    pub fn including_deleted(mut self) -> Self {
        self.include_soft_deleted = true;
        self
    }

    /// `(limit, offset)` when both page and limit are at least 1.
    pub fn pagination(&self) -> Option<(u64, u64)> {
        if self.page >= 1 && self.limit >= 1 {
            Some((self.limit, self.limit.saturating_mul(self.page - 1)))
        } else {
            None
        }
    }

    /// Filter predicates shared by the page query and its count.
    pub fn predicates(&self, descriptor: &EntityDescriptor) -> Result<Vec<Predicate>, ValidationError> {
        let mut predicates = Vec::with_capacity(2);
        if !self.include_soft_deleted {
            predicates.push(Predicate::is_null(DELETED_AT));
        }
        if !self.value.is_empty() {
            if self.field.trim().is_empty() {
                return Err(ValidationError::Empty { field: "search" });
            }
            predicates.push(descriptor.starts_with(&self.field, &self.value)?);
        }
        Ok(predicates)
    }

    /// The paginated select; call `.count()` on it for the total.
    pub fn select(&self, descriptor: &EntityDescriptor) -> Result<Select, ValidationError> {
        let mut select = Query::select(descriptor.select_columns(), descriptor.table);
        for predicate in self.predicates(descriptor)? {
            select = select.filter(predicate);
        }
        if let Some(column) = descriptor.order_column(&self.order_by)? {
            select = select.order_by(column);
        }
        if let Some((limit, offset)) = self.pagination() {
            select = select.limit(limit).offset(offset);
        }
        Ok(select)
    }
}

/// How a delete treats the row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Set `deleted_at`; the row stays retrievable with the guard bypassed
    #[default]
    Soft,
    /// Remove the row, tombstoned or not
    Hard,
}

impl DeleteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeleteMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            _ => Err(ValidationError::InvalidDeleteMode(s.to_owned())),
        }
    }
}

/// Delete request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteQuery {
    pub field: String,
    pub value: String,
    #[serde(default)]
    pub mode: DeleteMode,
}

impl DeleteQuery {
    pub fn new(field: impl Into<String>, value: impl Into<String>, mode: DeleteMode) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            mode,
        }
    }

    pub fn by_id(id: impl ToString, mode: DeleteMode) -> Self {
        Self::new(crate::entity::ID, id.to_string(), mode)
    }

    /// Soft deletes only touch live rows; hard deletes ignore tombstones.
    pub fn predicates(&self, descriptor: &EntityDescriptor) -> Result<Vec<Predicate>, ValidationError> {
        let lookup = FieldValueQuery {
            field: self.field.clone(),
            value: self.value.clone(),
            include_soft_deleted: self.mode == DeleteMode::Hard,
        };
        lookup.predicates(descriptor)
    }
}

/// One page of rows plus the unpaginated total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listed<T> {
    pub items: Vec<T>,
    pub count: i64,
}

impl<T> Listed<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listed<U> {
        Listed {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
        }
    }
}
