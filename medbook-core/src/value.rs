//! Typed SQL arguments and column kinds
//!
//! Every variant of `SqlValue` is nullable so that a NULL can still be bound
//! with the column's Postgres type.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::error::ValidationError;

/// Column type as far as argument binding and parsing are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Uuid,
    Integer,
    BigInt,
    Float,
    Boolean,
    Timestamp,
    Date,
    Time,
}

impl ColumnKind {
    /// Human-readable kind, used in validation messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Uuid => "uuid",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Timestamp => "RFC 3339 timestamp",
            Self::Date => "date (YYYY-MM-DD)",
            Self::Time => "time (HH:MM[:SS])",
        }
    }

    /// Whether ILIKE can be applied without a cast
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    /// Parse a raw filter string into an argument of this kind.
    pub fn parse(&self, field: &str, raw: &str) -> Result<SqlValue, ValidationError> {
        let invalid = || ValidationError::InvalidValue {
            field: field.to_owned(),
            value: raw.to_owned(),
            expected: self.as_str(),
        };
        // Text compares exactly; everything else tolerates padding.
        let raw = if self.is_text() { raw } else { raw.trim() };

        let value = match self {
            Self::Text => SqlValue::Text(Some(raw.to_owned())),
            Self::Uuid => SqlValue::Uuid(Some(Uuid::parse_str(raw).map_err(|_| invalid())?)),
            Self::Integer => SqlValue::Int(Some(raw.parse().map_err(|_| invalid())?)),
            Self::BigInt => SqlValue::BigInt(Some(raw.parse().map_err(|_| invalid())?)),
            Self::Float => SqlValue::Float(Some(raw.parse().map_err(|_| invalid())?)),
            Self::Boolean => SqlValue::Bool(Some(raw.parse().map_err(|_| invalid())?)),
            Self::Timestamp => SqlValue::Timestamp(Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| invalid())?
                    .with_timezone(&Utc),
            )),
            Self::Date => SqlValue::Date(Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?,
            )),
            Self::Time => SqlValue::Time(Some(
                NaiveTime::parse_from_str(raw, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                    .map_err(|_| invalid())?,
            )),
        };

        Ok(value)
    }
}

/// A positional statement argument
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Uuid(Option<Uuid>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
    Timestamp(Option<DateTime<Utc>>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
}

impl SqlValue {
    /// The column kind this argument binds as.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Text(_) => ColumnKind::Text,
            Self::Uuid(_) => ColumnKind::Uuid,
            Self::Int(_) => ColumnKind::Integer,
            Self::BigInt(_) => ColumnKind::BigInt,
            Self::Float(_) => ColumnKind::Float,
            Self::Bool(_) => ColumnKind::Boolean,
            Self::Timestamp(_) => ColumnKind::Timestamp,
            Self::Date(_) => ColumnKind::Date,
            Self::Time(_) => ColumnKind::Time,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Text(v) => v.is_none(),
            Self::Uuid(v) => v.is_none(),
            Self::Int(v) => v.is_none(),
            Self::BigInt(v) => v.is_none(),
            Self::Float(v) => v.is_none(),
            Self::Bool(v) => v.is_none(),
            Self::Timestamp(v) => v.is_none(),
            Self::Date(v) => v.is_none(),
            Self::Time(v) => v.is_none(),
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(Some(v))
                }
            }

            impl From<Option<$ty>> for SqlValue {
                fn from(v: Option<$ty>) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    String => Text,
    Uuid => Uuid,
    i32 => Int,
    i64 => BigInt,
    f64 => Float,
    bool => Bool,
    DateTime<Utc> => Timestamp,
    NaiveDate => Date,
    NaiveTime => Time,
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(Some(v.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_by_kind() {
        assert_eq!(
            ColumnKind::Integer.parse("floor_number", " 2 ").unwrap(),
            SqlValue::Int(Some(2))
        );
        assert_eq!(
            ColumnKind::Boolean.parse("is_active", "true").unwrap(),
            SqlValue::Bool(Some(true))
        );
        assert_eq!(
            ColumnKind::Time.parse("start_time", "09:30").unwrap(),
            SqlValue::Time(NaiveTime::from_hms_opt(9, 30, 0))
        );
        assert!(matches!(
            ColumnKind::Uuid.parse("id", "550e8400-e29b-41d4-a716-446655440000"),
            Ok(SqlValue::Uuid(Some(_)))
        ));
    }

    #[test]
    fn text_keeps_surrounding_whitespace() {
        assert_eq!(
            ColumnKind::Text.parse("name", " Cardiology ").unwrap(),
            SqlValue::Text(Some(" Cardiology ".into()))
        );
        assert_eq!(
            ColumnKind::BigInt.parse("id", " 42\n").unwrap(),
            SqlValue::BigInt(Some(42))
        );
    }

    #[test]
    fn rejects_malformed_values() {
        let err = ColumnKind::Uuid.parse("id", "not-a-uuid").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidValue { expected: "uuid", .. }
        ));

        assert!(ColumnKind::Date.parse("birth_date", "31/12/1990").is_err());
        assert!(ColumnKind::BigInt.parse("id", "12a").is_err());
    }

    #[test]
    fn null_detection() {
        assert!(SqlValue::from(None::<Uuid>).is_null());
        assert!(!SqlValue::from("x").is_null());
    }
}
