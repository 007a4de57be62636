//! Binding `SqlValue` arguments onto sqlx queries
//!
//! Every variant binds as `Option<T>` so NULLs keep the column's type.

use medbook_core::SqlValue;
use sqlx::postgres::PgArguments;
use sqlx::query::{Query, QueryAs, QueryScalar};
use sqlx::Postgres;

macro_rules! bind_value {
    ($query:expr, $value:expr) => {
        match $value {
            SqlValue::Text(v) => $query.bind(v),
            SqlValue::Uuid(v) => $query.bind(v),
            SqlValue::Int(v) => $query.bind(v),
            SqlValue::BigInt(v) => $query.bind(v),
            SqlValue::Float(v) => $query.bind(v),
            SqlValue::Bool(v) => $query.bind(v),
            SqlValue::Timestamp(v) => $query.bind(v),
            SqlValue::Date(v) => $query.bind(v),
            SqlValue::Time(v) => $query.bind(v),
        }
    };
}

pub(crate) fn bind_query(
    query: Query<'_, Postgres, PgArguments>,
    args: Vec<SqlValue>,
) -> Query<'_, Postgres, PgArguments> {
    args.into_iter().fold(query, |q, v| bind_value!(q, v))
}

pub(crate) fn bind_query_as<O>(
    query: QueryAs<'_, Postgres, O, PgArguments>,
    args: Vec<SqlValue>,
) -> QueryAs<'_, Postgres, O, PgArguments> {
    args.into_iter().fold(query, |q, v| bind_value!(q, v))
}

pub(crate) fn bind_scalar<O>(
    query: QueryScalar<'_, Postgres, O, PgArguments>,
    args: Vec<SqlValue>,
) -> QueryScalar<'_, Postgres, O, PgArguments> {
    args.into_iter().fold(query, |q, v| bind_value!(q, v))
}
