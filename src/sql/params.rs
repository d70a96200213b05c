//! Typed bind parameters and helpers to attach them to sqlx queries in order.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{Query, QueryScalar};

/// A value bound to a `$n` placeholder. Filter values only ever travel this way.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for BindValue {
    fn from(n: i64) -> Self {
        BindValue::Int(n)
    }
}

impl From<f64> for BindValue {
    fn from(n: f64) -> Self {
        BindValue::Float(n)
    }
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::Text(s.to_string())
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::Text(s)
    }
}

/// Bind `params` onto a row query, in placeholder order.
pub fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[BindValue],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = match p {
            BindValue::Int(n) => query.bind(*n),
            BindValue::Float(n) => query.bind(*n),
            BindValue::Text(s) => query.bind(s.clone()),
        };
    }
    query
}

/// Bind `params` onto a scalar query, in placeholder order.
pub fn bind_all_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    params: &[BindValue],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for p in params {
        query = match p {
            BindValue::Int(n) => query.bind(*n),
            BindValue::Float(n) => query.bind(*n),
            BindValue::Text(s) => query.bind(s.clone()),
        };
    }
    query
}
