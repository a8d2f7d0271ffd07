//! Relational store abstraction.
//!
//! Repositories talk to the database exclusively through [`Store`]: a small
//! set of parameterized query and row-mutation primitives. Statements use `?`
//! placeholders and every piece of caller data travels as a bound [`Param`].

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DomainError;

/// A flat column-name to scalar mapping, as read from or written to a table.
pub type Row = serde_json::Map<String, Value>;

/// A typed value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Integer parameter.
    Int(i64),
    /// Floating point parameter.
    Real(f64),
    /// Text parameter.
    Text(String),
    /// SQL `NULL`.
    Null,
}

impl Param {
    /// Converts a row value into a bound parameter. Booleans bind as `0`/`1`;
    /// nested arrays and objects bind as their JSON text.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Int(i64::from(*flag)),
            Value::Number(n) => match n.as_i64() {
                Some(int) => Self::Int(int),
                None => Self::Real(n.as_f64().unwrap_or_default()),
            },
            Value::String(text) => Self::Text(text.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Database access collaborator used by every repository.
///
/// Each call is one autonomous round trip; no transaction spans calls.
#[async_trait]
pub trait Store: Send + Sync {
    /// Runs a query and returns the first column of the first row, if any.
    async fn fetch_scalar(&self, sql: &str, params: &[Param])
    -> Result<Option<Value>, DomainError>;

    /// Runs a query and returns its first row, if any.
    async fn fetch_row(&self, sql: &str, params: &[Param]) -> Result<Option<Row>, DomainError>;

    /// Runs a query and returns every row in result order.
    async fn fetch_all(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>, DomainError>;

    /// Inserts `fields` into `table` and returns the auto-increment ID.
    async fn insert_row(&self, table: &str, fields: &Row) -> Result<i64, DomainError>;

    /// Updates the row of `table` whose `id` is `id`; returns rows affected.
    async fn update_row(&self, table: &str, fields: &Row, id: i64) -> Result<u64, DomainError>;

    /// Deletes the row of `table` whose `id` is `id`; returns rows affected.
    async fn delete_row(&self, table: &str, id: i64) -> Result<u64, DomainError>;
}

/// Interprets a `COUNT(*)` scalar as a non-negative count. Accepts integers
/// and numeric text; anything else counts as zero.
#[must_use]
pub fn scalar_to_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_param_from_value_maps_scalars_by_type() {
        assert_eq!(Param::from_value(&json!(null)), Param::Null);
        assert_eq!(Param::from_value(&json!(true)), Param::Int(1));
        assert_eq!(Param::from_value(&json!(42)), Param::Int(42));
        assert_eq!(Param::from_value(&json!(1.5)), Param::Real(1.5));
        assert_eq!(
            Param::from_value(&json!("launch")),
            Param::Text("launch".to_owned())
        );
        assert_eq!(
            Param::from_value(&json!({"theme": "dark"})),
            Param::Text(r#"{"theme":"dark"}"#.to_owned())
        );
    }

    #[test]
    fn test_scalar_to_count() {
        assert_eq!(scalar_to_count(Some(&json!(7))), 7);
        assert_eq!(scalar_to_count(Some(&json!("12"))), 12);
        assert_eq!(scalar_to_count(Some(&json!(-3))), 0);
        assert_eq!(scalar_to_count(Some(&json!(null))), 0);
        assert_eq!(scalar_to_count(None), 0);
    }
}
