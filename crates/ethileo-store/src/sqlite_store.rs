//! `sqlx` implementation of the [`Store`] trait on `SQLite`.

use async_trait::async_trait;
use ethileo_core::error::DomainError;
use ethileo_core::store::{Param, Row, Store};
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tracing::{debug, instrument};

use crate::schema::is_identifier;

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// `SQLite`-backed store sharing a connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new store on the given pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn bind_params<'q>(mut query: SqliteQuery<'q>, params: &[Param]) -> SqliteQuery<'q> {
    for param in params {
        query = match param {
            Param::Int(value) => query.bind(*value),
            Param::Real(value) => query.bind(*value),
            Param::Text(value) => query.bind(value.clone()),
            Param::Null => query.bind(None::<String>),
        };
    }
    query
}

fn decode_column(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let value = match raw.type_info().name() {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get::<i64, _>(index)?),
        "REAL" => Value::from(row.try_get::<f64, _>(index)?),
        "BLOB" => {
            let bytes = row.try_get::<Vec<u8>, _>(index)?;
            Value::from(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::from(row.try_get::<String, _>(index)?),
    };
    Ok(value)
}

fn decode_row(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    let mut fields = Row::new();
    for column in row.columns() {
        fields.insert(column.name().to_owned(), decode_column(row, column.ordinal())?);
    }
    Ok(fields)
}

/// Maps a `sqlx` failure onto the domain error taxonomy. Unique-key and
/// event-reference violations become conflicts; everything else is
/// infrastructure.
fn store_error(err: sqlx::Error) -> DomainError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
            return DomainError::Conflict(db_err.message().to_owned());
        }
    }
    DomainError::Infrastructure(err.to_string())
}

fn check_identifiers<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<(), DomainError> {
    for name in names {
        if !is_identifier(name) {
            return Err(DomainError::Validation(format!(
                "invalid SQL identifier: {name:?}"
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    #[instrument(level = "debug", skip(self, sql, params), fields(params = params.len()))]
    async fn fetch_scalar(
        &self,
        sql: &str,
        params: &[Param],
    ) -> Result<Option<Value>, DomainError> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        match row {
            Some(row) if !row.columns().is_empty() => {
                decode_column(&row, 0).map(Some).map_err(store_error)
            }
            _ => Ok(None),
        }
    }

    #[instrument(level = "debug", skip(self, sql, params), fields(params = params.len()))]
    async fn fetch_row(&self, sql: &str, params: &[Param]) -> Result<Option<Row>, DomainError> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        row.as_ref().map(decode_row).transpose().map_err(store_error)
    }

    #[instrument(level = "debug", skip(self, sql, params), fields(params = params.len()))]
    async fn fetch_all(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>, DomainError> {
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        rows.iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(store_error)
    }

    #[instrument(level = "debug", skip(self, fields))]
    async fn insert_row(&self, table: &str, fields: &Row) -> Result<i64, DomainError> {
        check_identifiers(std::iter::once(table).chain(fields.keys().map(String::as_str)))?;

        let sql = if fields.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            let columns = fields.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
            let placeholders = vec!["?"; fields.len()].join(", ");
            format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})")
        };
        let params: Vec<Param> = fields.values().map(Param::from_value).collect();

        let result = bind_params(sqlx::query(&sql), &params)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        let id = result.last_insert_rowid();
        debug!(id, "row inserted");
        Ok(id)
    }

    #[instrument(level = "debug", skip(self, fields))]
    async fn update_row(&self, table: &str, fields: &Row, id: i64) -> Result<u64, DomainError> {
        check_identifiers(std::iter::once(table).chain(fields.keys().map(String::as_str)))?;
        if fields.is_empty() {
            return Ok(0);
        }

        let assignments = fields
            .keys()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {table} SET {assignments} WHERE id = ?");
        let mut params: Vec<Param> = fields.values().map(Param::from_value).collect();
        params.push(Param::Int(id));

        let result = bind_params(sqlx::query(&sql), &params)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_row(&self, table: &str, id: i64) -> Result<u64, DomainError> {
        check_identifiers([table])?;
        let sql = format!("DELETE FROM {table} WHERE id = ?");
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_identifiers_rejects_injection() {
        assert!(check_identifiers(["ethileo_events", "event_date"]).is_ok());

        let result = check_identifiers(["ethileo_events", "title = 'x'; --"]);

        match result {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("invalid SQL identifier")),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_store_error_maps_non_database_errors_to_infrastructure() {
        let err = store_error(sqlx::Error::RowNotFound);

        assert!(matches!(err, DomainError::Infrastructure(_)));
    }
}
