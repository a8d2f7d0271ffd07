//! Test stores — mock `Store` implementations for repository tests.

use std::sync::Mutex;

use async_trait::async_trait;
use ethileo_core::error::DomainError;
use ethileo_core::store::{Param, Row, Store};
use serde_json::Value;

/// One call made against a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    /// `fetch_scalar`
    FetchScalar { sql: String, params: Vec<Param> },
    /// `fetch_row`
    FetchRow { sql: String, params: Vec<Param> },
    /// `fetch_all`
    FetchAll { sql: String, params: Vec<Param> },
    /// `insert_row`
    Insert { table: String, fields: Row },
    /// `update_row`
    Update { table: String, fields: Row, id: i64 },
    /// `delete_row`
    Delete { table: String, id: i64 },
}

/// A store that records every call and answers from canned data.
///
/// `fetch_row` returns the first configured row, `fetch_all` all of them,
/// `fetch_scalar` the configured scalar. Inserts hand out IDs counting up
/// from 1; updates and deletes report one row affected.
#[derive(Debug)]
pub struct RecordingStore {
    rows: Vec<Row>,
    scalar: Option<Value>,
    next_id: Mutex<i64>,
    calls: Mutex<Vec<StoreCall>>,
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStore {
    /// A store with no rows and no scalar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            scalar: None,
            next_id: Mutex::new(1),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer fetches with `rows`.
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Answer `fetch_scalar` with `value`.
    #[must_use]
    pub fn with_scalar(mut self, value: Value) -> Self {
        self.scalar = Some(value);
        self
    }

    /// Returns a snapshot of all calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn fetch_scalar(
        &self,
        sql: &str,
        params: &[Param],
    ) -> Result<Option<Value>, DomainError> {
        self.record(StoreCall::FetchScalar {
            sql: sql.to_owned(),
            params: params.to_vec(),
        });
        Ok(self.scalar.clone())
    }

    async fn fetch_row(&self, sql: &str, params: &[Param]) -> Result<Option<Row>, DomainError> {
        self.record(StoreCall::FetchRow {
            sql: sql.to_owned(),
            params: params.to_vec(),
        });
        Ok(self.rows.first().cloned())
    }

    async fn fetch_all(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>, DomainError> {
        self.record(StoreCall::FetchAll {
            sql: sql.to_owned(),
            params: params.to_vec(),
        });
        Ok(self.rows.clone())
    }

    async fn insert_row(&self, table: &str, fields: &Row) -> Result<i64, DomainError> {
        self.record(StoreCall::Insert {
            table: table.to_owned(),
            fields: fields.clone(),
        });
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        Ok(id)
    }

    async fn update_row(&self, table: &str, fields: &Row, id: i64) -> Result<u64, DomainError> {
        self.record(StoreCall::Update {
            table: table.to_owned(),
            fields: fields.clone(),
            id,
        });
        Ok(1)
    }

    async fn delete_row(&self, table: &str, id: i64) -> Result<u64, DomainError> {
        self.record(StoreCall::Delete {
            table: table.to_owned(),
            id,
        });
        Ok(1)
    }
}

/// A store whose every call fails. Useful for testing error-handling paths.
#[derive(Debug, Clone, Copy)]
pub struct FailingStore {
    conflict: bool,
}

impl FailingStore {
    /// Fails with `DomainError::Infrastructure`, as if the connection dropped.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { conflict: false }
    }

    /// Fails with `DomainError::Conflict`, as if a unique key was taken.
    #[must_use]
    pub fn conflict() -> Self {
        Self { conflict: true }
    }

    fn error(self) -> DomainError {
        if self.conflict {
            DomainError::Conflict("UNIQUE constraint failed".into())
        } else {
            DomainError::Infrastructure("connection refused".into())
        }
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn fetch_scalar(
        &self,
        _sql: &str,
        _params: &[Param],
    ) -> Result<Option<Value>, DomainError> {
        Err(self.error())
    }

    async fn fetch_row(&self, _sql: &str, _params: &[Param]) -> Result<Option<Row>, DomainError> {
        Err(self.error())
    }

    async fn fetch_all(&self, _sql: &str, _params: &[Param]) -> Result<Vec<Row>, DomainError> {
        Err(self.error())
    }

    async fn insert_row(&self, _table: &str, _fields: &Row) -> Result<i64, DomainError> {
        Err(self.error())
    }

    async fn update_row(&self, _table: &str, _fields: &Row, _id: i64) -> Result<u64, DomainError> {
        Err(self.error())
    }

    async fn delete_row(&self, _table: &str, _id: i64) -> Result<u64, DomainError> {
        Err(self.error())
    }
}
