//! Flat-record conventions shared by entity hydration and serialization.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Utc};
use serde_json::Value;

use crate::error::DomainError;
use crate::store::Row;

/// Text format timestamps are written in.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp. Accepts the fixed format, RFC 3339 and a bare
/// `YYYY-MM-DD` date (midnight). The result is truncated to whole seconds.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `text` matches none of those forms.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, DomainError> {
    let text = text.trim();
    let parsed = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(text).map(|at| at.with_timezone(&Utc)))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        })
        .map_err(|_| DomainError::Validation(format!("invalid timestamp: {text}")))?;
    Ok(parsed.trunc_subsecs(0))
}

/// Converts an optional string into a row value.
#[must_use]
pub fn opt_text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::String(text.to_owned()))
}

/// Typed, entity-aware accessors over a [`Row`].
///
/// `Null` and missing keys are treated alike. Integer columns accept JSON
/// numbers or numeric text, since some drivers hand back every column as text.
#[derive(Debug, Clone, Copy)]
pub struct RowReader<'a> {
    row: &'a Row,
    entity: &'static str,
}

impl<'a> RowReader<'a> {
    /// Wraps `row`; `entity` names the aggregate in error messages.
    #[must_use]
    pub fn new(row: &'a Row, entity: &'static str) -> Self {
        Self { row, entity }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.row.get(key).filter(|value| !value.is_null())
    }

    fn missing(&self, key: &str) -> DomainError {
        DomainError::Validation(format!("{} row is missing `{key}`", self.entity))
    }

    fn invalid(&self, key: &str, value: &Value) -> DomainError {
        DomainError::Validation(format!(
            "{} row has invalid `{key}`: {value}",
            self.entity
        ))
    }

    /// A required text column.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the column is absent or not text.
    pub fn text(&self, key: &str) -> Result<String, DomainError> {
        self.opt_text(key)?.ok_or_else(|| self.missing(key))
    }

    /// An optional text column. Numbers are rendered as text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for booleans, arrays or objects.
    pub fn opt_text(&self, key: &str) -> Result<Option<String>, DomainError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(self.invalid(key, other)),
        }
    }

    /// A required integer column.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the column is absent or not an
    /// integer.
    pub fn int(&self, key: &str) -> Result<i64, DomainError> {
        self.opt_int(key)?.ok_or_else(|| self.missing(key))
    }

    /// An optional integer column.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the value is present but not an
    /// integer.
    pub fn opt_int(&self, key: &str) -> Result<Option<i64>, DomainError> {
        match self.get(key) {
            None => Ok(None),
            Some(value @ Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| self.invalid(key, value)),
            Some(value @ Value::String(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(key, value)),
            Some(other) => Err(self.invalid(key, other)),
        }
    }

    /// A boolean flag column stored as `0`/`1`. Absent means `false`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for values that are not a flag.
    pub fn flag(&self, key: &str) -> Result<bool, DomainError> {
        match self.get(key) {
            None => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(value @ Value::Number(n)) => n
                .as_i64()
                .map(|int| int != 0)
                .ok_or_else(|| self.invalid(key, value)),
            Some(value @ Value::String(text)) => match text.trim() {
                "" | "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                _ => Err(self.invalid(key, value)),
            },
            Some(other) => Err(self.invalid(key, other)),
        }
    }

    /// A required timestamp column.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the column is absent or unparseable.
    pub fn timestamp(&self, key: &str) -> Result<DateTime<Utc>, DomainError> {
        self.opt_timestamp(key)?.ok_or_else(|| self.missing(key))
    }

    /// An optional timestamp column.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the value is present but
    /// unparseable.
    pub fn opt_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, DomainError> {
        self.opt_text(key)?
            .map(|text| parse_timestamp(&text))
            .transpose()
    }

    /// A JSON object column. Accepts an inline object, its JSON text, or the
    /// empty-array text `[]` that older rows use for "no settings". Absent
    /// means empty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the value is not an object.
    pub fn json_object(&self, key: &str) -> Result<Row, DomainError> {
        let value = match self.get(key) {
            None => return Ok(Row::new()),
            Some(Value::String(text)) if text.trim().is_empty() => return Ok(Row::new()),
            Some(Value::String(text)) => serde_json::from_str::<Value>(text)
                .map_err(|e| self.invalid(key, &Value::String(format!("{text} ({e})"))))?,
            Some(other) => other.clone(),
        };
        match value {
            Value::Object(map) => Ok(map),
            Value::Array(items) if items.is_empty() => Ok(Row::new()),
            other => Err(self.invalid(key, &other)),
        }
    }
}
