//! Event and guest table layout.

use ethileo_core::error::DomainError;
use sqlx::SqlitePool;
use tracing::info;

/// Table prefix used when none is configured.
pub const DEFAULT_TABLE_PREFIX: &str = "ethileo_";

/// Returns `true` if `name` is safe to splice into SQL as an identifier.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Physical table names, derived from a shared prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Events table.
    pub events: String,
    /// Guests table.
    pub guests: String,
}

impl TableNames {
    /// Builds `{prefix}events` and `{prefix}guests`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the prefix would not produce
    /// plain SQL identifiers.
    pub fn with_prefix(prefix: &str) -> Result<Self, DomainError> {
        let names = Self {
            events: format!("{prefix}events"),
            guests: format!("{prefix}guests"),
        };
        if !is_identifier(&names.events) {
            return Err(DomainError::Validation(format!(
                "invalid table prefix: {prefix:?}"
            )));
        }
        Ok(names)
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            events: format!("{DEFAULT_TABLE_PREFIX}events"),
            guests: format!("{DEFAULT_TABLE_PREFIX}guests"),
        }
    }
}

/// Statements creating the events table and its indexes.
#[must_use]
pub fn events_table_ddl(table: &str) -> Vec<String> {
    vec![
        format!(
            r"CREATE TABLE IF NOT EXISTS {table} (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid           TEXT NOT NULL,
    user_id        INTEGER NOT NULL,
    title          TEXT NOT NULL,
    slug           TEXT NOT NULL,
    description    TEXT,
    event_date     TEXT NOT NULL,
    event_end_date TEXT,
    location       TEXT,
    status         TEXT NOT NULL DEFAULT 'draft',
    settings       TEXT,
    created_at     TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at     TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (uuid),
    UNIQUE (slug)
)"
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_user_id ON {table} (user_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_event_date ON {table} (event_date)"),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_status ON {table} (status)"),
    ]
}

/// Statements creating the guests table and its indexes.
///
/// `(event_id, email)` is unique; rows without an email never collide since
/// SQLite treats NULLs as distinct. `event_id` must reference a row of
/// `events_table`, and deleting an event deletes its guests.
#[must_use]
pub fn guests_table_ddl(table: &str, events_table: &str) -> Vec<String> {
    vec![
        format!(
            r"CREATE TABLE IF NOT EXISTS {table} (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid                 TEXT NOT NULL,
    event_id             INTEGER NOT NULL REFERENCES {events_table} (id) ON DELETE CASCADE,
    first_name           TEXT NOT NULL,
    last_name            TEXT,
    email                TEXT,
    phone                TEXT,
    rsvp_status          TEXT NOT NULL DEFAULT 'pending',
    plus_one             INTEGER NOT NULL DEFAULT 0,
    plus_one_name        TEXT,
    dietary_restrictions TEXT,
    notes                TEXT,
    qr_code              TEXT,
    created_at           TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at           TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (uuid),
    UNIQUE (event_id, email)
)"
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_event_id ON {table} (event_id)"),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_rsvp_status ON {table} (rsvp_status)"),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_qr_code ON {table} (qr_code)"),
    ]
}

/// Creates any missing tables and indexes. Safe to run repeatedly.
///
/// # Errors
///
/// Returns the first `sqlx::Error` raised by a DDL statement.
pub async fn ensure_schema(pool: &SqlitePool, tables: &TableNames) -> Result<(), sqlx::Error> {
    let statements = events_table_ddl(&tables.events)
        .into_iter()
        .chain(guests_table_ddl(&tables.guests, &tables.events));
    for statement in statements {
        sqlx::query(&statement).execute(pool).await?;
    }
    info!(events = %tables.events, guests = %tables.guests, "schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_prefix_builds_names() {
        let names = TableNames::with_prefix("wp_ethileo_").unwrap();
        assert_eq!(names.events, "wp_ethileo_events");
        assert_eq!(names.guests, "wp_ethileo_guests");
        assert_eq!(TableNames::with_prefix("").unwrap().events, "events");
    }

    #[test]
    fn test_with_prefix_rejects_non_identifiers() {
        for prefix in ["wp-", "x; DROP TABLE users; --", "1_", "é_"] {
            assert!(matches!(
                TableNames::with_prefix(prefix),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_default_names_match_default_prefix() {
        assert_eq!(
            TableNames::default(),
            TableNames::with_prefix(DEFAULT_TABLE_PREFIX).unwrap()
        );
    }

    #[test]
    fn test_ddl_declares_unique_keys() {
        let events = events_table_ddl("ethileo_events").join("\n");
        let guests = guests_table_ddl("ethileo_guests", "ethileo_events").join("\n");

        assert!(events.contains("UNIQUE (slug)"));
        assert!(events.contains("UNIQUE (uuid)"));
        assert!(guests.contains("UNIQUE (event_id, email)"));
        assert!(guests.contains("UNIQUE (uuid)"));
        assert!(guests.contains("REFERENCES ethileo_events (id) ON DELETE CASCADE"));
    }
}
