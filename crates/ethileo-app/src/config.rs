//! Environment-driven configuration.

use std::str::FromStr;

use ethileo_store::schema::{DEFAULT_TABLE_PREFIX, TableNames};

use crate::error::AppError;

/// Pool size used when `DATABASE_MAX_CONNECTIONS` is unset.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(AppError::Config(format!(
                "LOG_FORMAT must be `json` or `pretty`, got {other:?}"
            ))),
        }
    }
}

/// Returns `true` for `SQLite` URLs naming a private in-memory database.
/// Each pooled connection to such a URL opens its own empty database.
fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// sqlx connection URL, e.g. `sqlite://events.db`.
    pub database_url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// Event and guest table names.
    pub tables: TableNames,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing, or if
    /// `DATABASE_MAX_CONNECTIONS`, `TABLE_PREFIX` or `LOG_FORMAT` is invalid.
    /// An in-memory database defaults to, and only allows, one connection.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".into()))?;

        let in_memory = is_in_memory(&database_url);
        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None if in_memory => 1,
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "DATABASE_MAX_CONNECTIONS must be a positive integer, got {raw:?}"
                    ))
                })?,
        };
        if in_memory && max_connections > 1 {
            return Err(AppError::Config(format!(
                "DATABASE_MAX_CONNECTIONS must be 1 for an in-memory database, got {max_connections}"
            )));
        }

        let prefix = lookup("TABLE_PREFIX").unwrap_or_else(|| DEFAULT_TABLE_PREFIX.to_owned());
        let tables = TableNames::with_prefix(&prefix)
            .map_err(|e| AppError::Config(format!("TABLE_PREFIX: {e}")))?;

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            tables,
            log_format,
        })
    }
}
