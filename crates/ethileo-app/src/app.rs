//! Application composition root.

use std::str::FromStr;
use std::sync::Arc;

use ethileo_core::clock::{Clock, SystemClock};
use ethileo_core::store::Store;
use ethileo_events::domain::repository::EventRepository;
use ethileo_events::infrastructure::store_event_repository::StoreEventRepository;
use ethileo_guests::domain::repository::GuestRepository;
use ethileo_guests::infrastructure::store_guest_repository::StoreGuestRepository;
use ethileo_store::schema::{TableNames, ensure_schema};
use ethileo_store::sqlite_store::SqliteStore;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;

/// Wired repositories and collaborators shared by callers of the engine.
#[derive(Clone)]
pub struct App {
    /// Event persistence.
    pub events: Arc<dyn EventRepository>,
    /// Guest persistence.
    pub guests: Arc<dyn GuestRepository>,
    /// Time source for entity mutations.
    pub clock: Arc<dyn Clock>,
    /// Store shared by both repositories.
    pub store: Arc<dyn Store>,
}

impl App {
    /// Opens the connection pool, creates missing tables and wires the
    /// repositories against them.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the URL is invalid, the pool cannot
    /// connect, or schema creation fails.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let options =
            SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        ensure_schema(&pool, &config.tables).await?;
        info!(
            max_connections = config.max_connections,
            "database connection pool ready"
        );

        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));
        Ok(Self::from_store(store, &config.tables, Arc::new(SystemClock)))
    }

    /// Wires both repositories over an existing store.
    #[must_use]
    pub fn from_store(store: Arc<dyn Store>, tables: &TableNames, clock: Arc<dyn Clock>) -> Self {
        let events = Arc::new(
            StoreEventRepository::new(Arc::clone(&store), tables.events.clone())
                .with_clock(Arc::clone(&clock)),
        );
        let guests = Arc::new(
            StoreGuestRepository::new(Arc::clone(&store), tables.guests.clone())
                .with_clock(Arc::clone(&clock)),
        );
        Self {
            events,
            guests,
            clock,
            store,
        }
    }
}
