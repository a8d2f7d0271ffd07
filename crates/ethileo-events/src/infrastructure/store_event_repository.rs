//! `Store`-backed implementation of the `EventRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use ethileo_core::clock::{Clock, SystemClock};
use ethileo_core::error::DomainError;
use ethileo_core::identity::Uuid;
use ethileo_core::page::Page;
use ethileo_core::store::{Param, Store, scalar_to_count};
use tracing::debug;

use crate::domain::aggregates::Event;
use crate::domain::repository::EventRepository;
use crate::domain::status::EventStatus;

/// Table used when no prefix is configured.
pub const DEFAULT_EVENTS_TABLE: &str = "ethileo_events";

/// Event repository over a relational [`Store`].
///
/// Translates between event rows and [`Event`]; performs no business
/// validation of its own.
#[derive(Clone)]
pub struct StoreEventRepository {
    store: Arc<dyn Store>,
    table: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for StoreEventRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEventRepository")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl StoreEventRepository {
    /// Creates a repository over `table`. Rows lacking timestamps are
    /// stamped from the system clock.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used to stamp rows that lack timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn find_one(&self, column: &str, param: Param) -> Result<Option<Event>, DomainError> {
        let sql = format!("SELECT * FROM {} WHERE {column} = ?", self.table);
        self.store
            .fetch_row(&sql, &[param])
            .await?
            .map(|row| Event::from_row(&row, self.clock.as_ref()))
            .transpose()
    }

    async fn find_page(
        &self,
        filter: Option<(&str, Param)>,
        page: Page,
    ) -> Result<Vec<Event>, DomainError> {
        let mut params = Vec::with_capacity(3);
        let mut sql = format!("SELECT * FROM {}", self.table);
        if let Some((column, param)) = filter {
            sql.push_str(&format!(" WHERE {column} = ?"));
            params.push(param);
        }
        sql.push_str(" ORDER BY event_date DESC, id DESC LIMIT ? OFFSET ?");
        params.push(page.limit.into());
        params.push(page.offset.into());

        self.store
            .fetch_all(&sql, &params)
            .await?
            .iter()
            .map(|row| Event::from_row(row, self.clock.as_ref()))
            .collect()
    }

    async fn count(&self, filter: Option<(&str, Param)>) -> Result<u64, DomainError> {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let mut params = Vec::with_capacity(1);
        if let Some((column, param)) = filter {
            sql.push_str(&format!(" WHERE {column} = ?"));
            params.push(param);
        }
        let value = self.store.fetch_scalar(&sql, &params).await?;
        Ok(scalar_to_count(value.as_ref()))
    }
}

#[async_trait]
impl EventRepository for StoreEventRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, DomainError> {
        self.find_one("id", id.into()).await
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<Event>, DomainError> {
        self.find_one("uuid", uuid.as_str().into()).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, DomainError> {
        self.find_one("slug", slug.into()).await
    }

    async fn find_by_user_id(&self, user_id: i64, page: Page) -> Result<Vec<Event>, DomainError> {
        self.find_page(Some(("user_id", user_id.into())), page).await
    }

    async fn find_by_status(
        &self,
        status: EventStatus,
        page: Page,
    ) -> Result<Vec<Event>, DomainError> {
        self.find_page(Some(("status", status.as_str().into())), page)
            .await
    }

    async fn find_all(&self, page: Page) -> Result<Vec<Event>, DomainError> {
        self.find_page(None, page).await
    }

    async fn try_save(&self, event: &mut Event) -> Result<(), DomainError> {
        let mut fields = event.to_row();
        fields.remove("id");

        if let Some(id) = event.id() {
            self.store.update_row(&self.table, &fields, id).await?;
            debug!(id, uuid = %event.uuid(), "event updated");
        } else {
            let id = self.store.insert_row(&self.table, &fields).await?;
            event.assign_id(id);
            debug!(id, uuid = %event.uuid(), "event inserted");
        }
        Ok(())
    }

    async fn try_delete(&self, event: &Event) -> Result<(), DomainError> {
        let id = event.id().ok_or(DomainError::NotPersisted("event"))?;
        self.store.delete_row(&self.table, id).await?;
        debug!(id, uuid = %event.uuid(), "event deleted");
        Ok(())
    }

    async fn count_by_user_id(&self, user_id: i64) -> Result<u64, DomainError> {
        self.count(Some(("user_id", user_id.into()))).await
    }

    async fn count_all(&self) -> Result<u64, DomainError> {
        self.count(None).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use ethileo_core::clock::Clock;
    use ethileo_core::error::DomainError;
    use ethileo_core::identity::Uuid;
    use ethileo_core::page::Page;
    use ethileo_core::store::{Param, Row};
    use ethileo_test_support::{FailingStore, FixedClock, RecordingStore, StoreCall};
    use serde_json::json;

    use super::{DEFAULT_EVENTS_TABLE, StoreEventRepository};
    use crate::domain::aggregates::Event;
    use crate::domain::repository::EventRepository;
    use crate::domain::status::EventStatus;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn launch() -> Event {
        Event::create(
            1,
            "Launch",
            "launch",
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            &clock(),
        )
        .unwrap()
    }

    fn stored_row(id: i64, slug: &str) -> Row {
        json!({
            "id": id,
            "uuid": "9b2f6c1e-4a7d-4e0b-8f3a-2c5d6e7f8a9b",
            "user_id": 1,
            "title": "Launch",
            "slug": slug,
            "event_date": "2025-01-01 00:00:00",
            "status": "draft",
            "settings": "{}",
            "created_at": "2026-01-15 10:00:00",
            "updated_at": "2026-01-15 10:00:00",
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[tokio::test]
    async fn test_save_inserts_unsaved_event_and_assigns_id() {
        // Arrange
        let store = Arc::new(RecordingStore::new());
        let repo = StoreEventRepository::new(store.clone(), DEFAULT_EVENTS_TABLE);
        let mut event = launch();

        // Act
        let saved = repo.save(&mut event).await;

        // Assert
        assert!(saved);
        assert_eq!(event.id(), Some(1));
        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            StoreCall::Insert { table, fields } => {
                assert_eq!(table, "ethileo_events");
                assert!(!fields.contains_key("id"));
                assert_eq!(fields["slug"], "launch");
                assert_eq!(fields["status"], "draft");
                assert_eq!(fields["settings"], "{}");
            }
            other => panic!("expected Insert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_save_updates_instead_of_inserting() {
        // Arrange
        let store = Arc::new(RecordingStore::new());
        let repo = StoreEventRepository::new(store.clone(), DEFAULT_EVENTS_TABLE);
        let mut event = launch();
        assert!(repo.save(&mut event).await);

        // Act
        event.publish(&clock());
        let saved = repo.save(&mut event).await;

        // Assert
        assert!(saved);
        assert_eq!(event.id(), Some(1));
        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        match &calls[1] {
            StoreCall::Update { table, fields, id } => {
                assert_eq!(table, "ethileo_events");
                assert_eq!(*id, 1);
                assert!(!fields.contains_key("id"));
                assert_eq!(fields["status"], "published");
            }
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_unsaved_event_never_touches_store() {
        let store = Arc::new(RecordingStore::new());
        let repo = StoreEventRepository::new(store.clone(), DEFAULT_EVENTS_TABLE);

        let deleted = repo.delete(&launch()).await;

        assert!(!deleted);
        assert!(store.calls().is_empty());
        assert!(matches!(
            repo.try_delete(&launch()).await,
            Err(DomainError::NotPersisted("event"))
        ));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_saved_event_deletes_by_id() {
        let store = Arc::new(RecordingStore::new());
        let repo = StoreEventRepository::new(store.clone(), DEFAULT_EVENTS_TABLE);
        let mut event = launch();
        event.assign_id(9);

        assert!(repo.delete(&event).await);
        assert_eq!(
            store.calls(),
            vec![StoreCall::Delete {
                table: "ethileo_events".into(),
                id: 9
            }]
        );
    }

    #[tokio::test]
    async fn test_store_failures_collapse_to_false() {
        let repo = StoreEventRepository::new(Arc::new(FailingStore::unavailable()), "events");
        let mut event = launch();

        assert!(!repo.save(&mut event).await);
        assert_eq!(event.id(), None);

        event.assign_id(3);
        assert!(!repo.save(&mut event).await);
        assert!(!repo.delete(&event).await);
    }

    #[tokio::test]
    async fn test_try_save_surfaces_conflict() {
        let repo = StoreEventRepository::new(Arc::new(FailingStore::conflict()), "events");
        let mut event = launch();

        let result = repo.try_save(&mut event).await;

        assert!(matches!(result, Err(DomainError::Conflict(_))));
        assert_eq!(event.id(), None);
    }

    #[tokio::test]
    async fn test_find_by_slug_binds_parameter_and_hydrates() {
        // Arrange
        let store = Arc::new(RecordingStore::new().with_rows(vec![stored_row(5, "launch")]));
        let repo = StoreEventRepository::new(store.clone(), DEFAULT_EVENTS_TABLE);

        // Act
        let event = repo.find_by_slug("launch").await.unwrap().unwrap();

        // Assert
        assert_eq!(event.id(), Some(5));
        assert_eq!(event.title(), "Launch");
        assert_eq!(
            store.calls(),
            vec![StoreCall::FetchRow {
                sql: "SELECT * FROM ethileo_events WHERE slug = ?".into(),
                params: vec![Param::Text("launch".into())],
            }]
        );
    }

    #[tokio::test]
    async fn test_finders_report_absence_as_none() {
        let repo = StoreEventRepository::new(Arc::new(RecordingStore::new()), "events");
        let uuid = Uuid::from_string("9b2f6c1e-4a7d-4e0b-8f3a-2c5d6e7f8a9b").unwrap();

        assert!(repo.find_by_id(1).await.unwrap().is_none());
        assert!(repo.find_by_uuid(&uuid).await.unwrap().is_none());
        assert!(repo.find_by_slug("nope").await.unwrap().is_none());
        assert!(repo.find_all(Page::first(10)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_finders_order_by_event_date_and_paginate() {
        let store = Arc::new(RecordingStore::new());
        let repo = StoreEventRepository::new(store.clone(), DEFAULT_EVENTS_TABLE);

        repo.find_by_user_id(4, Page::new(20, 40)).await.unwrap();
        repo.find_by_status(EventStatus::Published, Page::first(10))
            .await
            .unwrap();
        repo.find_all(Page::new(5, 5)).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::FetchAll {
                    sql: "SELECT * FROM ethileo_events WHERE user_id = ? \
                          ORDER BY event_date DESC, id DESC LIMIT ? OFFSET ?"
                        .into(),
                    params: vec![Param::Int(4), Param::Int(20), Param::Int(40)],
                },
                StoreCall::FetchAll {
                    sql: "SELECT * FROM ethileo_events WHERE status = ? \
                          ORDER BY event_date DESC, id DESC LIMIT ? OFFSET ?"
                        .into(),
                    params: vec![
                        Param::Text("published".into()),
                        Param::Int(10),
                        Param::Int(0)
                    ],
                },
                StoreCall::FetchAll {
                    sql: "SELECT * FROM ethileo_events \
                          ORDER BY event_date DESC, id DESC LIMIT ? OFFSET ?"
                        .into(),
                    params: vec![Param::Int(5), Param::Int(5)],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_counts_read_scalar() {
        let store = Arc::new(RecordingStore::new().with_scalar(json!(3)));
        let repo = StoreEventRepository::new(store.clone(), DEFAULT_EVENTS_TABLE);

        assert_eq!(repo.count_by_user_id(1).await.unwrap(), 3);
        assert_eq!(repo.count_all().await.unwrap(), 3);
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::FetchScalar {
                    sql: "SELECT COUNT(*) FROM ethileo_events WHERE user_id = ?".into(),
                    params: vec![Param::Int(1)],
                },
                StoreCall::FetchScalar {
                    sql: "SELECT COUNT(*) FROM ethileo_events".into(),
                    params: vec![],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_finder_propagates_hydration_errors() {
        let mut row = stored_row(5, "launch");
        row.insert("uuid".into(), json!("garbage"));
        let repo = StoreEventRepository::new(
            Arc::new(RecordingStore::new().with_rows(vec![row])),
            DEFAULT_EVENTS_TABLE,
        );

        assert!(matches!(
            repo.find_by_id(5).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_rows_without_timestamps_are_stamped_from_the_repository_clock() {
        let mut row = stored_row(5, "launch");
        row.remove("created_at");
        row.remove("updated_at");
        let hydration_clock = FixedClock(Utc.with_ymd_and_hms(2027, 3, 1, 12, 0, 0).unwrap());
        let repo = StoreEventRepository::new(
            Arc::new(RecordingStore::new().with_rows(vec![row])),
            DEFAULT_EVENTS_TABLE,
        )
        .with_clock(Arc::new(hydration_clock));

        let event = repo.find_by_id(5).await.unwrap().unwrap();

        assert_eq!(event.created_at(), hydration_clock.now());
        assert_eq!(event.updated_at(), hydration_clock.now());
    }
}
