//! `Store`-backed implementation of the `GuestRepository` trait.

use std::sync::Arc;

use async_trait::async_trait;
use ethileo_core::clock::{Clock, SystemClock};
use ethileo_core::email::Email;
use ethileo_core::error::DomainError;
use ethileo_core::identity::Uuid;
use ethileo_core::page::Page;
use ethileo_core::store::{Param, Store, scalar_to_count};
use tracing::debug;

use crate::domain::aggregates::Guest;
use crate::domain::repository::GuestRepository;
use crate::domain::rsvp::RsvpStatus;

/// Table used when no prefix is configured.
pub const DEFAULT_GUESTS_TABLE: &str = "ethileo_guests";

/// Guest repository over a relational [`Store`].
#[derive(Clone)]
pub struct StoreGuestRepository {
    store: Arc<dyn Store>,
    table: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for StoreGuestRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreGuestRepository")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl StoreGuestRepository {
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

    async fn find_one(
        &self,
        condition: &str,
        params: &[Param],
    ) -> Result<Option<Guest>, DomainError> {
        let sql = format!("SELECT * FROM {} WHERE {condition}", self.table);
        self.store
            .fetch_row(&sql, params)
            .await?
            .map(|row| Guest::from_row(&row, self.clock.as_ref()))
            .transpose()
    }

    async fn count(&self, condition: &str, params: &[Param]) -> Result<u64, DomainError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {condition}", self.table);
        let value = self.store.fetch_scalar(&sql, params).await?;
        Ok(scalar_to_count(value.as_ref()))
    }
}

#[async_trait]
impl GuestRepository for StoreGuestRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Guest>, DomainError> {
        self.find_one("id = ?", &[Param::from(id)]).await
    }

    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<Guest>, DomainError> {
        self.find_one("uuid = ?", &[Param::from(uuid.as_str())]).await
    }

    async fn find_by_event_id(
        &self,
        event_id: i64,
        page: Page,
    ) -> Result<Vec<Guest>, DomainError> {
        let sql = format!(
            "SELECT * FROM {} WHERE event_id = ? ORDER BY first_name ASC, id ASC LIMIT ? OFFSET ?",
            self.table
        );
        let params: [Param; 3] = [event_id.into(), page.limit.into(), page.offset.into()];
        self.store
            .fetch_all(&sql, &params)
            .await?
            .iter()
            .map(|row| Guest::from_row(row, self.clock.as_ref()))
            .collect()
    }

    async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<Guest>, DomainError> {
        self.find_one("qr_code = ?", &[Param::from(qr_code)]).await
    }

    async fn find_by_event_and_email(
        &self,
        event_id: i64,
        email: &Email,
    ) -> Result<Option<Guest>, DomainError> {
        self.find_one(
            "event_id = ? AND email = ?",
            &[Param::from(event_id), Param::from(email.as_str())],
        )
        .await
    }

    async fn try_save(&self, guest: &mut Guest) -> Result<(), DomainError> {
        let mut fields = guest.to_row();
        fields.remove("id");

        if let Some(id) = guest.id() {
            self.store.update_row(&self.table, &fields, id).await?;
            debug!(id, uuid = %guest.uuid(), "guest updated");
        } else {
            let id = self.store.insert_row(&self.table, &fields).await?;
            guest.assign_id(id);
            debug!(id, uuid = %guest.uuid(), event_id = guest.event_id(), "guest inserted");
        }
        Ok(())
    }

    async fn try_delete(&self, guest: &Guest) -> Result<(), DomainError> {
        let id = guest.id().ok_or(DomainError::NotPersisted("guest"))?;
        self.store.delete_row(&self.table, id).await?;
        debug!(id, uuid = %guest.uuid(), "guest deleted");
        Ok(())
    }

    async fn count_by_event_id(&self, event_id: i64) -> Result<u64, DomainError> {
        self.count("event_id = ?", &[Param::from(event_id)]).await
    }

    async fn count_by_rsvp_status(
        &self,
        event_id: i64,
        status: RsvpStatus,
    ) -> Result<u64, DomainError> {
        self.count(
            "event_id = ? AND rsvp_status = ?",
            &[Param::from(event_id), Param::from(status.as_str())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use ethileo_core::clock::Clock;
    use ethileo_core::email::Email;
    use ethileo_core::error::DomainError;
    use ethileo_core::page::Page;
    use ethileo_core::store::{Param, Row};
    use ethileo_test_support::{FailingStore, FixedClock, RecordingStore, StoreCall};
    use serde_json::json;

    use super::{DEFAULT_GUESTS_TABLE, StoreGuestRepository};
    use crate::domain::aggregates::Guest;
    use crate::domain::repository::GuestRepository;
    use crate::domain::rsvp::RsvpStatus;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    fn ann() -> Guest {
        Guest::create(1, "Ann", None, None, &clock()).unwrap()
    }

    fn stored_row(id: i64, first_name: &str) -> Row {
        json!({
            "id": id,
            "uuid": "0b7c2f1e-9a7d-4e0b-8f3a-2c5d6e7f8a9b",
            "event_id": 1,
            "first_name": first_name,
            "email": "ann@example.com",
            "rsvp_status": "accepted",
            "plus_one": 0,
            "created_at": "2026-01-15 10:00:00",
            "updated_at": "2026-01-15 10:00:00",
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[tokio::test]
    async fn test_save_inserts_then_updates() {
        // Arrange
        let store = Arc::new(RecordingStore::new());
        let repo = StoreGuestRepository::new(store.clone(), DEFAULT_GUESTS_TABLE);
        let mut guest = ann();

        // Act
        assert!(repo.save(&mut guest).await);
        guest.accept_rsvp(&clock());
        assert!(repo.save(&mut guest).await);

        // Assert
        assert_eq!(guest.id(), Some(1));
        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], StoreCall::Insert { table, .. } if table == "ethileo_guests"));
        match &calls[1] {
            StoreCall::Update { fields, id, .. } => {
                assert_eq!(*id, 1);
                assert!(!fields.contains_key("id"));
                assert_eq!(fields["rsvp_status"], "accepted");
                assert_eq!(fields["plus_one"], 0);
            }
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_unsaved_guest_never_touches_store() {
        let store = Arc::new(RecordingStore::new());
        let repo = StoreGuestRepository::new(store.clone(), DEFAULT_GUESTS_TABLE);

        assert!(!repo.delete(&ann()).await);
        assert!(matches!(
            repo.try_delete(&ann()).await,
            Err(DomainError::NotPersisted("guest"))
        ));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_event_id_orders_by_first_name() {
        let store = Arc::new(
            RecordingStore::new().with_rows(vec![stored_row(2, "Ann"), stored_row(1, "Bob")]),
        );
        let repo = StoreGuestRepository::new(store.clone(), DEFAULT_GUESTS_TABLE);

        let guests = repo.find_by_event_id(1, Page::first(100)).await.unwrap();

        assert_eq!(guests.len(), 2);
        assert_eq!(guests[0].first_name(), "Ann");
        assert_eq!(
            store.calls(),
            vec![StoreCall::FetchAll {
                sql: "SELECT * FROM ethileo_guests WHERE event_id = ? \
                      ORDER BY first_name ASC, id ASC LIMIT ? OFFSET ?"
                    .into(),
                params: vec![Param::Int(1), Param::Int(100), Param::Int(0)],
            }]
        );
    }

    #[tokio::test]
    async fn test_find_by_qr_code_and_email_bind_parameters() {
        let store = Arc::new(RecordingStore::new().with_rows(vec![stored_row(2, "Ann")]));
        let repo = StoreGuestRepository::new(store.clone(), DEFAULT_GUESTS_TABLE);
        let email = Email::from_string("Ann@Example.com").unwrap();

        let by_code = repo.find_by_qr_code("TOKEN").await.unwrap().unwrap();
        let by_email = repo
            .find_by_event_and_email(1, &email)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(by_code.rsvp_status(), RsvpStatus::Accepted);
        assert_eq!(by_email.id(), Some(2));
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::FetchRow {
                    sql: "SELECT * FROM ethileo_guests WHERE qr_code = ?".into(),
                    params: vec![Param::Text("TOKEN".into())],
                },
                StoreCall::FetchRow {
                    sql: "SELECT * FROM ethileo_guests WHERE event_id = ? AND email = ?".into(),
                    params: vec![Param::Int(1), Param::Text("ann@example.com".into())],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_counts_filter_by_event_and_status() {
        let store = Arc::new(RecordingStore::new().with_scalar(json!("4")));
        let repo = StoreGuestRepository::new(store.clone(), DEFAULT_GUESTS_TABLE);

        assert_eq!(repo.count_by_event_id(1).await.unwrap(), 4);
        assert_eq!(
            repo.count_by_rsvp_status(1, RsvpStatus::Declined)
                .await
                .unwrap(),
            4
        );
        assert_eq!(
            store.calls()[1],
            StoreCall::FetchScalar {
                sql: "SELECT COUNT(*) FROM ethileo_guests WHERE event_id = ? AND rsvp_status = ?"
                    .into(),
                params: vec![Param::Int(1), Param::Text("declined".into())],
            }
        );
    }

    #[tokio::test]
    async fn test_store_failures_collapse_to_false_but_finders_error() {
        let repo = StoreGuestRepository::new(Arc::new(FailingStore::unavailable()), "guests");
        let mut guest = ann();

        assert!(!repo.save(&mut guest).await);
        assert_eq!(guest.id(), None);
        assert!(matches!(
            repo.find_by_id(1).await,
            Err(DomainError::Infrastructure(_))
        ));
    }

    #[tokio::test]
    async fn test_try_save_surfaces_conflict() {
        let repo = StoreGuestRepository::new(Arc::new(FailingStore::conflict()), "guests");
        let mut guest = ann();

        assert!(matches!(
            repo.try_save(&mut guest).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_rows_without_timestamps_are_stamped_from_the_repository_clock() {
        let mut row = stored_row(3, "Ann");
        row.remove("created_at");
        row.remove("updated_at");
        let hydration_clock = FixedClock(Utc.with_ymd_and_hms(2027, 3, 1, 12, 0, 0).unwrap());
        let repo = StoreGuestRepository::new(
            Arc::new(RecordingStore::new().with_rows(vec![row])),
            DEFAULT_GUESTS_TABLE,
        )
        .with_clock(Arc::new(hydration_clock));

        let guest = repo.find_by_id(3).await.unwrap().unwrap();

        assert_eq!(guest.created_at(), hydration_clock.now());
        assert_eq!(guest.updated_at(), hydration_clock.now());
    }
}
