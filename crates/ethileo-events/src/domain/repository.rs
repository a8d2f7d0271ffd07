//! Persistence contract for events.

use async_trait::async_trait;
use ethileo_core::error::DomainError;
use ethileo_core::identity::Uuid;
use ethileo_core::page::Page;
use tracing::warn;

use super::aggregates::Event;
use super::status::EventStatus;

/// Repository trait for loading and persisting events.
///
/// Finders report absence as `Ok(None)` or an empty list. List finders order
/// by event date, most recent first.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Load an event by its store-assigned ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, DomainError>;

    /// Load an event by its UUID.
    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<Event>, DomainError>;

    /// Load an event by its slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, DomainError>;

    /// List one page of a user's events.
    async fn find_by_user_id(&self, user_id: i64, page: Page) -> Result<Vec<Event>, DomainError>;

    /// List one page of events in `status`.
    async fn find_by_status(
        &self,
        status: EventStatus,
        page: Page,
    ) -> Result<Vec<Event>, DomainError>;

    /// List one page of all events.
    async fn find_all(&self, page: Page) -> Result<Vec<Event>, DomainError>;

    /// Upsert `event`: insert and assign its ID when unsaved, otherwise
    /// update every column.
    ///
    /// # Errors
    ///
    /// `DomainError::Conflict` when a unique key (slug, UUID) is taken,
    /// `DomainError::Infrastructure` for any other store failure.
    async fn try_save(&self, event: &mut Event) -> Result<(), DomainError>;

    /// Delete a saved event.
    ///
    /// # Errors
    ///
    /// `DomainError::NotPersisted` if `event` has no ID (the store is not
    /// contacted), otherwise any store failure.
    async fn try_delete(&self, event: &Event) -> Result<(), DomainError>;

    /// Number of events owned by `user_id`.
    async fn count_by_user_id(&self, user_id: i64) -> Result<u64, DomainError>;

    /// Number of events.
    async fn count_all(&self) -> Result<u64, DomainError>;

    /// Upsert `event`, reporting only whether it succeeded.
    async fn save(&self, event: &mut Event) -> bool {
        match self.try_save(event).await {
            Ok(()) => true,
            Err(err) => {
                warn!(uuid = %event.uuid(), error = %err, "event save failed");
                false
            }
        }
    }

    /// Delete `event`, reporting only whether it succeeded. Returns `false`
    /// without contacting the store if `event` was never saved.
    async fn delete(&self, event: &Event) -> bool {
        if event.id().is_none() {
            return false;
        }
        match self.try_delete(event).await {
            Ok(()) => true,
            Err(err) => {
                warn!(uuid = %event.uuid(), error = %err, "event delete failed");
                false
            }
        }
    }
}
