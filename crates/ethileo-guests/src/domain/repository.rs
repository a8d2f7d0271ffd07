//! Persistence contract for guests.

use async_trait::async_trait;
use ethileo_core::email::Email;
use ethileo_core::error::DomainError;
use ethileo_core::identity::Uuid;
use ethileo_core::page::Page;
use tracing::warn;

use super::aggregates::Guest;
use super::rsvp::RsvpStatus;

/// Repository trait for loading and persisting guests.
///
/// Finders report absence as `Ok(None)` or an empty list. Guest lists are
/// ordered by first name.
#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Load a guest by its store-assigned ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Guest>, DomainError>;

    /// Load a guest by its UUID.
    async fn find_by_uuid(&self, uuid: &Uuid) -> Result<Option<Guest>, DomainError>;

    /// List one page of an event's guests.
    async fn find_by_event_id(&self, event_id: i64, page: Page)
    -> Result<Vec<Guest>, DomainError>;

    /// Load the guest holding check-in token `qr_code`.
    async fn find_by_qr_code(&self, qr_code: &str) -> Result<Option<Guest>, DomainError>;

    /// Load the guest of `event_id` registered under `email`.
    async fn find_by_event_and_email(
        &self,
        event_id: i64,
        email: &Email,
    ) -> Result<Option<Guest>, DomainError>;

    /// Upsert `guest`: insert and assign its ID when unsaved, otherwise
    /// update every column.
    ///
    /// # Errors
    ///
    /// `DomainError::Conflict` when a unique key (UUID, event + email) is
    /// taken or the event does not exist, `DomainError::Infrastructure` for
    /// any other store failure.
    async fn try_save(&self, guest: &mut Guest) -> Result<(), DomainError>;

    /// Delete a saved guest.
    ///
    /// # Errors
    ///
    /// `DomainError::NotPersisted` if `guest` has no ID (the store is not
    /// contacted), otherwise any store failure.
    async fn try_delete(&self, guest: &Guest) -> Result<(), DomainError>;

    /// Number of guests on an event's list.
    async fn count_by_event_id(&self, event_id: i64) -> Result<u64, DomainError>;

    /// Number of an event's guests with RSVP `status`.
    async fn count_by_rsvp_status(
        &self,
        event_id: i64,
        status: RsvpStatus,
    ) -> Result<u64, DomainError>;

    /// Upsert `guest`, reporting only whether it succeeded.
    async fn save(&self, guest: &mut Guest) -> bool {
        match self.try_save(guest).await {
            Ok(()) => true,
            Err(err) => {
                warn!(uuid = %guest.uuid(), error = %err, "guest save failed");
                false
            }
        }
    }

    /// Delete `guest`, reporting only whether it succeeded. Returns `false`
    /// without contacting the store if `guest` was never saved.
    async fn delete(&self, guest: &Guest) -> bool {
        if guest.id().is_none() {
            return false;
        }
        match self.try_delete(guest).await {
            Ok(()) => true,
            Err(err) => {
                warn!(uuid = %guest.uuid(), error = %err, "guest delete failed");
                false
            }
        }
    }
}
