//! Aggregate roots for the Guest context.

use chrono::{DateTime, Utc};
use ethileo_core::clock::Clock;
use ethileo_core::email::Email;
use ethileo_core::error::DomainError;
use ethileo_core::identity::Uuid;
use ethileo_core::record::{RowReader, format_timestamp, opt_text_value};
use ethileo_core::rng::{DeterministicRng, alphanumeric_token};
use ethileo_core::store::Row;
use serde_json::Value;

use super::rsvp::RsvpStatus;

/// Length of an issued check-in token.
pub const QR_CODE_TOKEN_LEN: usize = 32;

/// The aggregate root for a guest of one event.
///
/// The guest refers to its event by ID only; the store enforces that the
/// event exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    id: Option<i64>,
    uuid: Uuid,
    event_id: i64,
    first_name: String,
    last_name: Option<String>,
    email: Option<Email>,
    phone: Option<String>,
    rsvp_status: RsvpStatus,
    plus_one: bool,
    plus_one_name: Option<String>,
    dietary_restrictions: Option<String>,
    notes: Option<String>,
    qr_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Guest {
    /// Creates a new pending guest with a fresh UUID.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `first_name` is blank.
    pub fn create(
        event_id: i64,
        first_name: impl Into<String>,
        last_name: Option<String>,
        email: Option<Email>,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let first_name = first_name.into();
        if first_name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Guest first name cannot be empty".into(),
            ));
        }

        let now = clock.now_seconds();
        Ok(Self {
            id: None,
            uuid: Uuid::generate(),
            event_id,
            first_name,
            last_name,
            email,
            phone: None,
            rsvp_status: RsvpStatus::Pending,
            plus_one: false,
            plus_one_name: None,
            dietary_restrictions: None,
            notes: None,
            qr_code: None,
            created_at: now,
            updated_at: now,
        })
    }

    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    #[must_use]
    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    #[must_use]
    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name,
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_owned()
    }

    #[must_use]
    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub fn rsvp_status(&self) -> RsvpStatus {
        self.rsvp_status
    }

    #[must_use]
    pub fn has_plus_one(&self) -> bool {
        self.plus_one
    }

    #[must_use]
    pub fn plus_one_name(&self) -> Option<&str> {
        self.plus_one_name.as_deref()
    }

    #[must_use]
    pub fn dietary_restrictions(&self) -> Option<&str> {
        self.dietary_restrictions.as_deref()
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Check-in token, if one has been issued.
    #[must_use]
    pub fn qr_code(&self) -> Option<&str> {
        self.qr_code.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Records the ID the store assigned on insert.
    pub fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub fn accept_rsvp(&mut self, clock: &dyn Clock) {
        self.set_rsvp(RsvpStatus::Accepted, clock);
    }

    pub fn decline_rsvp(&mut self, clock: &dyn Clock) {
        self.set_rsvp(RsvpStatus::Declined, clock);
    }

    /// Resets the response to pending.
    pub fn set_pending(&mut self, clock: &dyn Clock) {
        self.set_rsvp(RsvpStatus::Pending, clock);
    }

    /// Allows the guest to bring a companion, optionally named.
    pub fn enable_plus_one(&mut self, name: Option<String>, clock: &dyn Clock) {
        self.plus_one = true;
        self.plus_one_name = name;
        self.touch(clock);
    }

    /// Withdraws the plus-one and forgets the companion's name.
    pub fn disable_plus_one(&mut self, clock: &dyn Clock) {
        self.plus_one = false;
        self.plus_one_name = None;
        self.touch(clock);
    }

    /// Replaces both email and phone.
    pub fn update_contact_info(
        &mut self,
        email: Option<Email>,
        phone: Option<String>,
        clock: &dyn Clock,
    ) {
        self.email = email;
        self.phone = phone;
        self.touch(clock);
    }

    pub fn update_dietary_restrictions(&mut self, restrictions: Option<String>, clock: &dyn Clock) {
        self.dietary_restrictions = restrictions;
        self.touch(clock);
    }

    pub fn update_notes(&mut self, notes: Option<String>, clock: &dyn Clock) {
        self.notes = notes;
        self.touch(clock);
    }

    /// Stores an externally issued check-in token.
    pub fn set_qr_code(&mut self, qr_code: impl Into<String>, clock: &dyn Clock) {
        self.qr_code = Some(qr_code.into());
        self.touch(clock);
    }

    /// Issues a fresh alphanumeric check-in token, replacing any previous one.
    pub fn issue_qr_code(&mut self, rng: &mut dyn DeterministicRng, clock: &dyn Clock) -> &str {
        let token = alphanumeric_token(rng, QR_CODE_TOKEN_LEN);
        self.qr_code = Some(token);
        self.touch(clock);
        self.qr_code.as_deref().unwrap_or_default()
    }

    fn set_rsvp(&mut self, status: RsvpStatus, clock: &dyn Clock) {
        self.rsvp_status = status;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = clock.now_seconds();
    }

    /// Hydrates a guest from a stored row.
    ///
    /// An empty `email` column means no email; missing `rsvp_status`
    /// defaults to pending and missing timestamps to the current time of
    /// `clock`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a required column is missing or a
    /// value (UUID, email, status, timestamp) does not parse.
    pub fn from_row(row: &Row, clock: &dyn Clock) -> Result<Self, DomainError> {
        let reader = RowReader::new(row, "guest");
        let email = reader
            .opt_text("email")?
            .filter(|text| !text.trim().is_empty())
            .map(|text| Email::from_string(&text))
            .transpose()?;
        let rsvp_status = match reader.opt_text("rsvp_status")? {
            Some(text) => text.parse()?,
            None => RsvpStatus::Pending,
        };
        let now = clock.now_seconds();

        Ok(Self {
            id: reader.opt_int("id")?,
            uuid: Uuid::from_string(&reader.text("uuid")?)?,
            event_id: reader.int("event_id")?,
            first_name: reader.text("first_name")?,
            last_name: reader.opt_text("last_name")?,
            email,
            phone: reader.opt_text("phone")?,
            rsvp_status,
            plus_one: reader.flag("plus_one")?,
            plus_one_name: reader.opt_text("plus_one_name")?,
            dietary_restrictions: reader.opt_text("dietary_restrictions")?,
            notes: reader.opt_text("notes")?,
            qr_code: reader.opt_text("qr_code")?,
            created_at: reader.opt_timestamp("created_at")?.unwrap_or(now),
            updated_at: reader.opt_timestamp("updated_at")?.unwrap_or(now),
        })
    }

    /// Serializes the guest to a flat row; `plus_one` is written as `0`/`1`.
    #[must_use]
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.map_or(Value::Null, Value::from));
        row.insert("uuid".into(), Value::from(self.uuid.as_str()));
        row.insert("event_id".into(), Value::from(self.event_id));
        row.insert("first_name".into(), Value::from(self.first_name.as_str()));
        row.insert("last_name".into(), opt_text_value(self.last_name.as_deref()));
        row.insert(
            "email".into(),
            opt_text_value(self.email.as_ref().map(Email::as_str)),
        );
        row.insert("phone".into(), opt_text_value(self.phone.as_deref()));
        row.insert("rsvp_status".into(), Value::from(self.rsvp_status.as_str()));
        row.insert("plus_one".into(), Value::from(i64::from(self.plus_one)));
        row.insert(
            "plus_one_name".into(),
            opt_text_value(self.plus_one_name.as_deref()),
        );
        row.insert(
            "dietary_restrictions".into(),
            opt_text_value(self.dietary_restrictions.as_deref()),
        );
        row.insert("notes".into(), opt_text_value(self.notes.as_deref()));
        row.insert("qr_code".into(), opt_text_value(self.qr_code.as_deref()));
        row.insert(
            "created_at".into(),
            Value::from(format_timestamp(&self.created_at)),
        );
        row.insert(
            "updated_at".into(),
            Value::from(format_timestamp(&self.updated_at)),
        );
        row
    }
}
