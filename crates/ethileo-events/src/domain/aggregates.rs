//! Aggregate roots for the Event context.

use chrono::{DateTime, SubsecRound, Utc};
use ethileo_core::clock::Clock;
use ethileo_core::error::DomainError;
use ethileo_core::identity::Uuid;
use ethileo_core::record::{RowReader, format_timestamp, opt_text_value};
use ethileo_core::store::Row;
use serde_json::Value;

use super::slug;
use super::status::EventStatus;

/// Open, caller-defined per-event settings.
pub type Settings = serde_json::Map<String, Value>;

/// The aggregate root for an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    id: Option<i64>,
    uuid: Uuid,
    user_id: i64,
    title: String,
    slug: String,
    description: Option<String>,
    event_date: DateTime<Utc>,
    event_end_date: Option<DateTime<Utc>>,
    location: Option<String>,
    status: EventStatus,
    settings: Settings,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("Event title cannot be empty".into()));
    }
    Ok(())
}

impl Event {
    /// Creates a new draft event with a fresh UUID and no settings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `title` is blank or `slug` is not
    /// URL-safe.
    pub fn create(
        user_id: i64,
        title: impl Into<String>,
        slug: impl Into<String>,
        event_date: DateTime<Utc>,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let slug = slug.into();
        validate_title(&title)?;
        if !slug::is_url_safe(&slug) {
            return Err(DomainError::Validation(format!(
                "Event slug is not URL-safe: {slug:?}"
            )));
        }

        let now = clock.now_seconds();
        Ok(Self {
            id: None,
            uuid: Uuid::generate(),
            user_id,
            title,
            slug,
            description: None,
            event_date: event_date.trunc_subsecs(0),
            event_end_date: None,
            location: None,
            status: EventStatus::Draft,
            settings: Settings::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Creates a new draft event whose slug is derived from `title`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `title` is blank or has no ASCII
    /// letters or digits to build a slug from.
    pub fn create_from_title(
        user_id: i64,
        title: impl Into<String>,
        event_date: DateTime<Utc>,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let slug = slug::slugify(&title);
        Self::create(user_id, title, slug, event_date, clock)
    }

    /// Store-assigned primary key, `None` until first saved.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    #[must_use]
    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    /// Owning user.
    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Start of the event.
    #[must_use]
    pub fn event_date(&self) -> DateTime<Utc> {
        self.event_date
    }

    #[must_use]
    pub fn event_end_date(&self) -> Option<DateTime<Utc>> {
        self.event_end_date
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> EventStatus {
        self.status
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Looks up a single setting.
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
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

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `title` is blank; the event is
    /// left unchanged.
    pub fn update_title(
        &mut self,
        title: impl Into<String>,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        self.touch(clock);
        Ok(())
    }

    pub fn update_description(&mut self, description: Option<String>, clock: &dyn Clock) {
        self.description = description;
        self.touch(clock);
    }

    pub fn update_event_date(&mut self, event_date: DateTime<Utc>, clock: &dyn Clock) {
        self.event_date = event_date.trunc_subsecs(0);
        self.touch(clock);
    }

    pub fn set_event_end_date(&mut self, end: Option<DateTime<Utc>>, clock: &dyn Clock) {
        self.event_end_date = end.map(|at| at.trunc_subsecs(0));
        self.touch(clock);
    }

    pub fn update_location(&mut self, location: Option<String>, clock: &dyn Clock) {
        self.location = location;
        self.touch(clock);
    }

    pub fn publish(&mut self, clock: &dyn Clock) {
        self.set_status(EventStatus::Published, clock);
    }

    /// Moves the event back to draft.
    pub fn draft(&mut self, clock: &dyn Clock) {
        self.set_status(EventStatus::Draft, clock);
    }

    pub fn archive(&mut self, clock: &dyn Clock) {
        self.set_status(EventStatus::Archived, clock);
    }

    /// Merges `settings` over the current ones; incoming keys win.
    pub fn update_settings(&mut self, settings: Settings, clock: &dyn Clock) {
        self.settings.extend(settings);
        self.touch(clock);
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == EventStatus::Published
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.status == EventStatus::Draft
    }

    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.status == EventStatus::Archived
    }

    /// Whether the event started before now.
    #[must_use]
    pub fn is_past(&self, clock: &dyn Clock) -> bool {
        self.event_date < clock.now()
    }

    /// Whether the event starts after now.
    #[must_use]
    pub fn is_upcoming(&self, clock: &dyn Clock) -> bool {
        self.event_date > clock.now()
    }

    fn set_status(&mut self, status: EventStatus, clock: &dyn Clock) {
        self.status = status;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = clock.now_seconds();
    }

    /// Hydrates an event from a stored row.
    ///
    /// Missing `status` defaults to draft; missing timestamps default to the
    /// current time of `clock`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a required column is missing or a
    /// value (UUID, status, timestamp, settings) does not parse.
    pub fn from_row(row: &Row, clock: &dyn Clock) -> Result<Self, DomainError> {
        let reader = RowReader::new(row, "event");
        let status = match reader.opt_text("status")? {
            Some(text) => text.parse()?,
            None => EventStatus::Draft,
        };
        let now = clock.now_seconds();

        Ok(Self {
            id: reader.opt_int("id")?,
            uuid: Uuid::from_string(&reader.text("uuid")?)?,
            user_id: reader.int("user_id")?,
            title: reader.text("title")?,
            slug: reader.text("slug")?,
            description: reader.opt_text("description")?,
            event_date: reader.timestamp("event_date")?,
            event_end_date: reader.opt_timestamp("event_end_date")?,
            location: reader.opt_text("location")?,
            status,
            settings: reader.json_object("settings")?,
            created_at: reader.opt_timestamp("created_at")?.unwrap_or(now),
            updated_at: reader.opt_timestamp("updated_at")?.unwrap_or(now),
        })
    }

    /// Serializes the event to a flat row. Settings become JSON text and
    /// timestamps `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.map_or(Value::Null, Value::from));
        row.insert("uuid".into(), Value::from(self.uuid.as_str()));
        row.insert("user_id".into(), Value::from(self.user_id));
        row.insert("title".into(), Value::from(self.title.as_str()));
        row.insert("slug".into(), Value::from(self.slug.as_str()));
        row.insert(
            "description".into(),
            opt_text_value(self.description.as_deref()),
        );
        row.insert(
            "event_date".into(),
            Value::from(format_timestamp(&self.event_date)),
        );
        row.insert(
            "event_end_date".into(),
            self.event_end_date
                .as_ref()
                .map_or(Value::Null, |at| Value::from(format_timestamp(at))),
        );
        row.insert("location".into(), opt_text_value(self.location.as_deref()));
        row.insert("status".into(), Value::from(self.status.as_str()));
        row.insert(
            "settings".into(),
            Value::from(Value::Object(self.settings.clone()).to_string()),
        );
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
