//! Shared helpers for integration tests against in-memory `SQLite`.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use ethileo_app::app::App;
use ethileo_app::config::Config;
use ethileo_events::domain::aggregates::Event;
use ethileo_test_support::FixedClock;

/// Fixed timestamp used across all integration tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// A clock frozen at [`base_time`].
pub fn fixed_clock() -> FixedClock {
    FixedClock(base_time())
}

/// A clock frozen `hours` after [`base_time`].
pub fn clock_after(hours: i64) -> FixedClock {
    fixed_clock().advanced(Duration::hours(hours))
}

/// Connects a fresh app to a private in-memory database. The pool defaults
/// to one connection, so every statement sees the same database.
pub async fn connect_in_memory() -> App {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".to_owned()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.max_connections, 1);
    App::connect(&config).await.unwrap()
}

/// Saves `count` draft events and returns their IDs, for guests to reference.
pub async fn seed_events(app: &App, count: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for n in 1..=count {
        let mut event = Event::create_from_title(
            1,
            format!("Event {n}"),
            base_time() + Duration::days(30),
            &fixed_clock(),
        )
        .unwrap();
        assert_eq!(event.slug(), format!("event-{n}"));
        assert!(app.events.save(&mut event).await);
        ids.push(event.id().unwrap());
    }
    ids
}
