//! Ethileo Store — relational persistence for events and guests.
//!
//! Provides [`sqlite_store::SqliteStore`], the `sqlx` implementation of the
//! core `Store` trait, and the table layout it expects.

pub mod schema;
pub mod sqlite_store;
