//! Persistence adapters for the Event context.

pub mod store_event_repository;
