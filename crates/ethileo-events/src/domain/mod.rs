//! Domain model for the Event context.

pub mod aggregates;
pub mod repository;
pub mod slug;
pub mod status;
