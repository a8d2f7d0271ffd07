//! Domain model for the Guest context.

pub mod aggregates;
pub mod repository;
pub mod rsvp;
