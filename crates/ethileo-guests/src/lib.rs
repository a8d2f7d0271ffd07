//! Ethileo — Guest list bounded context.
//!
//! Responsible for guests of an event: contact details, RSVP state,
//! plus-ones and check-in tokens.

pub mod domain;
pub mod infrastructure;
