//! Ethileo — Event bounded context.
//!
//! Responsible for events: titles, slugs, schedule, location,
//! publication status and per-event settings.

pub mod domain;
pub mod infrastructure;
