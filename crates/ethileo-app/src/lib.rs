//! Ethileo App — configuration, wiring and logging for the events engine.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
