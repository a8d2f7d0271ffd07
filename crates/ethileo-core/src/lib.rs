//! Ethileo Core — shared domain abstractions.
//!
//! This crate defines the value objects, error type and persistence
//! collaborator that the event and guest contexts depend on. It contains no
//! infrastructure code.

pub mod clock;
pub mod email;
pub mod error;
pub mod identity;
pub mod page;
pub mod record;
pub mod rng;
pub mod store;
