//! Shared test doubles and utilities for the Ethileo events engine.

mod clock;
mod rng;
mod store;

pub use clock::FixedClock;
pub use rng::SequenceRng;
pub use store::{FailingStore, RecordingStore, StoreCall};
