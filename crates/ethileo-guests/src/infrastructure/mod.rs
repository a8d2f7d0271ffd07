//! Persistence adapters for the Guest context.

pub mod store_guest_repository;
