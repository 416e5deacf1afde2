//! Encore — API server library.
//!
//! Exposes the composition pieces so integration tests can build the same
//! router `main.rs` serves.

pub mod chat;
pub mod config;
pub mod error;
pub mod events;
pub mod routes;
pub mod state;
pub mod voice;
