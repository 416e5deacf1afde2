//! Shared test mocks and utilities for the Encore music-queue core.

mod catalog;
mod chat;
mod clock;
mod node;
mod rng;
mod store;

pub use catalog::{StubCatalog, catalog_track};
pub use chat::RecordingChat;
pub use clock::{FixedClock, fixed_now};
pub use node::{NodeCall, ScriptedNode, track};
pub use rng::{FrontRng, SequenceRng};
pub use store::{FailingQueueStore, InMemoryQueueStore};
