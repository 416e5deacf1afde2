//! Encore — Playback Controller.
//!
//! Owns the Idle / Playing / Paused state machine of a guild: starts and
//! advances playback through the queue, keeps the node, the persisted index
//! and the now-playing marker in step, and dispatches node events.

pub mod application;
pub mod domain;

pub use application::controller::PlaybackController;
