//! Encore — Session Lifecycle Manager.
//!
//! Binds a guild to a voice channel, watches it for inactivity, tears it
//! down on every disconnect path, and resumes interrupted playback.

pub mod application;
pub mod domain;

pub use application::manager::SessionManager;
