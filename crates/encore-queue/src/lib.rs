//! Encore — Queue Mutator.
//!
//! Reorders, prunes and shuffles a guild's durable queue without touching the
//! playback node.

pub mod application;
pub mod domain;
