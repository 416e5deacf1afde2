//! Encore — Track Resolver.
//!
//! Classifies raw input into durable queue items at enqueue time, and turns
//! queue items into concrete node tracks at play time.

pub mod application;
pub mod domain;
