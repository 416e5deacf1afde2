//! Encore — PostgreSQL queue store.

pub mod error;
pub mod pg_queue_store;
