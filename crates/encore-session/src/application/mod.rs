//! Application layer: the session manager.

pub mod manager;
