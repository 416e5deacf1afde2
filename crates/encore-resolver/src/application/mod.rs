//! Application layer: resolution against the node, catalog and chat.

pub mod resolve;
