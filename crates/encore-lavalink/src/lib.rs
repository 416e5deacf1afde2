//! Encore — Lavalink v4 playback node.
//!
//! Lavalink players hold a single track. This adapter keeps the per-guild
//! player queue, track repeat and voice handshake on the client side, talks
//! to the node over REST, and turns the websocket event stream into
//! `NodeEvent`s.

pub mod client;
pub mod error;
pub mod events;
pub mod node;
pub mod player;
pub mod protocol;

pub use error::LavalinkError;
pub use node::{LavalinkConfig, LavalinkNode};
