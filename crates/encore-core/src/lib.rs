//! Encore Core — shared domain types and collaborator traits.
//!
//! This crate defines the queue data model, the error taxonomy, and the
//! traits behind which the document store, the playback node, the music
//! catalog and the chat platform live. It contains no infrastructure code.

pub mod catalog;
pub mod chat;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ids;
pub mod node;
pub mod queue;
pub mod rng;
pub mod store;
pub mod track;
