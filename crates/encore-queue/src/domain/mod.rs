//! Domain layer: commands and pure queue mutations.

pub mod commands;
pub mod mutations;
