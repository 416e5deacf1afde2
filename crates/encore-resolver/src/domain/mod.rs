//! Domain layer: input classification.

pub mod input;
