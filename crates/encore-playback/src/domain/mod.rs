//! Domain layer: operation outcomes.

pub mod outcomes;
