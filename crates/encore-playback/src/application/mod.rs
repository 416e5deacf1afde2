//! Application layer: the controller, its event dispatcher and read views.

pub mod controller;
pub mod dispatcher;
pub mod query_handlers;

#[cfg(test)]
pub(crate) mod test_harness;
