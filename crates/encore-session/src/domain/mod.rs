//! Domain layer: the session model and watchdog rules.

pub mod session;
pub mod watchdog;
