//! Command abstractions.

use uuid::Uuid;

use crate::ids::GuildId;

/// Trait that all guild-scoped commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;

    /// The guild whose queue the command acts on.
    fn guild_id(&self) -> GuildId;
}
