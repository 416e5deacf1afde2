//! Commands for the Queue Mutator.

use encore_core::command::Command;
use encore_core::ids::GuildId;
use uuid::Uuid;

/// Command to move one queue entry to another position.
///
/// Positions are logical (play order) while shuffled and physical otherwise.
#[derive(Debug, Clone)]
pub struct MoveItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The guild whose queue is reordered.
    pub guild_id: GuildId,
    /// Position of the entry to move.
    pub from: usize,
    /// Position it should end up at.
    pub to: usize,
}

impl Command for MoveItem {
    fn command_type(&self) -> &'static str {
        "queue.move_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn guild_id(&self) -> GuildId {
        self.guild_id
    }
}

/// Command to remove entries by physical index.
#[derive(Debug, Clone)]
pub struct RemoveItems {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The guild whose queue is pruned.
    pub guild_id: GuildId,
    /// Physical indices to remove, in any order, duplicates allowed.
    pub indices: Vec<usize>,
}

impl Command for RemoveItems {
    fn command_type(&self) -> &'static str {
        "queue.remove_items"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn guild_id(&self) -> GuildId {
        self.guild_id
    }
}

/// Command to generate (or regenerate) a shuffle permutation.
#[derive(Debug, Clone)]
pub struct ShuffleQueue {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The guild whose queue is shuffled.
    pub guild_id: GuildId,
}

impl Command for ShuffleQueue {
    fn command_type(&self) -> &'static str {
        "queue.shuffle"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn guild_id(&self) -> GuildId {
        self.guild_id
    }
}

/// Command to drop the shuffle permutation.
#[derive(Debug, Clone)]
pub struct UnshuffleQueue {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The guild whose queue is unshuffled.
    pub guild_id: GuildId,
}

impl Command for UnshuffleQueue {
    fn command_type(&self) -> &'static str {
        "queue.unshuffle"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn guild_id(&self) -> GuildId {
        self.guild_id
    }
}

/// Command to empty the queue.
#[derive(Debug, Clone)]
pub struct ClearQueue {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The guild whose queue is emptied.
    pub guild_id: GuildId,
}

impl Command for ClearQueue {
    fn command_type(&self) -> &'static str {
        "queue.clear"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn guild_id(&self) -> GuildId {
        self.guild_id
    }
}
