//! Command handlers for the Queue Mutator.
//!
//! Each handler loads the guild's queue state, applies one pure mutation and
//! writes back only the fields that mutation changed.

use std::sync::Mutex;

use encore_core::command::Command;
use encore_core::error::DomainError;
use encore_core::ids::GuildId;
use encore_core::queue::GuildQueueState;
use encore_core::rng::DeterministicRng;
use encore_core::store::QueueStore;
use tracing::{debug, info, instrument};

use crate::domain::commands::{ClearQueue, MoveItem, RemoveItems, ShuffleQueue, UnshuffleQueue};
use crate::domain::mutations::{self, Changes};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct QueueCommandResult {
    /// The guild whose queue was mutated.
    pub guild_id: GuildId,
    /// The state after the mutation.
    pub state: GuildQueueState,
    /// Which fields were written back.
    pub changes: Changes,
}

/// Writes the changed fields of `state`, one field per store call.
///
/// A reader racing these writes can see the new queue with the old
/// permutation or index; `GuildDocument::queue_state` repairs such reads.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a store write fails.
pub async fn persist(
    store: &dyn QueueStore,
    guild_id: GuildId,
    state: &GuildQueueState,
    changes: Changes,
) -> Result<(), DomainError> {
    if changes.queue {
        store.set_queue(guild_id, &state.queue).await?;
    }
    if changes.shuffle {
        store.set_shuffle(guild_id, &state.shuffle).await?;
    }
    if changes.index {
        store.set_index(guild_id, state.index).await?;
    }
    Ok(())
}

async fn apply(
    command: &dyn Command,
    store: &dyn QueueStore,
    mutate: impl FnOnce(&mut GuildQueueState) -> Result<Changes, DomainError>,
) -> Result<QueueCommandResult, DomainError> {
    let guild_id = command.guild_id();
    let mut state = store.get_state(guild_id).await?;

    let changes = mutate(&mut state)?;
    persist(store, guild_id, &state, changes).await?;

    debug!(
        command_type = command.command_type(),
        queue_len = state.len(),
        index = ?state.index,
        shuffled = state.is_shuffled(),
        "queue mutated"
    );

    Ok(QueueCommandResult {
        guild_id,
        state,
        changes,
    })
}

/// Handles the `MoveItem` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` for out-of-bounds positions, or a
/// store error.
#[instrument(skip(store), fields(correlation_id = %command.correlation_id, guild_id = %command.guild_id))]
pub async fn handle_move_item(
    command: &MoveItem,
    store: &dyn QueueStore,
) -> Result<QueueCommandResult, DomainError> {
    info!(from = command.from, to = command.to, "moving queue item");
    apply(command, store, |state| {
        mutations::move_item(state, command.from, command.to)
    })
    .await
}

/// Handles the `RemoveItems` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` if any index is out of bounds or
/// currently playing, or a store error.
#[instrument(skip(store), fields(correlation_id = %command.correlation_id, guild_id = %command.guild_id))]
pub async fn handle_remove_items(
    command: &RemoveItems,
    store: &dyn QueueStore,
) -> Result<QueueCommandResult, DomainError> {
    info!(count = command.indices.len(), "removing queue items");
    apply(command, store, |state| {
        mutations::remove_items(state, &command.indices)
    })
    .await
}

/// Handles the `ShuffleQueue` command.
///
/// The `Mutex` is locked only around the synchronous shuffle, never across
/// an await point.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` for an empty queue, or a store
/// error.
#[instrument(skip(store, rng), fields(correlation_id = %command.correlation_id, guild_id = %command.guild_id))]
pub async fn handle_shuffle_queue(
    command: &ShuffleQueue,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &dyn QueueStore,
) -> Result<QueueCommandResult, DomainError> {
    info!("shuffling queue");
    apply(command, store, |state| {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        mutations::shuffle(state, &mut *rng_guard)
    })
    .await
}

/// Handles the `UnshuffleQueue` command.
///
/// # Errors
///
/// Returns `DomainError` if a store call fails.
#[instrument(skip(store), fields(correlation_id = %command.correlation_id, guild_id = %command.guild_id))]
pub async fn handle_unshuffle_queue(
    command: &UnshuffleQueue,
    store: &dyn QueueStore,
) -> Result<QueueCommandResult, DomainError> {
    info!("unshuffling queue");
    apply(command, store, |state| Ok(mutations::unshuffle(state))).await
}

/// Handles the `ClearQueue` command. The node keeps playing whatever it has.
///
/// # Errors
///
/// Returns `DomainError` if a store call fails.
#[instrument(skip(store), fields(correlation_id = %command.correlation_id, guild_id = %command.guild_id))]
pub async fn handle_clear_queue(
    command: &ClearQueue,
    store: &dyn QueueStore,
) -> Result<QueueCommandResult, DomainError> {
    info!("clearing queue");
    apply(command, store, |state| Ok(mutations::clear(state))).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use encore_core::error::DomainError;
    use encore_core::ids::{GuildId, UserId};
    use encore_core::queue::{GuildQueueState, QueueItem};
    use encore_core::rng::DeterministicRng;
    use encore_core::store::{QueueStore, fields};
    use encore_test_support::{FailingQueueStore, FrontRng, InMemoryQueueStore};
    use uuid::Uuid;

    use super::*;

    const GUILD: GuildId = GuildId(42);

    fn store_with(names: &[&str], index: Option<usize>) -> InMemoryQueueStore {
        InMemoryQueueStore::with_state(
            GUILD,
            GuildQueueState {
                queue: names
                    .iter()
                    .map(|n| QueueItem::search(UserId(1), format!("ytsearch:{n}")))
                    .collect(),
                index,
                ..GuildQueueState::default()
            },
        )
    }

    #[tokio::test]
    async fn test_handle_move_item_writes_queue_then_index() {
        // Arrange
        let store = store_with(&["A", "B", "C"], Some(1));
        let command = MoveItem {
            correlation_id: Uuid::new_v4(),
            guild_id: GUILD,
            from: 2,
            to: 0,
        };

        // Act
        let result = handle_move_item(&command, &store).await.unwrap();

        // Assert
        assert_eq!(result.state.index, Some(2));
        assert_eq!(
            store.writes(),
            vec![(GUILD, fields::QUEUE), (GUILD, fields::QUEUE_INDEX)]
        );
        let persisted = store.get_state(GUILD).await.unwrap();
        assert_eq!(persisted.index, Some(2));
        assert_eq!(persisted.queue[2].details().0, "B");
    }

    #[tokio::test]
    async fn test_handle_remove_items_rejects_current_without_writing() {
        // Arrange
        let store = store_with(&["A", "B", "C"], Some(1));
        let command = RemoveItems {
            correlation_id: Uuid::new_v4(),
            guild_id: GUILD,
            indices: vec![1],
        };

        // Act
        let result = handle_remove_items(&command, &store).await;

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert!(store.writes().is_empty());
        assert_eq!(store.get_state(GUILD).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_handle_remove_items_keeps_current_item_current() {
        // Arrange
        let store = store_with(&["A", "B", "C"], Some(1));
        let command = RemoveItems {
            correlation_id: Uuid::new_v4(),
            guild_id: GUILD,
            indices: vec![0],
        };

        // Act
        handle_remove_items(&command, &store).await.unwrap();

        // Assert
        let persisted = store.get_state(GUILD).await.unwrap();
        assert_eq!(persisted.index, Some(0));
        assert_eq!(persisted.current_item().unwrap().details().0, "B");
    }

    #[tokio::test]
    async fn test_handle_shuffle_then_unshuffle_restores_order() {
        // Arrange
        let store = store_with(&["A", "B", "C", "D"], Some(1));
        let rng: Mutex<FrontRng> = Mutex::new(FrontRng);
        let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;
        let before = store.get_state(GUILD).await.unwrap();

        // Act
        let shuffled = handle_shuffle_queue(
            &ShuffleQueue {
                correlation_id: Uuid::new_v4(),
                guild_id: GUILD,
            },
            rng_ref,
            &store,
        )
        .await
        .unwrap();
        handle_unshuffle_queue(
            &UnshuffleQueue {
                correlation_id: Uuid::new_v4(),
                guild_id: GUILD,
            },
            &store,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(shuffled.state.shuffle[0], 1);
        assert_eq!(shuffled.changes, Changes { shuffle: true, ..Changes::NONE });
        assert_eq!(store.get_state(GUILD).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_handle_clear_queue_drops_index() {
        // Arrange
        let store = store_with(&["A", "B"], Some(0));

        // Act
        handle_clear_queue(
            &ClearQueue {
                correlation_id: Uuid::new_v4(),
                guild_id: GUILD,
            },
            &store,
        )
        .await
        .unwrap();

        // Assert
        let persisted = store.get_state(GUILD).await.unwrap();
        assert!(persisted.is_empty());
        assert!(persisted.is_idle());
    }

    #[tokio::test]
    async fn test_handle_move_item_propagates_store_failure() {
        // Arrange
        let command = MoveItem {
            correlation_id: Uuid::new_v4(),
            guild_id: GUILD,
            from: 0,
            to: 1,
        };

        // Act
        let result = handle_move_item(&command, &FailingQueueStore).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
