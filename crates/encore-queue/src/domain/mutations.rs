//! Pure mutations of `GuildQueueState`.
//!
//! Each mutation validates first and only then changes the state, so a
//! rejected command leaves the state exactly as it was. The returned
//! [`Changes`] tells the caller which fields need writing back.

use encore_core::error::DomainError;
use encore_core::queue::{GuildQueueState, QueueItem};
use encore_core::rng::DeterministicRng;

/// Fields of a `GuildQueueState` touched by a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Changes {
    /// The ordered queue changed.
    pub queue: bool,
    /// The current index changed.
    pub index: bool,
    /// The shuffle permutation changed.
    pub shuffle: bool,
}

impl Changes {
    /// Nothing changed.
    pub const NONE: Self = Self {
        queue: false,
        index: false,
        shuffle: false,
    };

    /// Whether any field changed.
    #[must_use]
    pub fn any(self) -> bool {
        self.queue || self.index || self.shuffle
    }
}

fn out_of_bounds(position: usize, len: usize) -> DomainError {
    DomainError::InvalidArgument(format!(
        "position {position} is out of bounds for a queue of {len}"
    ))
}

/// Moves the entry at `from` to `to`.
///
/// While shuffled only the permutation is reordered and both positions are
/// logical. Otherwise the physical queue is reordered and the current index
/// follows the current item.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` if either position is out of bounds.
pub fn move_item(
    state: &mut GuildQueueState,
    from: usize,
    to: usize,
) -> Result<Changes, DomainError> {
    let len = state.len();
    for position in [from, to] {
        if position >= len {
            return Err(out_of_bounds(position, len));
        }
    }
    if from == to {
        return Ok(Changes::NONE);
    }

    if state.is_shuffled() {
        let physical = state.shuffle.remove(from);
        state.shuffle.insert(to, physical);
        return Ok(Changes {
            shuffle: true,
            ..Changes::NONE
        });
    }

    let item = state.queue.remove(from);
    state.queue.insert(to, item);

    let previous = state.index;
    state.index = state.index.map(|current| {
        if from == current {
            to
        } else if from < current && to >= current {
            current - 1
        } else if from > current && to <= current {
            current + 1
        } else {
            current
        }
    });

    Ok(Changes {
        queue: true,
        index: state.index != previous,
        shuffle: false,
    })
}

/// Removes the entries at the given physical indices.
///
/// Indices are deduplicated and removed from the highest down. Entries
/// before the current one shift the current index down. While shuffled the
/// matching permutation entries are dropped and the rest renumbered.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument`, with the state untouched, if no
/// index is given, any index is out of bounds, or any index is the current
/// one.
pub fn remove_items(
    state: &mut GuildQueueState,
    indices: &[usize],
) -> Result<Changes, DomainError> {
    if indices.is_empty() {
        return Err(DomainError::InvalidArgument(
            "no positions to remove".to_owned(),
        ));
    }

    let mut targets = indices.to_vec();
    targets.sort_unstable();
    targets.dedup();

    let len = state.len();
    if let Some(&bad) = targets.iter().find(|&&i| i >= len) {
        return Err(out_of_bounds(bad, len));
    }
    if let Some(current) = state.index
        && targets.contains(&current)
    {
        return Err(DomainError::InvalidArgument(format!(
            "position {current} is currently playing"
        )));
    }

    let previous = state.index;
    let was_shuffled = state.is_shuffled();
    for &removed in targets.iter().rev() {
        state.queue.remove(removed);
        if let Some(current) = state.index.as_mut()
            && removed < *current
        {
            *current -= 1;
        }
        if was_shuffled {
            state.shuffle.retain(|&p| p != removed);
            for p in &mut state.shuffle {
                if *p > removed {
                    *p -= 1;
                }
            }
        }
    }

    Ok(Changes {
        queue: true,
        index: state.index != previous,
        shuffle: was_shuffled,
    })
}

/// Generates a fresh shuffle permutation.
///
/// The current item, if any, is pinned to logical slot 0 and every other
/// physical index is placed with a Fisher-Yates pass driven by `rng`.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` if the queue is empty.
pub fn shuffle(
    state: &mut GuildQueueState,
    rng: &mut dyn DeterministicRng,
) -> Result<Changes, DomainError> {
    if state.is_empty() {
        return Err(DomainError::InvalidArgument(
            "cannot shuffle an empty queue".to_owned(),
        ));
    }

    let mut rest: Vec<usize> = (0..state.len())
        .filter(|&i| Some(i) != state.index)
        .collect();
    for i in (1..rest.len()).rev() {
        let j = rng.index_up_to(i).min(i);
        rest.swap(i, j);
    }

    state.shuffle = state.index.into_iter().chain(rest).collect();
    Ok(Changes {
        shuffle: true,
        ..Changes::NONE
    })
}

/// Drops the shuffle permutation. The physical order is untouched.
pub fn unshuffle(state: &mut GuildQueueState) -> Changes {
    if state.shuffle.is_empty() {
        return Changes::NONE;
    }
    state.shuffle.clear();
    Changes {
        shuffle: true,
        ..Changes::NONE
    }
}

/// Empties the queue and the permutation and drops the now-dangling index.
pub fn clear(state: &mut GuildQueueState) -> Changes {
    state.queue.clear();
    state.shuffle.clear();
    state.index = None;
    Changes {
        queue: true,
        index: true,
        shuffle: true,
    }
}

/// Appends `items` to the physical queue. While shuffled their physical
/// indices are appended to the permutation, in order.
pub fn append_items(state: &mut GuildQueueState, items: Vec<QueueItem>) -> Changes {
    if items.is_empty() {
        return Changes::NONE;
    }
    let start = state.len();
    state.queue.extend(items);
    let shuffled = state.is_shuffled();
    if shuffled {
        state.shuffle.extend(start..state.len());
    }
    Changes {
        queue: true,
        index: false,
        shuffle: shuffled,
    }
}

#[cfg(test)]
mod tests {
    use encore_core::ids::UserId;
    use encore_test_support::{FrontRng, SequenceRng};

    use super::*;

    fn item(name: &str) -> QueueItem {
        QueueItem::search(UserId(1), format!("ytsearch:{name}"))
    }

    fn queue_of(names: &[&str], index: Option<usize>) -> GuildQueueState {
        GuildQueueState {
            queue: names.iter().map(|n| item(n)).collect(),
            index,
            ..GuildQueueState::default()
        }
    }

    fn names(state: &GuildQueueState) -> Vec<String> {
        state.queue.iter().map(|i| i.details().0).collect()
    }

    #[test]
    fn test_move_from_behind_current_to_front_shifts_current_up() {
        // Arrange
        let mut state = queue_of(&["A", "B", "C"], Some(1));

        // Act
        let changes = move_item(&mut state, 2, 0).unwrap();

        // Assert
        assert_eq!(names(&state), vec!["C", "A", "B"]);
        assert_eq!(state.index, Some(2));
        assert!(changes.queue && changes.index);
    }

    #[test]
    fn test_move_preserves_items_and_current_identity_for_all_positions() {
        let original = queue_of(&["A", "B", "C", "D", "E"], Some(2));
        for from in 0..5 {
            for to in 0..5 {
                // Arrange
                let mut state = original.clone();
                let current_before = original.current_item().cloned();
                let moved = original.queue[from].clone();

                // Act
                move_item(&mut state, from, to).unwrap();

                // Assert
                let mut before = names(&original);
                let mut after = names(&state);
                before.sort();
                after.sort();
                assert_eq!(before, after, "multiset changed for move({from}, {to})");
                assert_eq!(state.queue[to], moved);
                assert_eq!(
                    state.current_item().cloned(),
                    current_before,
                    "current changed for move({from}, {to})"
                );
            }
        }
    }

    #[test]
    fn test_move_while_shuffled_reorders_only_permutation() {
        // Arrange
        let mut state = queue_of(&["A", "B", "C", "D"], Some(1));
        state.shuffle = vec![1, 3, 0, 2];

        // Act
        let changes = move_item(&mut state, 3, 1).unwrap();

        // Assert
        assert_eq!(names(&state), vec!["A", "B", "C", "D"]);
        assert_eq!(state.shuffle, vec![1, 2, 3, 0]);
        assert_eq!(state.index, Some(1));
        assert_eq!(
            changes,
            Changes {
                shuffle: true,
                ..Changes::NONE
            }
        );
    }

    #[test]
    fn test_move_out_of_bounds_is_rejected_unchanged() {
        // Arrange
        let mut state = queue_of(&["A", "B"], Some(0));
        let before = state.clone();

        // Act
        let result = move_item(&mut state, 0, 2);

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_remove_current_is_rejected_unchanged() {
        // Arrange
        let mut state = queue_of(&["A", "B", "C"], Some(1));
        state.shuffle = vec![1, 2, 0];
        let before = state.clone();

        // Act
        let result = remove_items(&mut state, &[0, 1]);

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_remove_out_of_bounds_rejects_whole_command() {
        // Arrange
        let mut state = queue_of(&["A", "B", "C"], Some(0));
        let before = state.clone();

        // Act
        let result = remove_items(&mut state, &[2, 5]);

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_remove_before_current_decrements_index() {
        // Arrange
        let mut state = queue_of(&["A", "B", "C"], Some(1));

        // Act
        let changes = remove_items(&mut state, &[0]).unwrap();

        // Assert
        assert_eq!(names(&state), vec!["B", "C"]);
        assert_eq!(state.index, Some(0));
        assert_eq!(state.current_item().unwrap().details().0, "B");
        assert!(changes.queue && changes.index && !changes.shuffle);
    }

    #[test]
    fn test_remove_dedups_and_handles_unsorted_indices() {
        // Arrange
        let mut state = queue_of(&["A", "B", "C", "D", "E"], Some(2));

        // Act
        remove_items(&mut state, &[4, 0, 4, 1]).unwrap();

        // Assert
        assert_eq!(names(&state), vec!["C", "D"]);
        assert_eq!(state.index, Some(0));
    }

    #[test]
    fn test_remove_while_shuffled_renumbers_permutation() {
        // Arrange
        let mut state = queue_of(&["A", "B", "C", "D"], Some(2));
        state.shuffle = vec![2, 0, 3, 1];

        // Act
        let changes = remove_items(&mut state, &[1]).unwrap();

        // Assert
        assert_eq!(names(&state), vec!["A", "C", "D"]);
        assert_eq!(state.index, Some(1));
        assert_eq!(state.shuffle, vec![1, 0, 2]);
        assert!(state.is_consistent());
        assert!(changes.shuffle);
    }

    #[test]
    fn test_shuffle_pins_current_to_first_slot() {
        // Arrange
        let mut state = queue_of(&["A", "B", "C", "D"], Some(1));
        let mut rng = SequenceRng::new(vec![0, 1]);

        // Act
        shuffle(&mut state, &mut rng).unwrap();

        // Assert
        assert_eq!(state.shuffle[0], 1);
        assert!(state.is_consistent());
        assert_eq!(state.shuffle, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_shuffle_then_unshuffle_restores_physical_order() {
        for current in [None, Some(0), Some(3)] {
            // Arrange
            let mut state = queue_of(&["A", "B", "C", "D"], current);
            let before = state.clone();

            // Act
            shuffle(&mut state, &mut FrontRng).unwrap();
            unshuffle(&mut state);

            // Assert
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_shuffle_empty_queue_is_rejected() {
        // Arrange
        let mut state = GuildQueueState::default();

        // Act
        let result = shuffle(&mut state, &mut FrontRng);

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
        assert!(state.shuffle.is_empty());
    }

    #[test]
    fn test_clear_drops_queue_permutation_and_index() {
        // Arrange
        let mut state = queue_of(&["A", "B"], Some(1));
        state.shuffle = vec![1, 0];
        state.loop_all = true;

        // Act
        clear(&mut state);

        // Assert
        assert!(state.is_empty());
        assert!(state.shuffle.is_empty());
        assert_eq!(state.index, None);
        assert!(state.loop_all);
    }

    #[test]
    fn test_append_extends_permutation_with_new_indices() {
        // Arrange
        let mut state = queue_of(&["A", "B"], Some(0));
        state.shuffle = vec![0, 1];

        // Act
        let changes = append_items(&mut state, vec![item("C"), item("D")]);

        // Assert
        assert_eq!(state.shuffle, vec![0, 1, 2, 3]);
        assert!(state.is_consistent());
        assert!(changes.queue && changes.shuffle && !changes.index);
    }
}
