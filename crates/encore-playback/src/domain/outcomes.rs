//! Outcomes reported by the playback controller.

use encore_core::track::Track;

/// Result of trying to start or advance playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A track was handed to the node.
    Started {
        /// Physical index now current.
        index: usize,
        /// The track that was handed over.
        track: Track,
    },
    /// No remaining entry resolved to anything playable. The session should
    /// be torn down.
    Exhausted,
}

impl PlayOutcome {
    /// Whether the queue ran out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

/// Result of an enqueue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The guild was idle: the queue was replaced and playback started.
    Started(PlayOutcome),
    /// The guild was playing: the items were appended.
    Appended {
        /// Number of items appended.
        count: usize,
        /// Logical position of the first appended item.
        position: usize,
    },
}

/// Result of pause or resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// The player changed state.
    Applied,
    /// The player was already in the requested state.
    AlreadyInState,
}

/// Result of a bare `play` with nothing new to enqueue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// The marked track was replayed at the persisted index.
    Resumed {
        /// Persisted index, unchanged.
        index: Option<usize>,
        /// The replayed track.
        track: Track,
    },
    /// The marker did not resolve; playback continued from the queue.
    Continued(PlayOutcome),
    /// The node is already playing, or there is nothing to resume.
    NothingToResume,
}

/// What the dispatcher did with a node event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A track start was announced and recorded.
    Announced,
    /// The event needed no action.
    Ignored,
    /// The queue advanced after a natural end.
    Advanced(PlayOutcome),
}

impl DispatchOutcome {
    /// Whether the event exhausted the queue.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Advanced(outcome) if outcome.is_exhausted())
    }
}
