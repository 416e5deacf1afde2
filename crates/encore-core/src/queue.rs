//! Durable queue model.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// What a queue item asks the node to play. Exactly one source per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemSource {
    /// A direct stream URL, handed to the node as-is.
    Url {
        /// The URL.
        url: String,
    },
    /// A track reference from the music catalog.
    #[serde(rename_all = "camelCase")]
    Catalog {
        /// Track title.
        title: String,
        /// Primary artist.
        artist: String,
        /// Catalog track id.
        catalog_id: String,
        /// Track length in milliseconds.
        duration_ms: u64,
    },
    /// A search expression carrying a node search prefix (e.g. `ytsearch:`).
    Search {
        /// The prefixed expression.
        expression: String,
    },
}

/// A durable, unresolved request to play something.
///
/// Never mutated after creation; replaced, not edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Who asked for it.
    pub requester: UserId,
    /// What to play.
    pub source: ItemSource,
}

impl QueueItem {
    /// A direct stream URL item.
    #[must_use]
    pub fn url(requester: UserId, url: impl Into<String>) -> Self {
        Self {
            requester,
            source: ItemSource::Url { url: url.into() },
        }
    }

    /// A catalog reference item.
    #[must_use]
    pub fn catalog(
        requester: UserId,
        title: impl Into<String>,
        artist: impl Into<String>,
        catalog_id: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            requester,
            source: ItemSource::Catalog {
                title: title.into(),
                artist: artist.into(),
                catalog_id: catalog_id.into(),
                duration_ms,
            },
        }
    }

    /// A prefixed search expression item.
    #[must_use]
    pub fn search(requester: UserId, expression: impl Into<String>) -> Self {
        Self {
            requester,
            source: ItemSource::Search {
                expression: expression.into(),
            },
        }
    }

    /// Title and subtitle for listings, without contacting anything.
    #[must_use]
    pub fn details(&self) -> (String, String) {
        match &self.source {
            ItemSource::Catalog { title, artist, .. } => (title.clone(), format!("by {artist}")),
            ItemSource::Url { url } => (url.clone(), "Direct link".to_owned()),
            ItemSource::Search { expression } => {
                let text = expression
                    .split_once(':')
                    .map_or(expression.as_str(), |(_, rest)| rest);
                (text.to_owned(), "Search query".to_owned())
            }
        }
    }
}

/// Per-guild queue bookkeeping.
///
/// `queue` is the physical order and is never reordered by shuffling.
/// `shuffle` is either empty or a permutation of `0..queue.len()` mapping
/// logical play positions to physical indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildQueueState {
    /// Items in insertion order.
    pub queue: Vec<QueueItem>,
    /// Physical index of the current item; `None` means idle.
    pub index: Option<usize>,
    /// Wrap to the start when the queue is exhausted.
    pub loop_all: bool,
    /// Logical-to-physical permutation, empty when unshuffled.
    pub shuffle: Vec<usize>,
}

impl GuildQueueState {
    /// Number of items in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether a shuffle permutation is active.
    #[must_use]
    pub fn is_shuffled(&self) -> bool {
        !self.shuffle.is_empty()
    }

    /// "No current index" is the authoritative idle signal.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.index.is_none()
    }

    /// Translates a logical play position into a physical index.
    #[must_use]
    pub fn physical(&self, logical: usize) -> Option<usize> {
        if self.is_shuffled() {
            self.shuffle.get(logical).copied()
        } else if logical < self.len() {
            Some(logical)
        } else {
            None
        }
    }

    /// Translates a physical index into its logical play position.
    #[must_use]
    pub fn logical(&self, physical: usize) -> Option<usize> {
        if self.is_shuffled() {
            self.shuffle.iter().position(|&p| p == physical)
        } else if physical < self.len() {
            Some(physical)
        } else {
            None
        }
    }

    /// The item at the current index, if any.
    #[must_use]
    pub fn current_item(&self) -> Option<&QueueItem> {
        self.index.and_then(|i| self.queue.get(i))
    }

    /// Physical indices in play order.
    #[must_use]
    pub fn play_order(&self) -> Vec<usize> {
        if self.is_shuffled() {
            self.shuffle.clone()
        } else {
            (0..self.len()).collect()
        }
    }

    /// Checks the index and permutation invariants.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.index.is_none_or(|i| i < self.len()) && self.shuffle_matches_queue()
    }

    /// Makes a state read halfway through another writer's field-by-field
    /// update usable: a permutation that no longer covers the queue is
    /// dropped and an index past the end is clamped to the last item.
    /// Returns whether anything was repaired.
    pub fn repair(&mut self) -> bool {
        let mut repaired = false;
        if !self.shuffle_matches_queue() {
            self.shuffle.clear();
            repaired = true;
        }
        if let Some(index) = self.index
            && index >= self.len()
        {
            self.index = self.len().checked_sub(1);
            repaired = true;
        }
        repaired
    }

    fn shuffle_matches_queue(&self) -> bool {
        if self.shuffle.is_empty() {
            return true;
        }
        let mut sorted = self.shuffle.clone();
        sorted.sort_unstable();
        sorted.len() == self.len() && sorted.iter().enumerate().all(|(i, &p)| i == p)
    }
}
