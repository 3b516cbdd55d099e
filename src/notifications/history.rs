// ABOUTME: Bounded, de-duplicated in-memory notification history
// ABOUTME: Fixed-capacity deque with FIFO eviction keyed on title and message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::constants::MAX_NOTIFICATIONS;
use crate::models::{DedupKey, Notification, NotificationId};

/// Result of merging one batch into the history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Notifications appended
    pub added: usize,
    /// Notifications dropped because their `(title, message)` was already present
    pub duplicates: usize,
    /// Oldest entries evicted to respect the capacity
    pub evicted: usize,
}

/// Arrival-ordered notification list (oldest first)
///
/// No two entries share a `(title, message)` pair and the list never holds
/// more than `capacity` entries.
#[derive(Debug, Clone)]
pub struct NotificationHistory {
    entries: VecDeque<Notification>,
    keys: HashSet<DedupKey>,
    capacity: usize,
}

impl Default for NotificationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHistory {
    /// History bounded at [`MAX_NOTIFICATIONS`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_NOTIFICATIONS)
    }

    /// History bounded at `capacity` entries
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            keys: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Merge a batch of newly received notifications
    ///
    /// Every arrival is marked unread. Arrivals whose key is already present,
    /// either in the history or earlier in the same batch, are dropped. The
    /// oldest entries are then evicted until the capacity holds again.
    pub fn merge_batch(&mut self, batch: impl IntoIterator<Item = Notification>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        // Duplicates are resolved against the whole combined list before any eviction
        for mut notification in batch {
            let key = notification.dedup_key();
            if self.keys.contains(&key) {
                outcome.duplicates += 1;
                continue;
            }
            notification.unread = true;
            self.keys.insert(key);
            self.entries.push_back(notification);
            outcome.added += 1;
        }

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.entries.pop_front() {
                self.keys.remove(&oldest.dedup_key());
                outcome.evicted += 1;
            }
        }

        outcome
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }

    /// Mark every entry carrying `id` as read, returning whether anything changed
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        let mut changed = false;
        for entry in self.entries.iter_mut().filter(|entry| &entry.id == id) {
            changed |= entry.unread;
            entry.unread = false;
        }
        changed
    }

    /// Mark all entries as read, returning how many were unread
    pub fn mark_all_read(&mut self) -> usize {
        let mut count = 0;
        for entry in self.entries.iter_mut().filter(|entry| entry.unread) {
            entry.unread = false;
            count += 1;
        }
        count
    }

    /// Number of unread entries
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.unread).count()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries retained
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Entries newest first, the usual render order
    pub fn newest_first(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().rev()
    }

    /// Immutable copy of the current entries, oldest first
    #[must_use]
    pub fn snapshot(&self) -> Arc<[Notification]> {
        self.entries.iter().cloned().collect()
    }
}
