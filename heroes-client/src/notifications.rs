//! Append-only log of human-readable operation outcomes.
//!
//! The client writes one entry per completed operation. Callers get a
//! read-only snapshot and may reset the whole log, but never edit or remove
//! individual entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Destination for operation outcome messages.
pub trait NotificationSink: Send + Sync {
    /// Appends one entry.
    fn append(&self, text: String);

    /// Returns the current entries, oldest first.
    fn current_entries(&self) -> Vec<String>;

    /// Removes every entry.
    fn clear(&self);
}

/// A single recorded outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Bounded in-memory [`NotificationSink`].
///
/// When full, the oldest entry is evicted. Entries are kept in the order
/// their appends completed; the timestamp is wall-clock time for display.
#[derive(Debug)]
pub struct MessageLog {
    capacity: usize,
    entries: Mutex<VecDeque<Notification>>,
}

impl MessageLog {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a log holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Timestamped snapshot of the log, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    /// Text snapshot of the log, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.lock().iter().map(|n| n.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the deque half-updated.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for MessageLog {
    fn append(&self, text: String) {
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(Notification {
            at: Utc::now(),
            text,
        });
    }

    fn current_entries(&self) -> Vec<String> {
        self.entries()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
