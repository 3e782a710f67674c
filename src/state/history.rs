/// Linear undo/redo history
///
/// A bounded sequence of snapshots with a single cursor. Pushing after an
/// undo discards everything past the cursor (no redo branches). When full,
/// the oldest entry is evicted and the cursor shifts with it, so the
/// current entry always stays valid.

use std::collections::VecDeque;
use std::sync::Arc;

use image::RgbaImage;

use super::data::EditState;

/// Default number of snapshots kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// One immutable snapshot of the editing session
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Composite rendered when the entry was captured
    pub snapshot: Arc<RgbaImage>,
    pub state: EditState,
}

/// Bounded history with a cursor
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    /// Index of the current entry; meaningless while `entries` is empty
    cursor: usize,
    capacity: usize,
}

impl<T> History<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Record a new current entry, dropping any redo-able entries
    pub fn push(&mut self, entry: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(entry);

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry. None at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        if self.entries.is_empty() || self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry. None at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Position of the current entry, if any
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
