//! Snapshot history with a cursor.
//!
//! Every committed edit appends an immutable snapshot of the whole layer set.
//! Undo/redo only move the cursor; pushing after an undo drops the redo tail.
//! In-progress gestures (pin drags, slider scrubs) are never pushed; the
//! snapshot is taken once the gesture ends.

use std::collections::VecDeque;

/// Default number of snapshots kept.
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Clone, Debug)]
pub struct History<T> {
    entries: VecDeque<T>,
    /// Index of the current entry, `None` before the first push.
    cursor: Option<usize>,
    capacity: usize,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T: Clone> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Append a snapshot after the cursor, discarding any redo entries.
    pub fn push(&mut self, snapshot: T) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push_back(snapshot);

        // Oldest entries fall off the front
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
        log::trace!("history push: {}/{}", self.entries.len(), self.capacity);
    }

    /// Step back one snapshot. The first snapshot is the floor.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        let cursor = self.cursor? - 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor).cloned()
    }

    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        let cursor = self.cursor.map_or(0, |c| c + 1);
        self.cursor = Some(cursor);
        self.entries.get(cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        next < self.entries.len()
    }

    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}
