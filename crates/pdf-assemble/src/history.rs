//! Linear undo/redo log of ledger snapshots

use crate::ledger::Snapshot;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct History {
    /// Oldest first
    past: Vec<Snapshot>,
    /// Next redo at the front
    future: VecDeque<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the pre-mutation state of a committed command
    pub fn record(&mut self, snapshot: Snapshot) {
        self.past.push(snapshot);
        self.future.clear();
    }

    /// Returns the state to restore, or `None` when there is nothing to undo
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop()?;
        self.future.push_front(current);
        Some(previous)
    }

    /// Returns the state to restore, or `None` when there is nothing to redo
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.future.pop_front()?;
        self.past.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }
}
