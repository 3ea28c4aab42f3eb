//! Change buffer for tracking unsaved edits.

use rewind_core::ElementId;
use rewind_graph::{Change, ChangeSet};
use tracing::trace;

/// Edits applied to the graph since the last commit.
///
/// Changes to the same element are coalesced, so the buffer holds at most
/// one change per element and committing it stores the net effect.
#[derive(Debug, Clone, Default)]
pub struct ChangeBuffer {
    changes: Vec<Change>,
}

impl ChangeBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change that has already been applied to the graph.
    pub fn record(&mut self, change: Change) {
        trace!(change = change.kind(), element = ?change.element_id(), "recording change");

        let Some(id) = change.element_id() else {
            self.changes.push(change);
            return;
        };
        let Some(idx) = self.last_change_for(id) else {
            self.changes.push(change);
            return;
        };

        let merged = match (self.changes[idx].clone(), change) {
            (Change::Insert(_), Change::Update { after, .. }) => Some(Change::Insert(after)),
            (Change::Insert(_), Change::Delete(_)) => None,
            (Change::Update { before, .. }, Change::Update { after, .. }) => {
                (before != after).then_some(Change::Update { before, after })
            }
            (Change::Update { before, .. }, Change::Delete(_)) => Some(Change::Delete(before)),
            (_, change) => {
                self.changes.push(change);
                return;
            }
        };

        match merged {
            Some(change) => self.changes[idx] = change,
            None => {
                self.changes.remove(idx);
            }
        }
    }

    fn last_change_for(&self, id: ElementId) -> Option<usize> {
        self.changes
            .iter()
            .rposition(|change| change.element_id() == Some(id))
    }

    /// Returns true if there are no unsaved edits.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of buffered changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Buffered changes in application order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// The change-set that undoes every buffered edit.
    pub fn inverse(&self) -> ChangeSet {
        self.changes.iter().rev().map(Change::inverse).collect()
    }

    /// Take the buffered changes, leaving the buffer empty.
    pub fn take(&mut self) -> ChangeSet {
        std::mem::take(&mut self.changes).into()
    }

    /// Put back changes taken with [`take`](Self::take) whose commit failed.
    pub fn restore(&mut self, changes: ChangeSet) {
        let mut restored: Vec<Change> = changes.iter().cloned().collect();
        restored.append(&mut self.changes);
        self.changes = restored;
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.changes.clear();
    }
}
