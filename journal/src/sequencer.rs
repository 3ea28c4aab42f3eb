//! Transaction id sequencing.

use rewind_core::TxnId;

use crate::error::{JournalError, JournalResult};

/// Issues transaction ids and answers ordering queries over the retained ones.
///
/// Retained ids are kept in commit order, which is also ascending id order.
/// `current` is the id of the last applied transaction; everything after it
/// in `retained` has been reversed and can be reinstated.
#[derive(Debug, Clone)]
pub struct TxnSequencer {
    /// Raw value of the next id to issue. Never decreases.
    next: u64,
    /// Retained ids, ascending.
    retained: Vec<TxnId>,
    /// Last applied id, or `BEFORE_FIRST`.
    current: TxnId,
}

impl Default for TxnSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl TxnSequencer {
    /// Create a sequencer with nothing retained.
    pub fn new() -> Self {
        Self {
            next: 1,
            retained: Vec::new(),
            current: TxnId::BEFORE_FIRST,
        }
    }

    /// The id the next commit will receive.
    pub fn peek_next(&self) -> TxnId {
        TxnId::new(self.next)
    }

    /// Record a commit of `id` on top of `parent`.
    ///
    /// Ids after `parent` are dropped first, so the retained ids always form
    /// a single chain. The cursor moves to `id`.
    pub fn commit(&mut self, id: TxnId, parent: TxnId) -> JournalResult<()> {
        if id.raw() < self.next {
            return Err(JournalError::out_of_order(id, self.peek_next()));
        }
        if parent.is_valid() && !self.contains(parent) {
            return Err(JournalError::unknown_txn(parent));
        }

        self.truncate_after(parent);
        self.retained.push(id);
        self.current = id;
        self.next = id.raw() + 1;
        Ok(())
    }

    /// Make sure no id below `next` is issued.
    pub fn reserve(&mut self, next: TxnId) {
        self.next = self.next.max(next.raw());
    }

    /// Move the cursor. `id` must be retained or `BEFORE_FIRST`.
    pub fn set_current(&mut self, id: TxnId) -> JournalResult<()> {
        if id.is_valid() && !self.contains(id) {
            return Err(JournalError::unknown_txn(id));
        }
        self.current = id;
        Ok(())
    }

    /// Drop every id after `id`. Returns how many were dropped.
    ///
    /// The cursor is pulled back to `id` if it was past it.
    pub fn truncate_after(&mut self, id: TxnId) -> usize {
        let keep = self.retained.partition_point(|retained| *retained <= id);
        let dropped = self.retained.len() - keep;
        self.retained.truncate(keep);
        if self.current > id {
            self.current = self.last();
        }
        dropped
    }

    /// Earliest retained id, or `BEFORE_FIRST`.
    pub fn first(&self) -> TxnId {
        self.retained.first().copied().unwrap_or(TxnId::BEFORE_FIRST)
    }

    /// Latest retained id, or `BEFORE_FIRST`.
    pub fn last(&self) -> TxnId {
        self.retained.last().copied().unwrap_or(TxnId::BEFORE_FIRST)
    }

    /// Last applied id, or `BEFORE_FIRST`.
    pub fn current(&self) -> TxnId {
        self.current
    }

    /// Greatest retained id strictly before `id`, or `BEFORE_FIRST`.
    pub fn previous(&self, id: TxnId) -> TxnId {
        let idx = self.retained.partition_point(|retained| *retained < id);
        match idx {
            0 => TxnId::BEFORE_FIRST,
            n => self.retained[n - 1],
        }
    }

    /// Smallest retained id strictly after `id`.
    pub fn next(&self, id: TxnId) -> Option<TxnId> {
        let idx = self.retained.partition_point(|retained| *retained <= id);
        self.retained.get(idx).copied()
    }

    /// Returns true if `id` is retained.
    pub fn contains(&self, id: TxnId) -> bool {
        self.retained.binary_search(&id).is_ok()
    }

    /// Retained ids in commit order.
    pub fn ids(&self) -> &[TxnId] {
        &self.retained
    }

    /// Number of retained ids.
    pub fn len(&self) -> usize {
        self.retained.len()
    }

    /// Returns true if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Number of applied (undoable) transactions.
    pub fn undo_depth(&self) -> usize {
        self.retained.partition_point(|retained| *retained <= self.current)
    }

    /// Number of reversed (redoable) transactions.
    pub fn redo_depth(&self) -> usize {
        self.retained.len() - self.undo_depth()
    }
}
