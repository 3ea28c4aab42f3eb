//! Change store: the backing store transactions are written to and
//! rewound from.

use rewind_core::TxnId;
use rewind_graph::{ChangeSet, Graph};
use rewind_journal::ChangeLog;
use tracing::{debug, error};

use crate::error::{StoreError, StoreResult};

/// A store that persists change-sets keyed by sequential transaction ids
/// and can apply or reverse them by id.
pub trait ChangeStore {
    /// Persist a transaction whose changes are already applied. Retained
    /// transactions after the current one are discarded by the same append.
    fn append_txn(
        &mut self,
        description: &str,
        forward: ChangeSet,
        inverse: ChangeSet,
    ) -> StoreResult<TxnId>;

    /// Reverse the current transaction `id`. The current transaction becomes
    /// the one before it.
    fn apply_inverse(&mut self, id: TxnId) -> StoreResult<()>;

    /// Reinstate `id`, the transaction right after the current one.
    fn apply_forward(&mut self, id: TxnId) -> StoreResult<()>;

    /// Discard every transaction after `id`. Returns how many were discarded.
    fn truncate_after(&mut self, id: TxnId) -> StoreResult<usize>;

    /// Retained transaction ids in commit order.
    fn query_ids(&self) -> &[TxnId];

    /// Description of a retained transaction.
    fn txn_description(&self, id: TxnId) -> Option<&str>;

    /// Apply changes that are not part of any transaction.
    fn apply_changes(&mut self, changes: &ChangeSet) -> StoreResult<()>;

    /// Last applied transaction, or `BEFORE_FIRST`.
    fn current_txn_id(&self) -> TxnId;

    /// Earliest retained transaction, or `BEFORE_FIRST`.
    fn first_txn_id(&self) -> TxnId {
        self.query_ids().first().copied().unwrap_or(TxnId::BEFORE_FIRST)
    }

    /// Greatest retained id before `id`, or `BEFORE_FIRST`.
    fn previous_txn_id(&self, id: TxnId) -> TxnId {
        self.query_ids()
            .iter()
            .rev()
            .find(|retained| **retained < id)
            .copied()
            .unwrap_or(TxnId::BEFORE_FIRST)
    }

    /// Smallest retained id after `id`.
    fn next_txn_id(&self, id: TxnId) -> Option<TxnId> {
        self.query_ids().iter().find(|retained| **retained > id).copied()
    }
}

/// [`ChangeStore`] that applies change data to a [`Graph`] and records
/// transactions in a [`ChangeLog`].
#[derive(Debug)]
pub struct LoggedStore<L: ChangeLog> {
    graph: Graph,
    log: L,
}

impl<L: ChangeLog> LoggedStore<L> {
    /// Open a store over `log`, rebuilding the graph from its retained
    /// transactions up to the persisted cursor.
    pub fn open(log: L) -> StoreResult<Self> {
        let mut graph = Graph::new();
        let current = log.sequencer().current();

        for record in log.records() {
            if record.id <= current {
                graph.apply_all(&record.forward)?;
            } else {
                graph.reserve_ids(&record.forward);
            }
        }

        debug!(
            cursor = %current,
            retained = log.records().len(),
            elements = graph.element_count(),
            "store opened"
        );

        Ok(Self { graph, log })
    }

    /// Get the graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Get the graph mutably. Edits made here must be recorded by the
    /// transaction manager to become part of a transaction.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Get the change log.
    pub fn log(&self) -> &L {
        &self.log
    }

    /// Get the change log mutably.
    pub fn log_mut(&mut self) -> &mut L {
        &mut self.log
    }

    /// Move the cursor in the log; undo `applied` on the graph if that fails.
    fn move_cursor(&mut self, to: TxnId, applied: &ChangeSet) -> StoreResult<()> {
        if let Err(err) = self.log.move_cursor(to) {
            if let Err(undo_err) = self.graph.apply_all(&applied.inverse()) {
                error!(error = %undo_err, "failed to undo graph change after journal error");
            }
            return Err(err.into());
        }
        Ok(())
    }
}

impl<L: ChangeLog> ChangeStore for LoggedStore<L> {
    fn append_txn(
        &mut self,
        description: &str,
        forward: ChangeSet,
        inverse: ChangeSet,
    ) -> StoreResult<TxnId> {
        Ok(self.log.append(description, forward, inverse)?)
    }

    fn apply_inverse(&mut self, id: TxnId) -> StoreResult<()> {
        let current = self.log.sequencer().current();
        if id != current || !id.is_valid() {
            return Err(StoreError::cursor_mismatch(id, current));
        }

        let record = self.log.get(id).ok_or(StoreError::unknown_txn(id))?;
        let inverse = record.inverse.clone();
        self.graph.apply_all(&inverse)?;

        let previous = self.log.sequencer().previous(id);
        self.move_cursor(previous, &inverse)
    }

    fn apply_forward(&mut self, id: TxnId) -> StoreResult<()> {
        let current = self.log.sequencer().current();
        if self.log.sequencer().next(current) != Some(id) {
            return Err(StoreError::cursor_mismatch(id, current));
        }

        let record = self.log.get(id).ok_or(StoreError::unknown_txn(id))?;
        let forward = record.forward.clone();
        self.graph.apply_all(&forward)?;

        self.move_cursor(id, &forward)
    }

    fn truncate_after(&mut self, id: TxnId) -> StoreResult<usize> {
        let current = self.log.sequencer().current();
        if current > id {
            return Err(StoreError::cursor_mismatch(id, current));
        }
        Ok(self.log.truncate_after(id)?)
    }

    fn query_ids(&self) -> &[TxnId] {
        self.log.sequencer().ids()
    }

    fn txn_description(&self, id: TxnId) -> Option<&str> {
        self.log.get(id).map(|record| record.description.as_str())
    }

    fn apply_changes(&mut self, changes: &ChangeSet) -> StoreResult<()> {
        Ok(self.graph.apply_all(changes)?)
    }

    fn current_txn_id(&self) -> TxnId {
        self.log.sequencer().current()
    }

    fn first_txn_id(&self) -> TxnId {
        self.log.sequencer().first()
    }

    fn previous_txn_id(&self, id: TxnId) -> TxnId {
        self.log.sequencer().previous(id)
    }

    fn next_txn_id(&self, id: TxnId) -> Option<TxnId> {
        self.log.sequencer().next(id)
    }
}
