//! Journal entry types.

use rewind_core::TxnId;
use rewind_graph::ChangeSet;
use serde::{Deserialize, Serialize};

/// A committed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxnRecord {
    /// Transaction id.
    pub id: TxnId,
    /// Cursor position the transaction was committed on top of.
    pub parent: TxnId,
    /// Caller-supplied description (shown as the undo/redo string).
    pub description: String,
    /// Changes that re-apply the transaction.
    pub forward: ChangeSet,
    /// Changes that reverse the transaction.
    pub inverse: ChangeSet,
}

impl TxnRecord {
    /// Create a new record.
    pub fn new(
        id: TxnId,
        parent: TxnId,
        description: impl Into<String>,
        forward: ChangeSet,
        inverse: ChangeSet,
    ) -> Self {
        Self {
            id,
            parent,
            description: description.into(),
            forward,
            inverse,
        }
    }
}

/// One line of the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    /// A commit. Implies the cursor moves to the record's id and everything
    /// after its parent is dropped.
    Txn(TxnRecord),

    /// The cursor moved (reverse or reinstate).
    Cursor { at: TxnId },

    /// Everything after `after` was dropped.
    Truncate { after: TxnId },

    /// Written at the end of a compacted journal so ids issued before
    /// compaction are not issued again.
    Checkpoint { next_txn_id: TxnId },
}

impl LogEntry {
    /// The transaction id this entry refers to.
    pub fn txn_id(&self) -> TxnId {
        match self {
            LogEntry::Txn(record) => record.id,
            LogEntry::Cursor { at } => *at,
            LogEntry::Truncate { after } => *after,
            LogEntry::Checkpoint { next_txn_id } => *next_txn_id,
        }
    }

    /// Check if this is a commit entry.
    pub fn is_commit(&self) -> bool {
        matches!(self, LogEntry::Txn(_))
    }
}
