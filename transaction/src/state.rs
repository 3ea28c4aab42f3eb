//! Navigation and session state types.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use rewind_core::TxnId;

/// The undo/redo navigation in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TxnAction {
    /// No navigation is in progress.
    #[default]
    None,
    /// A transaction is being reversed.
    Reverse,
    /// A transaction is being reinstated.
    Reinstate,
}

impl fmt::Display for TxnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxnAction::None => write!(f, "none"),
            TxnAction::Reverse => write!(f, "reverse"),
            TxnAction::Reinstate => write!(f, "reinstate"),
        }
    }
}

/// Shared view of the navigation in progress.
///
/// Clones observe the same value, so a listener can capture one and read
/// the action while it runs.
#[derive(Debug, Clone, Default)]
pub struct ActionWatch(Rc<Cell<TxnAction>>);

impl ActionWatch {
    /// The navigation in progress. `None` outside of undo/redo.
    pub fn get(&self) -> TxnAction {
        self.0.get()
    }

    pub(crate) fn set(&self, action: TxnAction) {
        self.0.set(action);
    }
}

/// Outcome of an undo or redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnStatus {
    /// The transaction was reversed.
    Reversed(TxnId),
    /// The transaction was reinstated.
    Reinstated(TxnId),
    /// There was no transaction to reverse. Nothing changed.
    NothingToUndo,
    /// There was no transaction to reinstate. Nothing changed.
    NothingToRedo,
}

impl TxnStatus {
    /// Returns true if a transaction was reversed or reinstated.
    pub fn is_success(&self) -> bool {
        matches!(self, TxnStatus::Reversed(_) | TxnStatus::Reinstated(_))
    }
}

/// Snapshot of the session's transaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    /// There are edits not yet saved as a transaction.
    pub has_unsaved_changes: bool,
    /// At least one transaction is retained.
    pub has_pending_txns: bool,
    /// Unsaved edits or retained transactions exist.
    pub has_local_changes: bool,
    /// Number of transactions that can be reversed.
    pub undo_depth: usize,
    /// Number of transactions that can be reinstated.
    pub redo_depth: usize,
    /// Last applied transaction, or `BEFORE_FIRST`.
    pub cursor: TxnId,
}
