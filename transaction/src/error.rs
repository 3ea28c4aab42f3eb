//! Transaction error types.

use rewind_core::{GraphError, TxnId};
use rewind_journal::JournalError;
use thiserror::Error;

use crate::listener::TxnEvent;

/// Change store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The change log failed.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    /// Change data could not be applied to the graph.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// Transaction is not retained by the store.
    #[error("transaction not found: {id}")]
    UnknownTxn { id: TxnId },

    /// Transaction cannot be applied or truncated from the current cursor.
    #[error("transaction {id} is not reachable from cursor {current}")]
    CursorMismatch { id: TxnId, current: TxnId },
}

impl StoreError {
    pub fn unknown_txn(id: TxnId) -> Self {
        Self::UnknownTxn { id }
    }

    pub fn cursor_mismatch(id: TxnId, current: TxnId) -> Self {
        Self::CursorMismatch { id, current }
    }
}

/// Result type for change store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by a listener.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by listeners.
pub type ListenerResult = Result<(), ListenerError>;

/// Transaction manager errors.
#[derive(Debug, Error)]
pub enum TxnError {
    /// The backing store failed. State is unchanged.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// `cancel_to` target cannot be reached by reversing from the cursor.
    #[error("transaction {id} is not reachable by reversal")]
    UnreachableTxn { id: TxnId },

    /// A listener failed. Delivery to later listeners was skipped.
    #[error("{event} listener failed: {source}")]
    Listener {
        event: TxnEvent,
        #[source]
        source: ListenerError,
    },
}

impl TxnError {
    pub fn unreachable_txn(id: TxnId) -> Self {
        Self::UnreachableTxn { id }
    }

    pub fn listener(event: TxnEvent, source: ListenerError) -> Self {
        Self::Listener { event, source }
    }

    /// Returns true if the error came from a listener.
    pub fn is_listener(&self) -> bool {
        matches!(self, Self::Listener { .. })
    }
}

/// Result type for transaction operations.
pub type TxnResult<T> = Result<T, TxnError>;
