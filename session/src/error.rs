//! Session error types.

use rewind_core::GraphError;
use rewind_graph::SchemaError;
use rewind_journal::JournalError;
use rewind_transaction::{StoreError, TxnError};
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Element or schema edit rejected by the graph.
    #[error("element error: {0}")]
    Element(#[from] GraphError),

    /// Transaction error.
    #[error("transaction error: {0}")]
    Txn(#[from] TxnError),

    /// Store error while opening.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Journal error.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    /// Schema could not be loaded.
    #[error("schema import failed: {0}")]
    SchemaImport(#[from] SchemaError),
}

impl SessionError {
    /// Returns true if an element lookup failed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Element(err) if err.is_not_found())
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
