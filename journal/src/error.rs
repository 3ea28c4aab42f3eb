//! Journal error types.

use rewind_core::TxnId;
use thiserror::Error;

/// Journal errors.
#[derive(Debug, Error)]
pub enum JournalError {
    /// IO error during journal operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid entry format.
    #[error("invalid entry format at line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    /// Transaction not retained by the journal.
    #[error("transaction not found: {id}")]
    UnknownTxn { id: TxnId },

    /// Transaction id does not follow the last issued one.
    #[error("transaction id {id} is out of order, expected at least {expected}")]
    OutOfOrder { id: TxnId, expected: TxnId },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Journal file does not exist and creation was not requested.
    #[error("journal not found: {path}")]
    NotFound { path: String },
}

impl JournalError {
    pub fn invalid_format(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            line,
            message: message.into(),
        }
    }

    pub fn unknown_txn(id: TxnId) -> Self {
        Self::UnknownTxn { id }
    }

    pub fn out_of_order(id: TxnId, expected: TxnId) -> Self {
        Self::OutOfOrder { id, expected }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;
