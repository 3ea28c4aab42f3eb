//! Common error types for Rewind.

use crate::ElementId;
use thiserror::Error;

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Element not found.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// An element with this id already exists.
    #[error("Element already exists: {0}")]
    ElementExists(ElementId),

    /// Class is not defined by any imported schema.
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// Schema with this name is already imported.
    #[error("Schema already imported: {0}")]
    SchemaAlreadyImported(String),

    /// Schema not found.
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl GraphError {
    pub fn unknown_class(class: impl Into<String>) -> Self {
        Self::UnknownClass(class.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Returns true for lookup misses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::ElementNotFound(_) | GraphError::SchemaNotFound(_))
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
