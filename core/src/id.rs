//! Identity types for Rewind.
//!
//! All identifiers are 64-bit values that are:
//! - Unique within their namespace
//! - Immutable once assigned
//! - Never reissued, even after the entity they named is gone

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an element in the object graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Create a new ElementId from a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Identifier of a committed transaction.
///
/// Ids are issued in strictly increasing order, so comparing two ids
/// compares their commit order. The raw value `0` is reserved for the
/// [`TxnId::BEFORE_FIRST`] sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxnId(pub u64);

impl TxnId {
    /// Position before the first transaction.
    pub const BEFORE_FIRST: TxnId = TxnId(0);

    /// Create a new TxnId from a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Returns true unless this is the before-first sentinel.
    pub fn is_valid(&self) -> bool {
        *self != Self::BEFORE_FIRST
    }
}

impl Default for TxnId {
    fn default() -> Self {
        Self::BEFORE_FIRST
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "txn{}", self.0)
        } else {
            write!(f, "txn<before-first>")
        }
    }
}
