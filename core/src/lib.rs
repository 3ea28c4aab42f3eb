//! Rewind Core Types
//!
//! This crate provides the foundational types used throughout Rewind:
//! - Identity types (ElementId, TxnId)
//! - Value types (the Value enum and property maps)
//! - The Element structure stored in the object graph
//! - Common error types for graph operations

mod element;
mod error;
mod id;
mod value;

pub use element::*;
pub use error::*;
pub use id::*;
pub use value::*;
