//! Rewind Object Graph
//!
//! This crate provides the structured data store that transactions mutate:
//! - Element storage keyed by ElementId
//! - Imported schemas that define the element classes
//! - Invertible changes and change-sets, applied all-or-nothing

mod change;
mod graph;
mod schema;

pub use change::*;
pub use graph::*;
pub use schema::*;
