//! Rewind Session
//!
//! The host database session.
//!
//! Responsibilities:
//! - Open a store over an in-memory or file journal
//! - Element and schema edits, recorded as unsaved changes
//! - Save and abandon changes
//! - Lend out the transaction facade for undo/redo

mod config;
mod db;
mod error;

pub use config::DbConfig;
pub use db::{Db, DbStore};
pub use error::{SessionError, SessionResult};
