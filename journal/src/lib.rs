//! Rewind Journal
//!
//! Durable change log for committed transactions.
//!
//! Responsibilities:
//! - Issue monotonically increasing transaction ids
//! - Append committed change-sets, dropping abandoned redo history
//! - Persist cursor moves and truncations
//! - Replay the log on open to rebuild retained transactions

mod entry;
mod error;
mod journal;
mod sequencer;

pub use entry::{LogEntry, TxnRecord};
pub use error::{JournalError, JournalResult};
pub use journal::{ChangeLog, FileJournal, MemoryJournal};
pub use sequencer::TxnSequencer;
