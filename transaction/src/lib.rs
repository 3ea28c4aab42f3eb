//! Rewind Transaction
//!
//! Undo/redo transaction management over a change store.
//!
//! Responsibilities:
//! - Track unsaved edits (change buffer)
//! - Commit edits as durable, reversible transactions
//! - Reverse, reinstate and cancel committed transactions
//! - Abandon unsaved edits
//! - Notify listeners before and after undo/redo

mod buffer;
mod error;
mod listener;
mod manager;
mod state;
mod store;
mod txns;

pub use buffer::ChangeBuffer;
pub use error::{ListenerError, ListenerResult, StoreError, StoreResult, TxnError, TxnResult};
pub use listener::{ListenerBus, Subscription, TxnEvent};
pub use manager::TxnManager;
pub use state::{ActionWatch, SessionState, TxnAction, TxnStatus};
pub use store::{ChangeStore, LoggedStore};
pub use txns::Txns;
