//! Transaction facade binding a manager to its store.

use rewind_core::TxnId;

use crate::error::{ListenerResult, TxnResult};
use crate::listener::Subscription;
use crate::manager::TxnManager;
use crate::state::{ActionWatch, SessionState, TxnAction, TxnStatus};
use crate::store::ChangeStore;

/// A [`TxnManager`] borrowed together with the store it manages.
///
/// Exposes every manager operation without passing the store around.
pub struct Txns<'a, S: ChangeStore> {
    manager: &'a mut TxnManager,
    store: &'a mut S,
}

impl<'a, S: ChangeStore> Txns<'a, S> {
    /// Bind `manager` to `store`.
    pub fn new(manager: &'a mut TxnManager, store: &'a mut S) -> Self {
        Self { manager, store }
    }

    /// Save unsaved edits as a new transaction.
    pub fn save_changes(&mut self, description: &str) -> TxnResult<Option<TxnId>> {
        self.manager.save_changes(&mut *self.store, description)
    }

    /// Discard unsaved edits.
    pub fn abandon_changes(&mut self) -> TxnResult<()> {
        self.manager.abandon_changes(&mut *self.store)
    }

    /// Reverse the last applied transaction.
    pub fn reverse_single_txn(&mut self) -> TxnResult<TxnStatus> {
        self.manager.reverse_single_txn(&mut *self.store)
    }

    /// Reinstate the next reversed transaction.
    pub fn reinstate_txn(&mut self) -> TxnResult<TxnStatus> {
        self.manager.reinstate_txn(&mut *self.store)
    }

    /// Reverse and discard every transaction from `id` onward.
    pub fn cancel_to(&mut self, id: TxnId) -> TxnResult<()> {
        self.manager.cancel_to(&mut *self.store, id)
    }

    /// Check if there is a transaction to reverse.
    pub fn is_undo_possible(&self) -> bool {
        self.manager.is_undo_possible(&*self.store)
    }

    /// Check if there is a transaction to reinstate.
    pub fn is_redo_possible(&self) -> bool {
        self.manager.is_redo_possible(&*self.store)
    }

    /// Description of the transaction undo would reverse, or "".
    pub fn get_undo_string(&self) -> String {
        self.manager.get_undo_string(&*self.store)
    }

    /// Description of the transaction redo would reinstate, or "".
    pub fn get_redo_string(&self) -> String {
        self.manager.get_redo_string(&*self.store)
    }

    /// Description of a retained transaction.
    pub fn get_txn_description(&self, id: TxnId) -> Option<String> {
        self.manager.get_txn_description(&*self.store, id)
    }

    /// Greatest retained id before `id`, or `BEFORE_FIRST`.
    pub fn query_previous_txn_id(&self, id: TxnId) -> TxnId {
        self.manager.query_previous_txn_id(&*self.store, id)
    }

    /// Earliest retained transaction, or `BEFORE_FIRST`.
    pub fn query_first_txn_id(&self) -> TxnId {
        self.manager.query_first_txn_id(&*self.store)
    }

    /// Last applied transaction, or `BEFORE_FIRST`.
    pub fn get_current_txn_id(&self) -> TxnId {
        self.manager.get_current_txn_id(&*self.store)
    }

    /// Smallest retained id after `id`, if any.
    pub fn query_next_txn_id(&self, id: TxnId) -> Option<TxnId> {
        self.manager.query_next_txn_id(&*self.store, id)
    }

    /// Check if there are edits not yet saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.manager.has_unsaved_changes()
    }

    /// The navigation in progress.
    pub fn action(&self) -> TxnAction {
        self.manager.action()
    }

    /// A handle reporting the navigation in progress, for listeners.
    pub fn action_watch(&self) -> ActionWatch {
        self.manager.action_watch()
    }

    /// Snapshot of unsaved, pending and local state.
    pub fn state(&self) -> SessionState {
        self.manager.state(&*self.store)
    }

    /// Add a listener fired before every reversal or reinstatement.
    pub fn add_before_listener<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut() -> ListenerResult + 'static,
    {
        self.manager.add_before_listener(listener)
    }

    /// Add a listener fired after every reversal or reinstatement.
    pub fn add_after_listener<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(TxnAction) -> ListenerResult + 'static,
    {
        self.manager.add_after_listener(listener)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, subscription: Subscription) -> bool {
        self.manager.remove_listener(subscription)
    }
}
