//! Transaction manager for committing, reversing and reinstating
//! transactions.

use rewind_core::TxnId;
use rewind_graph::Change;
use tracing::{debug, warn};

use crate::buffer::ChangeBuffer;
use crate::error::{ListenerResult, TxnError, TxnResult};
use crate::listener::{ListenerBus, Subscription};
use crate::state::{ActionWatch, SessionState, TxnAction, TxnStatus};
use crate::store::ChangeStore;

/// Transaction manager.
///
/// Edits are applied to the store's graph as they are made and recorded
/// here as unsaved changes. [`save_changes`](Self::save_changes) turns them
/// into a transaction. Committed transactions are navigated with
/// [`reverse_single_txn`](Self::reverse_single_txn),
/// [`reinstate_txn`](Self::reinstate_txn) and [`cancel_to`](Self::cancel_to).
///
/// The manager does not own the store; every operation that touches it
/// takes it as an argument.
#[derive(Debug, Default)]
pub struct TxnManager {
    buffer: ChangeBuffer,
    action: ActionWatch,
    listeners: ListenerBus,
}

impl TxnManager {
    /// Create a new transaction manager.
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Unsaved Changes ==========

    /// Record an edit already applied to the store.
    pub fn record(&mut self, change: Change) {
        self.buffer.record(change);
    }

    /// Check if there are edits not yet saved as a transaction.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Edits not yet saved, in application order.
    pub fn unsaved_changes(&self) -> &[Change] {
        self.buffer.changes()
    }

    /// Save unsaved edits as a new transaction.
    ///
    /// Returns `None` without touching the store if there is nothing to
    /// save. Reversed transactions past the cursor are discarded. On failure
    /// the edits stay unsaved.
    pub fn save_changes(
        &mut self,
        store: &mut impl ChangeStore,
        description: &str,
    ) -> TxnResult<Option<TxnId>> {
        if self.buffer.is_empty() {
            if description.is_empty() {
                warn!("save_changes called with no changes and no description");
            }
            return Ok(None);
        }

        let forward = self.buffer.take();
        let inverse = forward.inverse();
        let changes = forward.len();
        match store.append_txn(description, forward.clone(), inverse) {
            Ok(id) => {
                debug!(txn = %id, description, changes, "saved changes");
                Ok(Some(id))
            }
            Err(err) => {
                self.buffer.restore(forward);
                Err(err.into())
            }
        }
    }

    /// Discard unsaved edits, restoring the state of the last transaction.
    pub fn abandon_changes(&mut self, store: &mut impl ChangeStore) -> TxnResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        store.apply_changes(&self.buffer.inverse())?;
        debug!(changes = self.buffer.len(), "abandoned unsaved changes");
        self.buffer.clear();
        Ok(())
    }

    // ========== Undo / Redo ==========

    /// Check if there is a transaction to reverse.
    pub fn is_undo_possible(&self, store: &impl ChangeStore) -> bool {
        store.current_txn_id().is_valid()
    }

    /// Check if there is a transaction to reinstate.
    pub fn is_redo_possible(&self, store: &impl ChangeStore) -> bool {
        store.next_txn_id(store.current_txn_id()).is_some()
    }

    /// Reverse the most recent applied transaction.
    ///
    /// Unsaved edits are abandoned first, before any listener runs. A
    /// before-listener that fails leaves the cursor where it was, but the
    /// unsaved edits are already gone.
    pub fn reverse_single_txn(&mut self, store: &mut impl ChangeStore) -> TxnResult<TxnStatus> {
        if !self.is_undo_possible(&*store) {
            return Ok(TxnStatus::NothingToUndo);
        }

        self.abandon_changes(store)?;
        let id = store.current_txn_id();
        if let Some(err) = self.reverse(store, id)? {
            return Err(err);
        }
        Ok(TxnStatus::Reversed(id))
    }

    /// Reinstate the most recently reversed transaction.
    ///
    /// Unsaved edits are abandoned first and are not part of what is
    /// reinstated. As with [`reverse_single_txn`](Self::reverse_single_txn)
    /// they are discarded even if a before-listener then fails.
    pub fn reinstate_txn(&mut self, store: &mut impl ChangeStore) -> TxnResult<TxnStatus> {
        let Some(id) = store.next_txn_id(store.current_txn_id()) else {
            return Ok(TxnStatus::NothingToRedo);
        };

        self.abandon_changes(store)?;

        self.listeners.notify_before()?;
        store.apply_forward(id)?;
        debug!(txn = %id, "reinstated transaction");

        self.action.set(TxnAction::Reinstate);
        let notified = self.listeners.notify_after(TxnAction::Reinstate);
        self.action.set(TxnAction::None);
        notified?;

        Ok(TxnStatus::Reinstated(id))
    }

    /// Reverse every transaction from `id` onward and discard them.
    ///
    /// `id` must be retained and at or before the cursor, or be
    /// `BEFORE_FIRST` to cancel everything. Each reversal fires its own
    /// before/after pair. Afterwards none of the discarded transactions can
    /// be reinstated.
    ///
    /// An after-listener error does not stop the cancel: the remaining
    /// reversals and the truncation still happen and the first such error
    /// is returned at the end. A before-listener or store error stops at
    /// the transaction it happened on, with nothing truncated.
    pub fn cancel_to(&mut self, store: &mut impl ChangeStore, id: TxnId) -> TxnResult<()> {
        let reachable = !id.is_valid()
            || (store.query_ids().contains(&id) && id <= store.current_txn_id());
        if !reachable {
            return Err(TxnError::unreachable_txn(id));
        }

        self.abandon_changes(store)?;

        let mut listener_error = None;
        loop {
            let current = store.current_txn_id();
            if !current.is_valid() || current < id {
                break;
            }
            if let Some(err) = self.reverse(store, current)? {
                listener_error.get_or_insert(err);
            }
        }

        let keep = store.previous_txn_id(id);
        if store.next_txn_id(keep).is_some() {
            let dropped = store.truncate_after(keep)?;
            debug!(txn = %id, dropped, "cancelled transactions");
        }

        match listener_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Reverse `id`, the current transaction, with notifications.
    ///
    /// `Err` means the store is unchanged. `Ok(Some(_))` carries an
    /// after-listener error raised once the reversal was done.
    fn reverse(&mut self, store: &mut impl ChangeStore, id: TxnId) -> TxnResult<Option<TxnError>> {
        self.action.set(TxnAction::Reverse);
        let result = self.reverse_notified(store, id);
        self.action.set(TxnAction::None);
        result
    }

    fn reverse_notified(
        &mut self,
        store: &mut impl ChangeStore,
        id: TxnId,
    ) -> TxnResult<Option<TxnError>> {
        self.listeners.notify_before()?;
        store.apply_inverse(id)?;
        debug!(txn = %id, "reversed transaction");
        Ok(self.listeners.notify_after(TxnAction::Reverse).err())
    }

    /// The navigation in progress. `None` outside of undo/redo.
    pub fn action(&self) -> TxnAction {
        self.action.get()
    }

    /// A handle reporting [`action`](Self::action), for listeners to
    /// capture.
    pub fn action_watch(&self) -> ActionWatch {
        self.action.clone()
    }

    // ========== Queries ==========

    /// Description of the transaction that would be reversed next, or "".
    pub fn get_undo_string(&self, store: &impl ChangeStore) -> String {
        let current = store.current_txn_id();
        if !current.is_valid() {
            return String::new();
        }
        self.get_txn_description(store, current).unwrap_or_default()
    }

    /// Description of the transaction that would be reinstated next, or "".
    pub fn get_redo_string(&self, store: &impl ChangeStore) -> String {
        store
            .next_txn_id(store.current_txn_id())
            .and_then(|id| self.get_txn_description(store, id))
            .unwrap_or_default()
    }

    /// Description of a retained transaction.
    pub fn get_txn_description(&self, store: &impl ChangeStore, id: TxnId) -> Option<String> {
        store.txn_description(id).map(str::to_string)
    }

    /// Greatest retained id before `id`, or `BEFORE_FIRST`.
    pub fn query_previous_txn_id(&self, store: &impl ChangeStore, id: TxnId) -> TxnId {
        store.previous_txn_id(id)
    }

    /// Earliest retained transaction, or `BEFORE_FIRST`.
    pub fn query_first_txn_id(&self, store: &impl ChangeStore) -> TxnId {
        store.first_txn_id()
    }

    /// Last applied transaction, or `BEFORE_FIRST`.
    ///
    /// This is the transaction [`get_undo_string`](Self::get_undo_string)
    /// describes, not the one after it. The transaction before it is
    /// `query_previous_txn_id(get_current_txn_id())`.
    pub fn get_current_txn_id(&self, store: &impl ChangeStore) -> TxnId {
        store.current_txn_id()
    }

    /// Smallest retained id after `id`, if any.
    pub fn query_next_txn_id(&self, store: &impl ChangeStore, id: TxnId) -> Option<TxnId> {
        store.next_txn_id(id)
    }

    /// Snapshot of unsaved, pending and local state.
    pub fn state(&self, store: &impl ChangeStore) -> SessionState {
        let ids = store.query_ids();
        let cursor = store.current_txn_id();
        let undo_depth = ids.iter().filter(|id| **id <= cursor).count();
        let has_unsaved_changes = self.has_unsaved_changes();
        let has_pending_txns = !ids.is_empty();

        SessionState {
            has_unsaved_changes,
            has_pending_txns,
            has_local_changes: has_unsaved_changes || has_pending_txns,
            undo_depth,
            redo_depth: ids.len() - undo_depth,
            cursor,
        }
    }

    // ========== Listeners ==========

    /// Add a listener fired before every reversal or reinstatement.
    pub fn add_before_listener<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut() -> ListenerResult + 'static,
    {
        self.listeners.add_before(listener)
    }

    /// Add a listener fired after every reversal or reinstatement.
    pub fn add_after_listener<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(TxnAction) -> ListenerResult + 'static,
    {
        self.listeners.add_after(listener)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, subscription: Subscription) -> bool {
        self.listeners.remove(subscription)
    }
}
