//! Undo/redo listener registration and dispatch.

use std::fmt;

use tracing::trace;

use crate::error::{ListenerResult, TxnError, TxnResult};
use crate::state::TxnAction;

/// Events listeners can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxnEvent {
    /// Fired before a transaction is reversed or reinstated.
    BeforeUndoRedo,
    /// Fired after a transaction was reversed or reinstated.
    AfterUndoRedo,
}

impl fmt::Display for TxnEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxnEvent::BeforeUndoRedo => write!(f, "before-undo-redo"),
            TxnEvent::AfterUndoRedo => write!(f, "after-undo-redo"),
        }
    }
}

/// Handle returned when a listener is added. Pass it to
/// [`ListenerBus::remove`] to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    event: TxnEvent,
    id: u64,
}

impl Subscription {
    /// The event this subscription listens to.
    pub fn event(&self) -> TxnEvent {
        self.event
    }
}

type BeforeListener = Box<dyn FnMut() -> ListenerResult>;
type AfterListener = Box<dyn FnMut(TxnAction) -> ListenerResult>;

/// Ordered listener lists, one per event kind.
///
/// Listeners run synchronously in registration order. The first failing
/// listener stops delivery of that event.
#[derive(Default)]
pub struct ListenerBus {
    next_id: u64,
    before: Vec<(u64, BeforeListener)>,
    after: Vec<(u64, AfterListener)>,
}

impl fmt::Debug for ListenerBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerBus")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

impl ListenerBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribe(&mut self, event: TxnEvent) -> Subscription {
        self.next_id += 1;
        Subscription {
            event,
            id: self.next_id,
        }
    }

    /// Add a listener fired before undo/redo.
    pub fn add_before<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut() -> ListenerResult + 'static,
    {
        let subscription = self.subscribe(TxnEvent::BeforeUndoRedo);
        self.before.push((subscription.id, Box::new(listener)));
        subscription
    }

    /// Add a listener fired after undo/redo.
    pub fn add_after<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(TxnAction) -> ListenerResult + 'static,
    {
        let subscription = self.subscribe(TxnEvent::AfterUndoRedo);
        self.after.push((subscription.id, Box::new(listener)));
        subscription
    }

    /// Remove a listener. Returns false if it was already removed.
    pub fn remove(&mut self, subscription: Subscription) -> bool {
        let before = self.len(subscription.event);
        match subscription.event {
            TxnEvent::BeforeUndoRedo => self.before.retain(|(id, _)| *id != subscription.id),
            TxnEvent::AfterUndoRedo => self.after.retain(|(id, _)| *id != subscription.id),
        }
        self.len(subscription.event) < before
    }

    /// Number of listeners for an event.
    pub fn len(&self, event: TxnEvent) -> usize {
        match event {
            TxnEvent::BeforeUndoRedo => self.before.len(),
            TxnEvent::AfterUndoRedo => self.after.len(),
        }
    }

    /// Returns true if no listener is registered for any event.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    /// Fire the before-undo-redo event.
    pub fn notify_before(&mut self) -> TxnResult<()> {
        trace!(listeners = self.before.len(), "notifying before-undo-redo");
        for (_, listener) in &mut self.before {
            listener().map_err(|err| TxnError::listener(TxnEvent::BeforeUndoRedo, err))?;
        }
        Ok(())
    }

    /// Fire the after-undo-redo event.
    pub fn notify_after(&mut self, action: TxnAction) -> TxnResult<()> {
        trace!(listeners = self.after.len(), %action, "notifying after-undo-redo");
        for (_, listener) in &mut self.after {
            listener(action).map_err(|err| TxnError::listener(TxnEvent::AfterUndoRedo, err))?;
        }
        Ok(())
    }
}
