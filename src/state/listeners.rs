//! Change listener registry.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use super::types::StateChangeEvent;

/// Callback invoked after every mutating store call.
pub type StateListener = Box<dyn FnMut(&StateChangeEvent<'_>)>;

type SharedListener = Rc<RefCell<StateListener>>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(u64, SharedListener)>,
}

impl ListenerRegistry {
    pub(crate) fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    fn insert(&mut self, listener: StateListener) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Rc::new(RefCell::new(listener))));
        id
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Register `listener` in `registry`.
pub(crate) fn subscribe(
    registry: &Rc<RefCell<ListenerRegistry>>,
    listener: StateListener,
) -> Subscription {
    let id = registry.borrow_mut().insert(listener);
    Subscription {
        id,
        registry: Rc::downgrade(registry),
    }
}

/// Call every registered listener with `event`.
///
/// The registry is snapshotted first, so listeners may unsubscribe while
/// being notified. A panicking listener is logged and skipped; the others
/// still run.
pub(crate) fn notify(registry: &Rc<RefCell<ListenerRegistry>>, event: &StateChangeEvent<'_>) {
    let listeners: Vec<(u64, SharedListener)> = registry.borrow().entries.clone();

    for (id, listener) in listeners {
        let mut callback = listener.borrow_mut();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (*callback)(event)));
        if let Err(payload) = outcome {
            tracing::warn!(
                listener = id,
                error = panic_message(payload.as_ref()),
                "state listener panicked"
            );
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Handle returned by [`super::StateStore::subscribe`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<ListenerRegistry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.id);
        }
    }
}
