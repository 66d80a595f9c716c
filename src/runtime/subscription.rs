//! Observer subscriptions
//!
//! Subscriptions are handles that unsubscribe when dropped.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// A handle to a subscription. When dropped, the subscription is cancelled.
#[must_use]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + 'static>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Keep the subscriber registered for as long as the emitter lives
    pub fn detach(mut self) {
        self.unsubscribe.take();
    }

    /// Combine two subscriptions; dropping the result cancels both
    pub fn join(mut a: Self, mut b: Self) -> Self {
        let a_unsub = a.unsubscribe.take();
        let b_unsub = b.unsubscribe.take();
        Self::new(move || {
            if let Some(unsub) = a_unsub {
                unsub();
            }
            if let Some(unsub) = b_unsub {
                unsub();
            }
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Subscriber<T> {
    active: Rc<Cell<bool>>,
    callback: Callback<T>,
}

struct SubscriberListState<T> {
    subscribers: BTreeMap<usize, Subscriber<T>>,
    next_subscriber_id: usize,
}

/// Subscribers to one kind of notification, called in subscription order
pub(crate) struct SubscriberList<T>(Rc<RefCell<SubscriberListState<T>>>);

impl<T> Clone for SubscriberList<T> {
    fn clone(&self) -> Self {
        SubscriberList(Rc::clone(&self.0))
    }
}

impl<T: 'static> SubscriberList<T> {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(SubscriberListState {
            subscribers: BTreeMap::new(),
            next_subscriber_id: 0,
        })))
    }

    pub fn insert(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let active = Rc::new(Cell::new(true));
        let mut lock = self.0.borrow_mut();
        let subscriber_id = lock.next_subscriber_id;
        lock.next_subscriber_id += 1;
        lock.subscribers.insert(
            subscriber_id,
            Subscriber {
                active: Rc::clone(&active),
                callback: Rc::new(RefCell::new(callback)),
            },
        );

        let this = Rc::downgrade(&self.0);
        Subscription::new(move || {
            active.set(false);
            if let Some(state) = this.upgrade() {
                state.borrow_mut().subscribers.remove(&subscriber_id);
            }
        })
    }

    /// Call every subscriber synchronously
    ///
    /// Subscribers may subscribe or unsubscribe while being notified. Newly
    /// added subscribers are first called on the next notification; removed
    /// ones are not called again.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<(Rc<Cell<bool>>, Callback<T>)> = self
            .0
            .borrow()
            .subscribers
            .values()
            .map(|s| (Rc::clone(&s.active), Rc::clone(&s.callback)))
            .collect();

        for (active, callback) in snapshot {
            if !active.get() {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(value),
                Err(_) => tracing::warn!("Skipping re-entrant notification of a subscriber"),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.borrow().subscribers.len()
    }
}

impl<T: 'static> Default for SubscriberList<T> {
    fn default() -> Self {
        Self::new()
    }
}
