//! Change notification channel.
//!
//! An explicit observer list with add, remove-by-id and a synchronous
//! dispatch-to-all. Handlers run on the caller's thread, in-line with
//! [`ChangeChannel::dispatch`].
//!
//! # Re-entrancy
//!
//! Dispatch snapshots the subscriber list and releases every internal borrow
//! before calling out. Before each call it re-checks that the handler is
//! still subscribed. So, from inside a handler:
//!
//! - unsubscribing itself or any other handler is safe, and a handler removed
//!   this way is not called later in the same dispatch;
//! - subscribing is safe; the new handler first hears the next dispatch;
//! - dispatching again is safe (nested dispatch).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Handler<E> = Rc<dyn Fn(&E)>;

/// Identifies one subscription on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct ChannelInner<E> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Handler<E>)>,
}

impl<E> ChannelInner<E> {
    fn is_live(&self, id: SubscriptionId) -> bool {
        self.subscribers.iter().any(|(sub_id, _)| *sub_id == id)
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }
}

/// A multi-subscriber, single-threaded event channel.
///
/// Cloning yields another handle to the same subscriber list.
pub struct ChangeChannel<E> {
    inner: Rc<RefCell<ChannelInner<E>>>,
}

impl<E> Clone for ChangeChannel<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for ChangeChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeChannel")
            .field("subscriber_count", &self.len())
            .finish()
    }
}

impl<E> Default for ChangeChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ChangeChannel<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ChannelInner {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register a handler. It stays registered until [`unsubscribe`] is
    /// called with the returned id.
    ///
    /// [`unsubscribe`]: ChangeChannel::unsubscribe
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Rc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().remove(id)
    }

    /// Register a handler that is removed when the returned guard drops.
    pub fn subscribe_scoped(&self, handler: impl Fn(&E) + 'static) -> Subscription
    where
        E: 'static,
    {
        let id = self.subscribe(handler);
        let weak: Weak<RefCell<ChannelInner<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            id,
            release: Some(Box::new(move |id| {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().remove(id);
                }
            })),
        }
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner.borrow().is_live(id)
    }

    /// A handle that does not keep the channel alive, safe to capture in
    /// one of its own handlers.
    pub fn downgrade(&self) -> WeakChannel<E> {
        WeakChannel {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every handler subscribed when dispatch starts and
    /// still subscribed when its turn comes. Returns the number of handlers
    /// called.
    pub fn dispatch(&self, event: &E) -> usize {
        let snapshot: Vec<(SubscriptionId, Handler<E>)> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            handler(event);
            delivered += 1;
        }
        delivered
    }
}

/// Non-owning handle to a [`ChangeChannel`].
///
/// Operations on a dropped channel do nothing.
pub struct WeakChannel<E> {
    inner: Weak<RefCell<ChannelInner<E>>>,
}

impl<E> Clone for WeakChannel<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for WeakChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakChannel")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl<E> WeakChannel<E> {
    /// Remove a handler. Returns `false` if it was not registered or the
    /// channel is gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = inner.borrow_mut().remove(id);
        removed
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let live = inner.borrow().is_live(id);
        live
    }

    /// The channel, if it still exists.
    pub fn upgrade(&self) -> Option<ChangeChannel<E>> {
        self.inner.upgrade().map(|inner| ChangeChannel { inner })
    }
}

/// Guard for a subscription made with [`ChangeChannel::subscribe_scoped`].
///
/// Dropping it unsubscribes. It holds only a weak reference to the channel,
/// so it never keeps the channel alive.
#[must_use = "dropping this guard unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    release: Option<Box<dyn FnOnce(SubscriptionId)>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unsubscribe now. Equivalent to dropping the guard.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}
