//! Callback Registries
//!
//! Explicit publish/subscribe owned by the object that raises the event.
//! Subscriptions live until `unsubscribe` or until the owner is dropped.

use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u32);

/// Ordered set of event handlers.
///
/// Handlers run in subscription order on every `publish`. `R` is the
/// handler's return type; completion handlers return a future.
pub struct Subscribers<E, R = ()> {
    next_id: u32,
    handlers: Vec<(SubscriptionId, Box<dyn FnMut(&E) -> R>)>,
}

impl<E, R> Default for Subscribers<E, R> {
    fn default() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }
}

impl<E, R> Subscribers<E, R> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) -> R + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _)| *sub != id);
        self.handlers.len() != before
    }

    /// Invoke every handler with the event, discarding results.
    pub fn publish(&mut self, event: &E) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
    }

    /// Invoke every handler and collect their results in order.
    pub fn publish_collect(&mut self, event: &E) -> Vec<R> {
        self.handlers.iter_mut().map(|(_, handler)| handler(event)).collect()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E, R> fmt::Debug for Subscribers<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.handlers.len())
            .finish()
    }
}
