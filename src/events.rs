//! Structural change notifications.
//!
//! Delivery is synchronous, in subscription order, on the caller's stack.
//! Handlers only see shared references, so they cannot mutate the store
//! that is notifying them.

use std::collections::BTreeMap;
use std::fmt;

use tracing::trace;

use crate::node::{Node, NodeId};

/// Parent path -> ordered child identities.
pub type ParentPathIndex = BTreeMap<String, Vec<NodeId>>;

#[derive(Debug)]
pub enum StoreEvent<'a, P> {
    /// Whole tree rebuilt
    Reindexed(&'a ParentPathIndex),
    /// Node (with its subtree) linked into the tree
    Added(&'a Node<P>),
    /// Node about to be unlinked together with its subtree
    Removed(&'a Node<P>),
}

impl<P> StoreEvent<'_, P> {
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::Reindexed(_) => "reindexed",
            StoreEvent::Added(_) => "added",
            StoreEvent::Removed(_) => "removed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<P> = Box<dyn FnMut(&StoreEvent<'_, P>)>;

/// Observer list embedded in the store.
pub struct Observers<P> {
    handlers: Vec<(SubscriptionId, Handler<P>)>,
    next_id: u64,
}

impl<P> Default for Observers<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Observers<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

impl<P> Observers<P> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent<'_, P>) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: &StoreEvent<'_, P>) {
        trace!(event = event.name(), subscribers = self.handlers.len(), "emit");
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
