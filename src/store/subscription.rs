use super::Snapshot;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

/// Callback invoked with the new snapshot after every committed mutation.
pub type Listener = dyn Fn(&Arc<Snapshot>) + Send + Sync;

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for SubscriptionId {
    fn from(id: u64) -> Self {
        SubscriptionId(id)
    }
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    listeners: BTreeMap<SubscriptionId, Arc<Listener>>,
}

impl ListenerRegistry {
    pub(crate) fn insert(&mut self, listener: Arc<Listener>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.insert(id, listener);
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Copies out the current listeners so they can be called without
    /// holding the registry lock.
    pub(crate) fn listeners(&self) -> Vec<Arc<Listener>> {
        self.listeners.values().cloned().collect()
    }
}

/// Handle returned by [`RecipeStore::subscribe`](crate::RecipeStore::subscribe).
///
/// The listener stays registered until the handle is dropped or
/// [`unsubscribe`](Subscription::unsubscribe) is called. Use
/// [`detach`](Subscription::detach) to keep it for the life of the store.
/// Removal is safe from inside a listener callback; it takes effect from
/// the next notification.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, registry: Weak<Mutex<ListenerRegistry>>) -> Self {
        Subscription { id, registry }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the listener. Returns false if it was already gone.
    pub fn unsubscribe(mut self) -> bool {
        self.remove()
    }

    /// Keeps the listener registered after this handle is dropped.
    ///
    /// The returned id can still be passed to
    /// [`RecipeStore::unsubscribe`](crate::RecipeStore::unsubscribe).
    pub fn detach(mut self) -> SubscriptionId {
        self.registry = Weak::new();
        self.id
    }

    fn remove(&mut self) -> bool {
        match std::mem::take(&mut self.registry).upgrade() {
            Some(registry) => registry.lock().remove(self.id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &(self.registry.strong_count() > 0))
            .finish()
    }
}
