//! Subscription handles.

use std::fmt;
use std::sync::Weak;

/// Identifier assigned to each callback registered on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    /// Returns the raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Type-erased view of a bus registry, so `Subscription` need not carry the
/// event type.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId) -> bool;
    fn contains(&self, id: SubscriptionId) -> bool;
}

/// Handle for a registered callback.
///
/// Dropping the handle does NOT remove the callback. Call
/// [`unsubscribe`](Self::unsubscribe) to stop delivery.
///
/// The handle holds only a weak reference to the bus: it never keeps a bus
/// alive on its own.
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, registry: Weak<dyn Detach>) -> Self {
        Self { id, registry }
    }

    /// The id of the registered callback.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the callback from the bus.
    ///
    /// Returns `true` if this call removed it, `false` if it was already
    /// gone (previously unsubscribed, or the bus has been dropped).
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.detach(self.id),
            None => false,
        }
    }

    /// Returns `true` while the callback is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.contains(self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
