use super::registry::SubscriberRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;
use tracing::debug;

/// Handle to a single listener registration.
///
/// Returned by [`Store::subscribe`](crate::Store::subscribe). Dropping the
/// handle leaves the listener registered; call [`unsubscribe`](Self::unsubscribe)
/// to remove it, or convert it with [`into_guard`](Self::into_guard) to tie the
/// registration to a scope.
pub struct Subscription {
    field: String,
    id: u64,
    registry: Weak<SubscriberRegistry>,
    active: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(field: String, id: u64, registry: Weak<SubscriberRegistry>) -> Self {
        Self {
            field,
            id,
            registry,
            active: AtomicBool::new(true),
        }
    }

    /// Remove the listener this handle registered.
    ///
    /// Only the registration created by the matching `subscribe` call is
    /// removed, even when the same callback is registered several times.
    /// Calling this again, or after the store is gone, does nothing.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(&self.field, self.id) {
                debug!(field = %self.field, id = self.id, "listener unsubscribed");
            }
        }
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && self.registry.strong_count() > 0
    }

    /// Field this subscription listens to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Turn the handle into a guard that unsubscribes when dropped.
    pub fn into_guard(self) -> SubscriptionGuard {
        SubscriptionGuard { subscription: self }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("field", &self.field)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// RAII guard for a subscription.
#[derive(Debug)]
pub struct SubscriptionGuard {
    subscription: Subscription,
}

impl SubscriptionGuard {
    /// Field the guarded subscription listens to.
    pub fn field(&self) -> &str {
        self.subscription.field()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
