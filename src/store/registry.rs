use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A shared listener callback, invoked with the value delivered for a field.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

struct Registration {
    id: u64,
    listener: Listener,
}

/// Per-field listener lists.
///
/// Every field declared at construction owns an entry for the registry's
/// whole lifetime. Lookups for any other name are misses, never inserts.
pub(crate) struct SubscriberRegistry {
    next_id: AtomicU64,
    fields: RwLock<HashMap<String, Vec<Registration>>>,
}

impl SubscriberRegistry {
    pub(crate) fn new<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            next_id: AtomicU64::new(0),
            fields: RwLock::new(fields.into_iter().map(|f| (f, Vec::new())).collect()),
        }
    }

    pub(crate) fn contains(&self, field: &str) -> bool {
        self.fields.read().contains_key(field)
    }

    /// Append a listener to `field`, returning its registration id.
    pub(crate) fn add(&self, field: &str, listener: Listener) -> Option<u64> {
        let mut fields = self.fields.write();
        let listeners = fields.get_mut(field)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        listeners.push(Registration { id, listener });
        Some(id)
    }

    /// Remove the registration `id` from `field`. Returns false if it was
    /// already gone.
    pub(crate) fn remove(&self, field: &str, id: u64) -> bool {
        let mut fields = self.fields.write();
        let Some(listeners) = fields.get_mut(field) else {
            return false;
        };
        match listeners.iter().position(|r| r.id == id) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Listeners of `field` in registration order, detached from the registry
    /// so the caller can invoke them without holding the lock.
    pub(crate) fn snapshot(&self, field: &str) -> Vec<Listener> {
        self.fields
            .read()
            .get(field)
            .map(|listeners| listeners.iter().map(|r| Arc::clone(&r.listener)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, field: &str) -> usize {
        self.fields.read().get(field).map_or(0, Vec::len)
    }

    pub(crate) fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.read().keys().cloned().collect();
        names.sort();
        names
    }
}
