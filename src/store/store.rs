use super::config::{StoreBuilder, StoreConfig};
use super::merge::merge_into;
use super::registry::{Listener, SubscriberRegistry};
use super::subscription::Subscription;
use crate::error::{kind_of, Result, StoreError};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// An observable store of named fields.
///
/// The field set is fixed by the initial state. Listeners subscribe to one
/// field and are called synchronously, in registration order, whenever that
/// field is updated or triggered.
///
/// Listeners run *before* the new value is committed: the callback argument
/// is the new value, while reading the store from inside the callback still
/// shows the old one.
///
/// Cloning a store is cheap; clones share state and listeners.
///
/// # Examples
///
/// ```
/// use ministore::Store;
/// use serde_json::json;
/// use std::sync::{Arc, Mutex};
///
/// let store = Store::from_state(&json!({ "count": 0 })).unwrap();
/// let log = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&log);
/// let subscription = store
///     .subscribe("count", move |value| sink.lock().unwrap().push(value.clone()))
///     .unwrap();
///
/// store.update_store("count", 5).unwrap();
/// store.update_store("count", 10).unwrap();
///
/// assert_eq!(*log.lock().unwrap(), vec![json!(5), json!(10)]);
/// assert_eq!(store.get("count"), Some(json!(10)));
///
/// subscription.unsubscribe();
/// ```
pub struct Store {
    state: Arc<RwLock<Map<String, Value>>>,
    registry: Arc<SubscriberRegistry>,
    config: Arc<StoreConfig>,
}

impl Store {
    /// Create a store whose declared fields are the keys of `initial`.
    pub fn new(initial: Map<String, Value>) -> Self {
        Self::with_config(initial, StoreConfig::default())
    }

    /// Create a store with explicit settings.
    pub fn with_config(initial: Map<String, Value>, config: StoreConfig) -> Self {
        let registry = SubscriberRegistry::new(initial.keys().cloned());
        debug!(
            store = config.name.as_deref().unwrap_or_default(),
            fields = initial.len(),
            "store created"
        );
        Self {
            state: Arc::new(RwLock::new(initial)),
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }

    /// Create a store from any value that serializes to a JSON object.
    pub fn from_state<S: Serialize + ?Sized>(initial: &S) -> Result<Self> {
        Ok(Self::new(to_object(initial)?))
    }

    /// Start building a store with non-default settings.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Settings this store was created with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Register `listener` on `field`.
    ///
    /// Fails with [`StoreError::UnknownField`] if `field` was not declared.
    pub fn subscribe<F>(&self, field: &str, listener: F) -> Result<Subscription>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.subscribe_listener(field, Arc::new(listener))
    }

    /// Register an already shared listener on `field`.
    ///
    /// The same listener may be registered any number of times, on the same
    /// field or on several; each registration gets its own handle.
    pub fn subscribe_listener(&self, field: &str, listener: Listener) -> Result<Subscription> {
        let id = self
            .registry
            .add(field, listener)
            .ok_or_else(|| StoreError::unknown_field(field))?;
        debug!(store = self.label(), field, id, "listener subscribed");
        Ok(Subscription::new(
            field.to_string(),
            id,
            Arc::downgrade(&self.registry),
        ))
    }

    /// Replace the value of `field`.
    ///
    /// Subscribers of `field` receive `new_value` first; the value is committed
    /// once every listener has returned.
    pub fn update_store(&self, field: &str, new_value: impl Into<Value>) -> Result<()> {
        self.ensure_field(field)?;
        let new_value = new_value.into();

        self.notify(field, &new_value);

        self.state.write().insert(field.to_string(), new_value);
        Ok(())
    }

    /// Deep-merge a partial update into the state.
    ///
    /// Every top-level field in `partial` must be declared; otherwise nothing
    /// is notified or changed. Subscribers of each field receive the delta for
    /// that field (not the merged result) before the merge is committed.
    pub fn merge_update_store(&self, partial: Map<String, Value>) -> Result<()> {
        if let Some(field) = partial.keys().find(|field| !self.registry.contains(field)) {
            return Err(StoreError::unknown_field(field));
        }
        debug!(
            store = self.label(),
            fields = partial.len(),
            "merging partial update"
        );

        for (field, delta) in &partial {
            self.notify(field, delta);
        }

        merge_into(&mut self.state.write(), partial);
        Ok(())
    }

    /// Re-deliver the current value of `field` to its subscribers without
    /// changing it.
    pub fn trigger_store_update(&self, field: &str) -> Result<()> {
        self.ensure_field(field)?;
        if self.registry.count(field) == 0 {
            return Ok(());
        }
        let current = self.state.read().get(field).cloned().unwrap_or(Value::Null);
        self.notify(field, &current);
        Ok(())
    }

    /// Clone of the current value of `field`.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.state.read().get(field).cloned()
    }

    /// Read `field` without cloning it.
    ///
    /// `f` runs under the state lock and must not update this store.
    pub fn read<F, R>(&self, field: &str, f: F) -> Option<R>
    where
        F: FnOnce(&Value) -> R,
    {
        let state = self.state.read();
        state.get(field).map(f)
    }

    /// Clone of the whole state record.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.state.read().clone()
    }

    /// Declared field names, sorted.
    pub fn fields(&self) -> Vec<String> {
        self.registry.field_names()
    }

    /// Whether `field` was declared at construction.
    pub fn contains_field(&self, field: &str) -> bool {
        self.registry.contains(field)
    }

    /// Number of listeners currently registered on `field`.
    pub fn subscriber_count(&self, field: &str) -> usize {
        self.registry.count(field)
    }

    fn ensure_field(&self, field: &str) -> Result<()> {
        if self.registry.contains(field) {
            Ok(())
        } else {
            Err(StoreError::unknown_field(field))
        }
    }

    /// Call every listener of `field` with `value`.
    ///
    /// Works on a snapshot of the listener list and holds no lock while
    /// listeners run, so they may subscribe, unsubscribe or update re-entrantly.
    fn notify(&self, field: &str, value: &Value) {
        let listeners = self.registry.snapshot(field);
        trace!(
            store = self.label(),
            field,
            listeners = listeners.len(),
            "notifying subscribers"
        );
        for listener in listeners {
            self.invoke(field, &listener, value);
        }
    }

    fn invoke(&self, field: &str, listener: &Listener, value: &Value) {
        if !self.config.isolate_listener_panics {
            listener(value);
            return;
        }
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(value))) {
            error!(
                store = self.label(),
                field,
                panic = panic_message(panic.as_ref()),
                "listener panicked"
            );
        }
    }

    fn label(&self) -> &str {
        self.config.name.as_deref().unwrap_or_default()
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.config.name)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

pub(crate) fn to_object<S: Serialize + ?Sized>(value: &S) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotAnObject {
            found: kind_of(&other),
        }),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
