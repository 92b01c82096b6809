use super::config::StoreBuilder;
use super::store::Store;
use super::subscription::Subscription;
use crate::error::{kind_of, Result, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use tracing::warn;

/// A typed key naming one field of state `S` holding values of type `V`.
///
/// Declare keys once as constants next to the state type:
///
/// ```
/// use ministore::Field;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct AppState {
///     count: i64,
/// }
///
/// const COUNT: Field<AppState, i64> = Field::new("count");
/// assert_eq!(COUNT.name(), "count");
/// ```
pub struct Field<S, V> {
    name: &'static str,
    _marker: PhantomData<fn(&S) -> V>,
}

impl<S, V> Field<S, V> {
    /// Key for the field serialized under `name`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The serialized field name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<S, V> Clone for Field<S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for Field<S, V> {}

impl<S, V> fmt::Debug for Field<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

/// A [`Store`] bound to a state type `S`.
///
/// Values cross the boundary through serde: typed updates are encoded to
/// JSON, and listeners decode the delivered JSON back into the field type.
///
/// # Examples
///
/// ```
/// use ministore::{Field, TypedStore};
/// use serde::{Deserialize, Serialize};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// struct User {
///     id: u32,
///     name: String,
/// }
///
/// #[derive(Serialize, Deserialize)]
/// struct Session {
///     user: Option<User>,
/// }
///
/// const USER: Field<Session, Option<User>> = Field::new("user");
///
/// let store = TypedStore::new(Session { user: None }).unwrap();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// store
///     .subscribe(USER, move |user| sink.lock().unwrap().push(user))
///     .unwrap();
///
/// let user = User { id: 1, name: "User".into() };
/// store.update(USER, Some(user.clone())).unwrap();
/// store.update(USER, None).unwrap();
///
/// assert_eq!(*seen.lock().unwrap(), vec![Some(user), None]);
/// assert_eq!(store.get(USER).unwrap(), None);
/// ```
pub struct TypedStore<S> {
    store: Store,
    _state: PhantomData<fn() -> S>,
}

impl<S> TypedStore<S>
where
    S: Serialize + DeserializeOwned,
{
    /// Create a typed store from its initial state.
    pub fn new(initial: S) -> Result<Self> {
        Self::with_builder(StoreBuilder::new(), initial)
    }

    /// Create a typed store with non-default settings.
    pub fn with_builder(builder: StoreBuilder, initial: S) -> Result<Self> {
        Ok(Self {
            store: builder.build_from_state(&initial)?,
            _state: PhantomData,
        })
    }

    /// Subscribe to `field`, receiving decoded values.
    ///
    /// A delivered value that does not decode as `V` (possible for partial
    /// deltas passed to [`merge`](Self::merge)) is logged and skipped.
    pub fn subscribe<V, F>(&self, field: Field<S, V>, listener: F) -> Result<Subscription>
    where
        V: DeserializeOwned + 'static,
        F: Fn(V) + Send + Sync + 'static,
    {
        let name = field.name();
        self.store
            .subscribe(name, move |value| match V::deserialize(value) {
                Ok(value) => listener(value),
                Err(err) => {
                    warn!(field = name, error = %err, "value does not decode as field type, listener skipped");
                }
            })
    }

    /// Replace the value of `field`.
    pub fn update<V: Serialize>(&self, field: Field<S, V>, value: V) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.store.update_store(field.name(), value)
    }

    /// Deep-merge a partial JSON object into the state.
    pub fn merge(&self, partial: Value) -> Result<()> {
        match partial {
            Value::Object(partial) => self.store.merge_update_store(partial),
            other => Err(StoreError::NotAnObject {
                found: kind_of(&other),
            }),
        }
    }

    /// Re-deliver the current value of `field` to its subscribers.
    pub fn trigger<V>(&self, field: Field<S, V>) -> Result<()> {
        self.store.trigger_store_update(field.name())
    }

    /// Decode the current value of `field`.
    pub fn get<V: DeserializeOwned>(&self, field: Field<S, V>) -> Result<V> {
        let name = field.name();
        self.store
            .read(name, |value| V::deserialize(value))
            .ok_or_else(|| StoreError::unknown_field(name))?
            .map_err(|source| StoreError::Decode {
                field: name.to_string(),
                source,
            })
    }

    /// Decode the whole state.
    pub fn state(&self) -> Result<S> {
        S::deserialize(Value::Object(self.store.snapshot())).map_err(StoreError::DecodeState)
    }

    /// The underlying untyped store.
    pub fn untyped(&self) -> &Store {
        &self.store
    }
}

impl<S> Clone for TypedStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _state: PhantomData,
        }
    }
}

impl<S> fmt::Debug for TypedStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedStore").field(&self.store).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: u32,
        name: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct State {
        count: i64,
        profile: Option<Profile>,
    }

    const COUNT: Field<State, i64> = Field::new("count");
    const PROFILE: Field<State, Option<Profile>> = Field::new("profile");
    const MISSING: Field<State, bool> = Field::new("missing");

    fn initial() -> State {
        State {
            count: 0,
            profile: Some(Profile {
                id: 1,
                name: "A".to_string(),
            }),
        }
    }

    #[test]
    fn update_and_read_typed_values() {
        let store = TypedStore::new(initial()).unwrap();
        store.update(COUNT, 42).unwrap();
        assert_eq!(store.get(COUNT).unwrap(), 42);
        assert_eq!(store.state().unwrap().count, 42);
    }

    #[test]
    fn merge_keeps_unspecified_keys() {
        let store = TypedStore::new(initial()).unwrap();
        store.merge(json!({ "profile": { "name": "B" } })).unwrap();
        assert_eq!(
            store.get(PROFILE).unwrap(),
            Some(Profile {
                id: 1,
                name: "B".to_string()
            })
        );
    }

    #[test]
    fn merge_rejects_non_objects() {
        let store = TypedStore::new(initial()).unwrap();
        assert!(matches!(
            store.merge(json!("profile")),
            Err(StoreError::NotAnObject { found: "a string" })
        ));
    }

    #[test]
    fn partial_delta_that_does_not_decode_is_skipped() {
        let store = TypedStore::new(initial()).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store
            .subscribe(PROFILE, move |profile| sink.lock().unwrap().push(profile))
            .unwrap();

        store.merge(json!({ "profile": { "name": "B" } })).unwrap();
        assert!(seen.lock().unwrap().is_empty());

        store.trigger(PROFILE).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn unknown_typed_field_is_rejected() {
        let store = TypedStore::new(initial()).unwrap();
        assert!(matches!(
            store.get(MISSING),
            Err(StoreError::UnknownField { .. })
        ));
        assert!(store.update(MISSING, true).is_err());
        assert!(store.subscribe(MISSING, |_| {}).is_err());
    }

    #[test]
    fn decode_failure_is_reported() {
        let store = TypedStore::new(initial()).unwrap();
        store.untyped().update_store("count", "many").unwrap();
        assert!(matches!(
            store.get(COUNT),
            Err(StoreError::Decode { ref field, .. }) if field == "count"
        ));
        assert!(matches!(store.state(), Err(StoreError::DecodeState(_))));
    }
}
