use super::Store;
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// Behavioural settings for a [`Store`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Catch listener panics, log them and continue the notification pass.
    ///
    /// Off by default: a panicking listener unwinds into the caller of the
    /// update, and the pending commit is skipped.
    pub isolate_listener_panics: bool,
    /// Label attached to the store's log events.
    pub name: Option<String>,
}

/// Fluent construction of a [`Store`] with non-default settings.
///
/// # Examples
///
/// ```
/// use ministore::Store;
/// use serde_json::json;
///
/// let store = Store::builder()
///     .name("session")
///     .isolate_listener_panics(true)
///     .build_from_state(&json!({ "user": null }))
///     .unwrap();
///
/// assert_eq!(store.config().name.as_deref(), Some("session"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    config: StoreConfig,
}

impl StoreBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label used in log events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Isolate listener panics instead of propagating them.
    pub fn isolate_listener_panics(mut self, isolate: bool) -> Self {
        self.config.isolate_listener_panics = isolate;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a store over `initial`; its keys become the declared fields.
    pub fn build(self, initial: Map<String, Value>) -> Store {
        Store::with_config(initial, self.config)
    }

    /// Build a store from any value that serializes to a JSON object.
    pub fn build_from_state<S: Serialize + ?Sized>(self, initial: &S) -> Result<Store> {
        let initial = super::store::to_object(initial)?;
        Ok(self.build(initial))
    }
}
