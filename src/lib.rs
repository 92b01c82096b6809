//! # Ministore
//!
//! A minimal in-process observable key-value store for Rust.
//!
//! A store is created from an initial state whose top-level keys become its
//! fields. Callers subscribe listeners to individual fields and push updates
//! that notify those listeners and then commit the new state.
//!
//! ## Updates
//!
//! - `update_store` - Replace one field's value
//! - `merge_update_store` - Deep-merge a partial object into several fields
//! - `trigger_store_update` - Re-deliver a field's current value
//!
//! Listeners of a field run synchronously, in registration order, *before*
//! the new value is committed.
//!
//! ## Typed access
//!
//! `TypedStore<S>` binds a serde state type and typed `Field` keys to the
//! same engine.

pub mod error;
pub mod store;

// Re-export main types for convenience
pub use error::{Result, StoreError};
pub use store::{
    Field, Listener, Store, StoreBuilder, StoreConfig, Subscription, SubscriptionGuard, TypedStore,
};
