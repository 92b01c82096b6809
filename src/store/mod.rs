//! The observable store engine.
//!
//! A [`Store`] holds a fixed set of named fields. Listeners subscribe to one
//! field and are notified synchronously when it is replaced
//! ([`Store::update_store`]), deep-merged ([`Store::merge_update_store`]) or
//! re-triggered ([`Store::trigger_store_update`]). [`TypedStore`] layers a
//! serde-typed API over the same engine.

mod config;
mod merge;
mod registry;
mod store;
mod subscription;
mod typed;

pub use config::{StoreBuilder, StoreConfig};
pub use merge::merge_into;
pub use registry::Listener;
pub use store::Store;
pub use subscription::{Subscription, SubscriptionGuard};
pub use typed::{Field, TypedStore};
