//! A navbar that re-renders on login and logout.
//!
//! Run with `RUST_LOG=ministore=debug` to see the store's own log events.

use ministore::{Field, SubscriptionGuard, TypedStore};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
}

#[derive(Serialize, Deserialize)]
struct AppState {
    user: Option<User>,
}

const USER: Field<AppState, Option<User>> = Field::new("user");

/// A component that renders the current user and re-renders on change.
struct Navbar {
    _mounted: SubscriptionGuard,
}

impl Navbar {
    fn mount(store: &TypedStore<AppState>) -> ministore::Result<Self> {
        render(store.get(USER)?.as_ref());
        let subscription = store.subscribe(USER, |user| render(user.as_ref()))?;
        Ok(Self {
            _mounted: subscription.into_guard(),
        })
    }
}

fn render(user: Option<&User>) {
    match user {
        Some(user) => println!("   [Hello, {}] [Logout]", user.name),
        None => println!("   [Login]"),
    }
}

fn user_login(store: &TypedStore<AppState>) -> ministore::Result<()> {
    store.update(
        USER,
        Some(User {
            id: 1,
            name: "User".to_string(),
        }),
    )
}

fn user_logout(store: &TypedStore<AppState>) -> ministore::Result<()> {
    store.update(USER, None)
}

fn main() -> ministore::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== User Session Example ===\n");

    let store = TypedStore::with_builder(
        ministore::Store::builder().name("session"),
        AppState { user: None },
    )?;

    println!("1. Mounting navbar");
    let navbar = Navbar::mount(&store)?;

    println!("\n2. Logging in");
    user_login(&store)?;

    println!("\n3. Renaming user through a partial merge");
    store.merge(serde_json::json!({ "user": { "name": "Renamed" } }))?;
    store.trigger(USER)?;

    println!("\n4. Logging out");
    user_logout(&store)?;

    println!("\n5. Unmounting navbar and logging in again (no render expected)");
    drop(navbar);
    user_login(&store)?;

    println!(
        "\nListeners left on `user`: {}",
        store.untyped().subscriber_count("user")
    );
    Ok(())
}
