//! Store example with complex state

use ministore::Store;
use serde_json::{json, Value};

fn active_count(todos: &Value) -> usize {
    todos
        .as_array()
        .map(|todos| {
            todos
                .iter()
                .filter(|t| t["completed"] == json!(false))
                .count()
        })
        .unwrap_or(0)
}

fn main() -> ministore::Result<()> {
    println!("=== Store Example ===\n");

    // Create a store with initial state
    let store = Store::from_state(&json!({
        "todos": [],
        "filter": "all",
        "settings": { "theme": "light", "compact": false },
    }))?;

    // Subscribe to the fields we care about
    let todos = store.subscribe("todos", |todos| {
        println!("Todos updated! Active todos: {}", active_count(todos));
    })?;
    store.subscribe("settings", |delta| {
        println!("Settings delta: {delta}");
    })?;

    // Add a todo
    println!("Adding todo...");
    store.update_store(
        "todos",
        json!([{ "id": 1, "text": "Learn Rust", "completed": false }]),
    )?;

    // Complete the todo. Arrays are replaced as a whole.
    println!("\nCompleting todo...");
    let mut current = store.get("todos").unwrap_or(Value::Null);
    if let Some(todo) = current.get_mut(0) {
        todo["completed"] = json!(true);
    }
    store.update_store("todos", current)?;

    // Change one nested setting, keeping the rest
    println!("\nSwitching theme...");
    let Value::Object(partial) = json!({ "settings": { "theme": "dark" } }) else {
        unreachable!();
    };
    store.merge_update_store(partial)?;

    todos.unsubscribe();
    store.update_store("filter", "active")?;

    // Read final state
    println!("\nFinal state: {:#?}", store.snapshot());
    Ok(())
}
