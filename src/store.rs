//! View State Store
//!
//! Mirror of the todo state for rendering, using Leptos reactive_stores for
//! fine-grained reactivity. Only [`apply_change`] writes to it.

use leptos::prelude::*;
use reactive_stores::Store;
use todo_store::{Change, TodoId, TodoItem, TodoState};

/// What the view renders
#[derive(Clone, Debug, Default, Store)]
pub struct TodoView {
    /// Items in insertion order
    pub todos: Vec<TodoItem>,
    /// Text in the new-todo input
    pub pending_text: String,
}

/// Type alias for the store
pub type TodoViewStore = Store<TodoView>;

/// Get the view store from context
pub fn use_todo_view() -> TodoViewStore {
    expect_context::<TodoViewStore>()
}

// ========================
// Store Helper Functions
// ========================

pub fn todo_items(store: &TodoViewStore) -> Vec<TodoItem> {
    store.todos().get()
}

pub fn pending_text(store: &TodoViewStore) -> String {
    store.pending_text().get()
}

/// List key of a row. Completion is part of it, so a toggle replaces the row.
pub fn row_key(todo: &TodoItem) -> (TodoId, bool) {
    (todo.id, todo.completed)
}

/// Footer line, e.g. "3 items, 1 completed"
pub fn summary(store: &TodoViewStore) -> String {
    let todos = store.todos().read();
    let completed = todos.iter().filter(|todo| todo.completed).count();
    format!("{} items, {} completed", todos.len(), completed)
}

/// Copy whatever `change` touched from the todo state into the view store
pub fn apply_change(store: &TodoViewStore, state: &TodoState, change: Change) {
    match change {
        Change::PendingText => store.pending_text().set(state.pending_text().to_string()),
        Change::Added(_) => {
            store.todos().set(state.todos().to_vec());
            store.pending_text().set(state.pending_text().to_string());
        }
        Change::Toggled(_) | Change::Deleted(_) => store.todos().set(state.todos().to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_key_changes_on_toggle() {
        let todo = TodoItem::new(1, "Buy milk");
        let done = todo.toggled();

        assert_ne!(row_key(&todo), row_key(&done));
        assert_eq!(row_key(&done.toggled()), row_key(&todo));
        assert_ne!(row_key(&todo), row_key(&TodoItem::new(2, "Buy milk")));
    }
}
