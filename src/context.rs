//! Application Context
//!
//! Owns the todo store and exposes its operations to components via the
//! Leptos Context API.

use leptos::prelude::*;
use todo_store::{ClockIds, TodoId, TodoStore};

use crate::store::{apply_change, TodoViewStore};

type BrowserTodoStore = TodoStore<ClockIds<fn() -> TodoId>>;

/// Milliseconds since the epoch, the same seed the browser's Date gives
fn now_millis() -> TodoId {
    js_sys::Date::now() as TodoId
}

/// Todo operations provided via context
#[derive(Clone, Copy)]
pub struct TodoContext {
    store: StoredValue<BrowserTodoStore, LocalStorage>,
}

impl TodoContext {
    /// Create the todo store and keep `view` in sync with it
    pub fn new(view: TodoViewStore) -> Self {
        let mut store = TodoStore::with_id_source(ClockIds::new(now_millis as fn() -> TodoId));
        store.subscribe(move |state, change| apply_change(&view, state, *change));
        Self {
            store: StoredValue::new_local(store),
        }
    }

    pub fn set_pending_text(&self, text: String) {
        self.store.update_value(|store| store.set_pending_text(text));
    }

    pub fn add_todo(&self) {
        self.store.update_value(|store| {
            let id = store.add_todo();
            log::info!("[APP] added todo {}", id);
        });
    }

    pub fn toggle_todo(&self, id: TodoId) {
        self.store.update_value(|store| {
            store.toggle_todo(id);
        });
    }

    pub fn delete_todo(&self, id: TodoId) {
        self.store.update_value(|store| {
            store.delete_todo(id);
        });
    }
}
