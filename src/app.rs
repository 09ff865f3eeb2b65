//! Todo App
//!
//! Root component: heading, new-todo form and the list.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::components::{NewTodoForm, TodoList};
use crate::context::TodoContext;
use crate::store::{TodoView, TodoViewStore};

pub const APP_TITLE: &str = "Todo App";

#[component]
pub fn App() -> impl IntoView {
    // State
    let view_state: TodoViewStore = Store::new(TodoView::default());

    // Provide context to all children
    provide_context(view_state);
    provide_context(TodoContext::new(view_state));

    view! {
        <main class="todo-app">
            <h1>{APP_TITLE}</h1>

            <NewTodoForm />

            <TodoList />
        </main>
    }
}
