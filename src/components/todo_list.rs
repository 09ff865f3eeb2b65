//! Todo List Component
//!
//! Renders the todo rows, an empty-state message and the item count.

use leptos::prelude::*;

use crate::components::TodoRow;
use crate::store::{row_key, summary, todo_items, use_todo_view};

#[component]
pub fn TodoList() -> impl IntoView {
    let view_state = use_todo_view();

    view! {
        <Show
            when=move || !todo_items(&view_state).is_empty()
            fallback=|| view! { <p class="todo-empty">"Nothing to do yet."</p> }
        >
            <ul class="todo-list">
                <For
                    each=move || todo_items(&view_state)
                    key=row_key
                    children=move |todo| view! { <TodoRow todo=todo /> }
                />
            </ul>
        </Show>

        <p class="todo-count">{move || summary(&view_state)}</p>
    }
}
