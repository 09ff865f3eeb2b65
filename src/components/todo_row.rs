//! Todo Row Component

use leptos::prelude::*;
use todo_store::TodoItem;

use crate::context::TodoContext;

/// A single todo in the list
#[component]
pub fn TodoRow(todo: TodoItem) -> impl IntoView {
    let ctx = use_context::<TodoContext>().expect("TodoContext should be provided");

    let id = todo.id;
    let completed = todo.completed;
    let text_class = if completed { "todo-text completed" } else { "todo-text" };

    view! {
        <li class="todo-item">
            // Checkbox
            <input
                type="checkbox"
                class="todo-checkbox"
                prop:checked=completed
                on:change=move |_| ctx.toggle_todo(id)
            />

            // Text
            <span class=text_class>{todo.text}</span>

            // Delete button
            <button class="delete-button" on:click=move |_| ctx.delete_todo(id)>"Delete"</button>
        </li>
    }
}
