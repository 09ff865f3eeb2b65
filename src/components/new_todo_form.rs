//! New Todo Form Component
//!
//! Text input bound to the pending text plus the add button.

use leptos::prelude::*;

use crate::context::TodoContext;
use crate::store::{pending_text, use_todo_view};

/// Form for creating new todos
#[component]
pub fn NewTodoForm() -> impl IntoView {
    let ctx = use_context::<TodoContext>().expect("TodoContext should be provided");
    let view_state = use_todo_view();

    let create_todo = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        ctx.add_todo();
    };

    view! {
        <form class="todo-form" on:submit=create_todo>
            <input
                type="text"
                class="todo-input"
                placeholder="What needs to be done?"
                prop:value=move || pending_text(&view_state)
                on:input=move |ev| ctx.set_pending_text(event_target_value(&ev))
            />
            <button type="submit" class="todo-button">"Add"</button>
        </form>
    }
}
