//! Todo Store
//!
//! In-memory todo list state for the todo app:
//! - item: the todo entity and id generation
//! - store: read-only state, mutations and change notification

mod item;
mod store;

pub use item::{ClockIds, IdSource, SequentialIds, TodoId, TodoItem};
pub use store::{Change, SubscriptionId, TodoState, TodoStore};
