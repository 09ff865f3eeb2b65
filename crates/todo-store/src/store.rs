//! Todo Store
//!
//! Owns the todo list and the pending input text. Every mutation runs to
//! completion before observers are told about it, so an observer never sees a
//! half-applied change.

use std::fmt;

use log::{debug, trace};

use crate::item::{IdSource, SequentialIds, TodoId, TodoItem};

/// Ordered todo list plus the text currently being typed
///
/// What observers and the view get to see. Mutation goes through
/// [`TodoStore`] only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    todos: Vec<TodoItem>,
    pending_text: String,
}

impl TodoState {
    /// Items in insertion order
    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    /// Text typed but not yet committed
    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|item| item.completed).count()
    }

    pub fn remaining_count(&self) -> usize {
        self.len() - self.completed_count()
    }
}

/// What a mutation changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Pending input text was replaced
    PendingText,
    /// A new item was appended (pending text was reset as well)
    Added(TodoId),
    /// The item's completion flag flipped
    Toggled(TodoId),
    /// The item was removed
    Deleted(TodoId),
}

/// Handle returned by [`TodoStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&TodoState, &Change)>;

/// Todo list state with change notification
pub struct TodoStore<I = SequentialIds> {
    state: TodoState,
    ids: I,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl TodoStore<SequentialIds> {
    /// Empty store with counter ids
    pub fn new() -> Self {
        Self::with_id_source(SequentialIds::new())
    }
}

impl Default for TodoStore<SequentialIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IdSource> TodoStore<I> {
    /// Empty store drawing ids from `ids`
    pub fn with_id_source(ids: I) -> Self {
        Self {
            state: TodoState::default(),
            ids,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current state, read-only
    pub fn state(&self) -> &TodoState {
        &self.state
    }

    /// Replace the pending input text
    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.state.pending_text {
            return;
        }
        self.state.pending_text = text;
        self.notify(Change::PendingText);
    }

    /// Commit the pending text as a new item and clear the input.
    ///
    /// Empty pending text is accepted and produces an item with empty text.
    pub fn add_todo(&mut self) -> TodoId {
        let id = self.ids.next_id();
        let text = std::mem::take(&mut self.state.pending_text);
        debug!("add todo {} ({} chars)", id, text.len());
        self.state.todos.push(TodoItem::new(id, text));
        self.notify(Change::Added(id));
        id
    }

    /// Flip the completion flag of `id`. Returns false if no item matched.
    pub fn toggle_todo(&mut self, id: TodoId) -> bool {
        let Some(item) = self.state.todos.iter_mut().find(|item| item.id == id) else {
            trace!("toggle ignored, no todo {}", id);
            return false;
        };
        *item = item.toggled();
        debug!("toggle todo {} -> completed={}", id, item.completed);
        self.notify(Change::Toggled(id));
        true
    }

    /// Remove `id`, keeping the order of the rest. Returns false if no item matched.
    pub fn delete_todo(&mut self, id: TodoId) -> bool {
        let Some(index) = self.state.todos.iter().position(|item| item.id == id) else {
            trace!("delete ignored, no todo {}", id);
            return false;
        };
        self.state.todos.remove(index);
        debug!("delete todo {}", id);
        self.notify(Change::Deleted(id));
        true
    }

    /// Register an observer, called after every effective mutation
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&TodoState, &Change) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, change: Change) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.state, &change);
        }
    }
}

impl<I> fmt::Debug for TodoStore<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoStore")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}
