//! Todo Item Entity
//!
//! The item itself and the sources that number it. Ids only need to be unique
//! for the lifetime of a store: either a plain counter or a clock-seeded one
//! matching the millisecond-timestamp ids the browser build hands out.

use serde::{Deserialize, Serialize};

/// Identifier of a todo item, unique within a store
pub type TodoId = u64;

/// A unit of user-entered work with completion status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Display text, fixed at creation
    pub text: String,
    /// Completion status
    pub completed: bool,
}

impl TodoItem {
    /// Create a new, not yet completed item
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Copy of this item with the completion flag flipped
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Source of fresh todo ids
pub trait IdSource {
    /// Returns an id never returned before by this source
    fn next_id(&mut self) -> TodoId;
}

/// Monotonic counter starting at 1
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: TodoId,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> TodoId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Time-derived ids
///
/// Each id is the clock reading, bumped past the previous id when the clock
/// has not advanced (same millisecond) or went backwards.
#[derive(Debug, Clone)]
pub struct ClockIds<C> {
    clock: C,
    last: Option<TodoId>,
}

impl<C> ClockIds<C>
where
    C: FnMut() -> TodoId,
{
    pub fn new(clock: C) -> Self {
        Self { clock, last: None }
    }
}

impl<C> IdSource for ClockIds<C>
where
    C: FnMut() -> TodoId,
{
    fn next_id(&mut self) -> TodoId {
        let now = (self.clock)();
        let id = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(id);
        id
    }
}
