//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of short text items. Insertion order
//! is the display order; ids are opaque strings minted once and never reused.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for a todo item
///
/// Serialized as a JSON string. Numeric ids written by older front-ends
/// (e.g. millisecond timestamps) are accepted on load and normalized to
/// their decimal form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps an existing identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StoredId {
            Text(String),
            Number(u64),
        }

        Ok(match StoredId::deserialize(deserializer)? {
            StoredId::Text(id) => Self(id),
            StoredId::Number(id) => Self(id.to_string()),
        })
    }
}

/// A single todo item
///
/// The text field is stored under the name `todo`:
/// `{"id": "...", "todo": "Buy milk", "completed": false}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// What needs doing
    #[serde(rename = "todo")]
    pub text: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl Todo {
    /// Creates a new, not yet completed todo
    #[must_use]
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// Which todos a view shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TodoFilter {
    /// Every todo
    #[default]
    All,
    /// Todos not yet completed
    Active,
    /// Completed todos
    Completed,
}

impl TodoFilter {
    /// Whether `todo` is visible under this filter
    #[must_use]
    pub const fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

/// Unknown filter name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown filter {0:?} (expected all, active or completed)")]
pub struct ParseFilterError(String);

impl FromStr for TodoFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

impl fmt::Display for TodoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        })
    }
}

/// Summary counts for a todo list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TodoCounts {
    /// All todos
    pub total: usize,
    /// Todos not yet completed
    pub active: usize,
    /// Completed todos
    pub completed: usize,
}

/// State of the todo list
///
/// Todos are kept in insertion order. Ids are pairwise distinct: every
/// constructor and mutation preserves that, which is why the collection is
/// only reachable through read accessors outside this crate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    todos: Vec<Todo>,
}

impl TodoState {
    /// Creates a new empty todo state
    #[must_use]
    pub const fn new() -> Self {
        Self { todos: Vec::new() }
    }

    /// Builds state from previously saved todos
    ///
    /// Keeps the saved order. A todo with blank text, or whose id already
    /// appeared earlier in the list, is dropped.
    #[must_use]
    pub fn from_todos(todos: Vec<Todo>) -> Self {
        let mut state = Self::new();
        for todo in todos {
            if todo.text.trim().is_empty() {
                tracing::warn!(id = %todo.id, "Dropping saved todo with blank text");
                continue;
            }
            if state.exists(&todo.id) {
                tracing::warn!(id = %todo.id, "Dropping saved todo with duplicate id");
                continue;
            }
            state.todos.push(todo);
        }
        state
    }

    /// All todos, in insertion order
    #[must_use]
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// A copy of all todos for read-only consumers
    #[must_use]
    pub fn snapshot(&self) -> Vec<Todo> {
        self.todos.clone()
    }

    /// Todos visible under `filter`, in insertion order
    #[must_use]
    pub fn filtered(&self, filter: TodoFilter) -> Vec<Todo> {
        self.todos
            .iter()
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect()
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Returns the number of todos still to do
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.count() - self.completed_count()
    }

    /// Total, active and completed counts
    #[must_use]
    pub fn counts(&self) -> TodoCounts {
        let completed = self.completed_count();
        TodoCounts {
            total: self.count(),
            active: self.count() - completed,
            completed,
        }
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| &t.id == id)
    }

    /// Position of a todo in the list
    #[must_use]
    pub fn position(&self, id: &TodoId) -> Option<usize> {
        self.todos.iter().position(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.position(id).is_some()
    }

    pub(crate) fn get_mut(&mut self, id: &TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| &t.id == id)
    }

    /// Appends `todo` unless its id is taken
    pub(crate) fn push(&mut self, todo: Todo) -> bool {
        if self.exists(&todo.id) {
            return false;
        }
        self.todos.push(todo);
        true
    }

    /// Removes a todo, keeping the order of the rest
    pub(crate) fn remove(&mut self, id: &TodoId) -> Option<Todo> {
        let index = self.position(id)?;
        Some(self.todos.remove(index))
    }
}

/// Why a command changed nothing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The submitted text was empty after trimming
    EmptyText,
    /// No todo has this id
    NotFound {
        /// The id that was looked up
        id: TodoId,
    },
    /// The id generator kept returning ids already in use
    IdUnavailable,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => f.write_str("todo text cannot be empty"),
            Self::NotFound { id } => write!(f, "todo {id} not found"),
            Self::IdUnavailable => f.write_str("could not mint an unused todo id"),
        }
    }
}

/// Actions representing commands and events for todos
///
/// Commands come from the view layer and are validated by the reducer.
/// Events describe what changed; they are published to subscribers and can
/// be replayed into a state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Append a new todo
    Add {
        /// Submitted text, trimmed before storing
        text: String,
    },

    /// Command: Replace a todo's text
    Update {
        /// Todo to edit
        id: TodoId,
        /// New text, stored as given
        text: String,
    },

    /// Command: Remove a todo
    Delete {
        /// Todo to remove
        id: TodoId,
    },

    /// Command: Flip a todo's completed flag
    ToggleComplete {
        /// Todo to toggle
        id: TodoId,
    },

    /// Command: Remove every completed todo
    ClearCompleted,

    // ========== Events ==========
    /// Event: A todo was appended
    Added {
        /// The new todo
        todo: Todo,
    },

    /// Event: A todo's text was replaced
    Updated {
        /// Todo identifier
        id: TodoId,
        /// Its new text
        text: String,
    },

    /// Event: A todo was removed
    Deleted {
        /// Todo identifier
        id: TodoId,
    },

    /// Event: A todo's completed flag changed
    Toggled {
        /// Todo identifier
        id: TodoId,
        /// The flag's new value
        completed: bool,
    },

    /// Event: Completed todos were removed
    Cleared {
        /// Ids removed, in list order
        ids: Vec<TodoId>,
    },

    /// Event: A command was rejected and changed nothing
    Rejected {
        /// Why
        reason: Rejection,
    },
}

impl TodoAction {
    /// `Add` command
    #[must_use]
    pub fn add(text: impl Into<String>) -> Self {
        Self::Add { text: text.into() }
    }

    /// `Update` command
    #[must_use]
    pub fn update(id: TodoId, text: impl Into<String>) -> Self {
        Self::Update {
            id,
            text: text.into(),
        }
    }

    /// Returns `true` for commands
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::Add { .. }
                | Self::Update { .. }
                | Self::Delete { .. }
                | Self::ToggleComplete { .. }
                | Self::ClearCompleted
        )
    }

    /// Returns `true` for events
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }

    /// Returns `true` for events that changed the list
    #[must_use]
    pub const fn is_change(&self) -> bool {
        self.is_event() && !matches!(self, Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: &str, text: &str, completed: bool) -> Todo {
        Todo {
            id: TodoId::from(id),
            text: text.to_string(),
            completed,
        }
    }

    #[test]
    fn todo_id_display() {
        assert_eq!(TodoId::from("abc").to_string(), "abc");
    }

    #[test]
    fn todo_new_is_not_completed() {
        let item = Todo::new(TodoId::from("1"), "Test todo");

        assert_eq!(item.id, TodoId::from("1"));
        assert_eq!(item.text, "Test todo");
        assert!(!item.completed);
    }

    #[test]
    fn todo_serializes_text_as_todo_field() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(todo("a1", "Buy milk", true))?;
        assert_eq!(
            json,
            serde_json::json!({"id": "a1", "todo": "Buy milk", "completed": true})
        );
        Ok(())
    }

    #[test]
    fn numeric_ids_are_accepted() -> Result<(), serde_json::Error> {
        let item: Todo =
            serde_json::from_str(r#"{"id": 1700000000000, "todo": "Old", "completed": false}"#)?;
        assert_eq!(item.id, TodoId::from("1700000000000"));
        Ok(())
    }

    #[test]
    fn from_todos_keeps_first_duplicate() {
        let state = TodoState::from_todos(vec![
            todo("a", "first", false),
            todo("b", "second", false),
            todo("a", "again", true),
        ]);

        assert_eq!(state.count(), 2);
        assert_eq!(state.get(&TodoId::from("a")).map(|t| t.text.as_str()), Some("first"));
        assert_eq!(state.position(&TodoId::from("b")), Some(1));
    }

    #[test]
    fn from_todos_drops_blank_text() {
        let state = TodoState::from_todos(vec![
            todo("a", "", false),
            todo("b", "keep", false),
            todo("c", " \t ", true),
        ]);

        assert_eq!(state.count(), 1);
        assert!(state.exists(&TodoId::from("b")));
    }

    #[test]
    fn todo_state_counts() {
        let state = TodoState::from_todos(vec![
            todo("a", "one", true),
            todo("b", "two", false),
            todo("c", "three", false),
        ]);

        assert_eq!(
            state.counts(),
            TodoCounts {
                total: 3,
                active: 2,
                completed: 1
            }
        );
        assert_eq!(state.active_count(), 2);
        assert_eq!(TodoState::new().counts(), TodoCounts::default());
    }

    #[test]
    fn filtered_keeps_order() {
        let state = TodoState::from_todos(vec![
            todo("a", "one", true),
            todo("b", "two", false),
            todo("c", "three", true),
        ]);

        let done: Vec<_> = state
            .filtered(TodoFilter::Completed)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(done, vec![TodoId::from("a"), TodoId::from("c")]);
        assert_eq!(state.filtered(TodoFilter::Active).len(), 1);
        assert_eq!(state.filtered(TodoFilter::All), state.snapshot());
    }

    #[test]
    fn remove_preserves_order() {
        let mut state = TodoState::from_todos(vec![
            todo("a", "one", false),
            todo("b", "two", false),
            todo("c", "three", false),
        ]);

        assert!(state.remove(&TodoId::from("b")).is_some());
        assert!(state.remove(&TodoId::from("b")).is_none());
        let ids: Vec<_> = state.todos().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn push_refuses_taken_id() {
        let mut state = TodoState::new();
        assert!(state.push(todo("a", "one", false)));
        assert!(!state.push(todo("a", "two", false)));
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn filter_parses_names() {
        assert_eq!("all".parse(), Ok(TodoFilter::All));
        assert_eq!(" Active ".parse(), Ok(TodoFilter::Active));
        assert_eq!("done".parse(), Ok(TodoFilter::Completed));
        assert!("someday".parse::<TodoFilter>().is_err());
        assert_eq!(TodoFilter::Completed.to_string(), "completed");
    }

    #[test]
    fn todo_action_kinds() {
        assert!(TodoAction::add("Test").is_command());
        assert!(!TodoAction::add("Test").is_event());

        let added = TodoAction::Added {
            todo: todo("a", "Test", false),
        };
        assert!(added.is_event());
        assert!(added.is_change());

        let rejected = TodoAction::Rejected {
            reason: Rejection::EmptyText,
        };
        assert!(rejected.is_event());
        assert!(!rejected.is_change());
    }
}
