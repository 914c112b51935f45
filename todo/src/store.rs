//! The todo list capability handed to the view layer.
//!
//! [`TodoStore`] wraps the runtime store and speaks in plain values: the
//! created todo, whether an id was found, how many todos were cleared. A
//! `StoreError` is only ever a failed flush, and the mutation it reports has
//! already been applied in memory.

use crate::persistence::PersistenceBridge;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{Todo, TodoAction, TodoCounts, TodoFilter, TodoId, TodoState};
use std::sync::Arc;
use tasklist_core::storage::KeyValueStorage;
use tasklist_runtime::{Dispatch, Store, StoreError};
use tokio::sync::broadcast;

type Inner = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Owner of the todo collection
///
/// Cheap to clone; clones share the same list.
#[derive(Clone)]
pub struct TodoStore {
    inner: Inner,
}

impl TodoStore {
    /// A store over `initial` that never saves
    #[must_use]
    pub fn in_memory(initial: TodoState, env: TodoEnvironment) -> Self {
        Self {
            inner: Store::new(initial, TodoReducer::new(), env),
        }
    }

    /// Load the saved list through `bridge` and save every change back to it
    #[must_use]
    pub fn open<K>(bridge: PersistenceBridge<K>, env: TodoEnvironment) -> Self
    where
        K: KeyValueStorage + 'static,
    {
        let initial = TodoState::from_todos(bridge.load());
        tracing::info!(key = bridge.key(), count = initial.count(), "Opened todo list");

        Self {
            inner: Store::new(initial, TodoReducer::new(), env)
                .with_persistence(Arc::new(bridge)),
        }
    }

    /// Size the change notification buffer. Call before [`subscribe`](Self::subscribe).
    #[must_use]
    pub fn with_broadcast_capacity(self, capacity: usize) -> Self {
        Self {
            inner: self.inner.with_broadcast_capacity(capacity),
        }
    }

    /// Append a todo with `text` trimmed
    ///
    /// Returns `None` without saving when `text` is blank.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the todo was added but could not be saved.
    pub async fn add(&self, text: &str) -> Result<Option<Todo>, StoreError> {
        let dispatch = self.inner.send(TodoAction::add(text)).await?;
        Ok(dispatch
            .into_published()
            .into_iter()
            .find_map(|action| match action {
                TodoAction::Added { todo } => Some(todo),
                _ => None,
            }))
    }

    /// Replace the text of todo `id`. Returns `false` if there is no such todo.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the edit was applied but could not be saved.
    pub async fn update(&self, id: &TodoId, text: &str) -> Result<bool, StoreError> {
        self.apply(TodoAction::update(id.clone(), text)).await
    }

    /// Remove todo `id`. Returns `false` if there is no such todo.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the todo was removed but the removal could
    /// not be saved.
    pub async fn delete(&self, id: &TodoId) -> Result<bool, StoreError> {
        self.apply(TodoAction::Delete { id: id.clone() }).await
    }

    /// Flip the completed flag of todo `id`. Returns `false` if there is no such todo.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the flag was flipped but could not be saved.
    pub async fn toggle_complete(&self, id: &TodoId) -> Result<bool, StoreError> {
        self.apply(TodoAction::ToggleComplete { id: id.clone() }).await
    }

    /// Remove every completed todo in one change. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the todos were removed but the removal could
    /// not be saved.
    pub async fn clear_completed(&self) -> Result<usize, StoreError> {
        let dispatch = self.inner.send(TodoAction::ClearCompleted).await?;
        Ok(dispatch
            .published()
            .iter()
            .map(|action| match action {
                TodoAction::Cleared { ids } => ids.len(),
                _ => 0,
            })
            .sum())
    }

    async fn apply(&self, command: TodoAction) -> Result<bool, StoreError> {
        let dispatch: Dispatch<TodoAction> = self.inner.send(command).await?;
        Ok(dispatch.published().iter().any(TodoAction::is_change))
    }

    /// A copy of every todo, in insertion order
    pub async fn snapshot(&self) -> Vec<Todo> {
        self.inner.state(TodoState::snapshot).await
    }

    /// Alias of [`snapshot`](Self::snapshot)
    pub async fn todos(&self) -> Vec<Todo> {
        self.snapshot().await
    }

    /// Todos visible under `filter`
    pub async fn filtered(&self, filter: TodoFilter) -> Vec<Todo> {
        self.inner.state(|state| state.filtered(filter)).await
    }

    /// Total, active and completed counts
    pub async fn counts(&self) -> TodoCounts {
        self.inner.state(TodoState::counts).await
    }

    /// A copy of todo `id`
    pub async fn get(&self, id: &TodoId) -> Option<Todo> {
        self.inner.state(|state| state.get(id).cloned()).await
    }

    /// Events published after each command, rejections included
    ///
    /// A receiver that falls behind gets `RecvError::Lagged` and should
    /// re-read [`snapshot`](Self::snapshot).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TodoAction> {
        self.inner.subscribe()
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore").finish_non_exhaustive()
    }
}
