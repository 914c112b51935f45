//! Translation between the todo collection and a key-value store.
//!
//! The collection is stored as one JSON array under a single key:
//!
//! ```json
//! [{"id": "3f2c…", "todo": "Buy milk", "completed": false}]
//! ```
//!
//! Loading never fails. A missing key, an unreadable medium or a payload that
//! is not an array of records all mean "no saved todos".

use crate::types::{Todo, TodoState};
use tasklist_core::storage::{KeyValueStorage, StatePersistence, StorageError};

/// Key the collection is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Loads and saves full snapshots of the todo collection
#[derive(Debug, Clone)]
pub struct PersistenceBridge<K> {
    storage: K,
    key: String,
}

impl<K: KeyValueStorage> PersistenceBridge<K> {
    /// Bridge over `storage` using [`DEFAULT_STORAGE_KEY`]
    #[must_use]
    pub fn new(storage: K) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Bridge over `storage` using a custom key
    #[must_use]
    pub fn with_key(storage: K, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The key snapshots are stored under
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the saved collection
    ///
    /// Returns an empty list when nothing usable is stored.
    #[must_use]
    pub fn load(&self) -> Vec<Todo> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "No saved todos");
                return Vec::new();
            },
            Err(error) => {
                tracing::warn!(key = %self.key, %error, "Failed to read saved todos, starting empty");
                return Vec::new();
            },
        };

        match serde_json::from_str::<Vec<Todo>>(&raw) {
            Ok(todos) => {
                tracing::debug!(key = %self.key, count = todos.len(), "Loaded todos");
                todos
            },
            Err(error) => {
                tracing::warn!(key = %self.key, %error, "Saved todos are unreadable, starting empty");
                Vec::new()
            },
        }
    }

    /// Overwrite the saved collection with `todos`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the snapshot could not be encoded or written.
    pub fn save(&self, todos: &[Todo]) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(todos).map_err(|e| StorageError::Encoding(e.to_string()))?;
        self.storage.set(&self.key, &raw)?;
        tracing::trace!(key = %self.key, count = todos.len(), "Saved todos");
        Ok(())
    }
}

impl<K: KeyValueStorage> StatePersistence<TodoState> for PersistenceBridge<K> {
    fn persist(&self, state: &TodoState) -> Result<(), StorageError> {
        self.save(state.todos())
    }
}
