//! # Tasklist Testing
//!
//! Testing utilities and helpers for the tasklist reducer architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment and storage traits
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Assertion helpers for effects
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_testing::{InMemoryStorage, SequentialIds};
//!
//! #[tokio::test]
//! async fn test_add_persists() {
//!     let storage = Arc::new(InMemoryStorage::new());
//!     let store = TodoStore::open(PersistenceBridge::new(storage.clone()), env);
//!
//!     store.add("Buy milk").await?;
//!
//!     assert_eq!(storage.write_count(), 1);
//! }
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tasklist_core::environment::IdGenerator;
use tasklist_core::storage::{KeyValueStorage, StorageError};


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use super::{
        AtomicBool, AtomicU64, AtomicUsize, HashMap, IdGenerator, KeyValueStorage, Mutex,
        Ordering, StorageError,
    };

    /// In-memory key-value storage
    ///
    /// Behaves like browser local storage: string values under string keys.
    /// Counts successful writes so tests can assert "exactly one flush per
    /// mutation", and can be switched into a failing mode to simulate a full
    /// or unavailable medium.
    ///
    /// # Example
    ///
    /// ```
    /// use tasklist_testing::mocks::InMemoryStorage;
    /// use tasklist_core::storage::KeyValueStorage;
    ///
    /// let storage = InMemoryStorage::new();
    /// storage.set("todos", "[]").unwrap();
    /// assert_eq!(storage.write_count(), 1);
    ///
    /// storage.fail_writes(true);
    /// assert!(storage.set("todos", "[]").is_err());
    /// assert_eq!(storage.write_count(), 1);
    /// ```
    #[derive(Debug, Default)]
    pub struct InMemoryStorage {
        entries: Mutex<HashMap<String, String>>,
        writes: AtomicUsize,
        fail_writes: AtomicBool,
    }

    impl InMemoryStorage {
        /// Create an empty storage
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a storage pre-populated with `value` under `key`
        #[must_use]
        pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
            let storage = Self::new();
            if let Ok(mut entries) = storage.entries.lock() {
                entries.insert(key.into(), value.into());
            }
            storage
        }

        /// Make subsequent `set`/`remove` calls fail (or succeed again)
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Number of successful `set` calls so far
        #[must_use]
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        /// Raw value stored under `key`
        #[must_use]
        pub fn raw(&self, key: &str) -> Option<String> {
            self.entries
                .lock()
                .ok()
                .and_then(|entries| entries.get(key).cloned())
        }

        fn check_writable(&self) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable(
                    "storage quota exceeded".to_string(),
                ));
            }
            Ok(())
        }

        fn poisoned() -> StorageError {
            StorageError::Io("in-memory storage lock poisoned".to_string())
        }
    }

    impl KeyValueStorage for InMemoryStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            let entries = self.entries.lock().map_err(|_| Self::poisoned())?;
            Ok(entries.get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.check_writable()?;
            let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
            entries.insert(key.to_string(), value.to_string());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<bool, StorageError> {
            self.check_writable()?;
            let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
            Ok(entries.remove(key).is_some())
        }
    }

    /// Predictable id generator: `"{prefix}-1"`, `"{prefix}-2"`, ...
    ///
    /// # Example
    ///
    /// ```
    /// use tasklist_testing::mocks::SequentialIds;
    /// use tasklist_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIds::new("todo");
    /// assert_eq!(ids.next_id(), "todo-1");
    /// assert_eq!(ids.next_id(), "todo-2");
    /// ```
    #[derive(Debug)]
    pub struct SequentialIds {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Create a generator whose first id is `"{prefix}-1"`
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self::starting_at(prefix, 1)
        }

        /// Create a generator whose first id is `"{prefix}-{first}"`
        #[must_use]
        pub fn starting_at(prefix: impl Into<String>, first: u64) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(first),
            }
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            format!("{}-{n}", self.prefix)
        }
    }

    /// Id generator that always returns the same id
    ///
    /// Useful for exercising collision handling in reducers.
    #[derive(Debug, Clone)]
    pub struct FixedId(pub String);

    impl IdGenerator for FixedId {
        fn next_id(&self) -> String {
            self.0.clone()
        }
    }

    /// Sequential ids prefixed with `"todo"` for tests
    #[must_use]
    pub fn test_ids() -> SequentialIds {
        SequentialIds::new("todo")
    }
}

/// Property-based testing strategies using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Text a user could submit that survives trimming
    pub fn todo_text() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 ,.!?'-]{0,40}"
    }

    /// Submissions that are empty after trimming
    pub fn blank_text() -> impl Strategy<Value = String> {
        "[ \t\n]{0,8}"
    }

    /// Any submission: mostly real text, sometimes blank
    pub fn submitted_text() -> impl Strategy<Value = String> {
        prop_oneof![4 => todo_text(), 1 => blank_text()]
    }

    /// Index into a collection that may or may not exist yet
    ///
    /// Operations pick `index % (len + 1)`, so `len` itself stands for an
    /// id that is not in the collection.
    pub fn target_index() -> impl Strategy<Value = usize> {
        0_usize..64
    }
}

// Re-export commonly used items
pub use mocks::{FixedId, InMemoryStorage, SequentialIds, test_ids};
