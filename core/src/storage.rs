//! Durable key-value storage contract.
//!
//! State is flushed as a single string value under a fixed key, the same
//! shape as browser local storage. Encoding (JSON) is the caller's concern;
//! backends only move strings.
//!
//! # Implementations
//!
//! - `FileStorage` (in the `todo` crate): one file per key in a data directory
//! - `InMemoryStorage` (in `tasklist-testing`): fast, deterministic testing
//!
//! # Example
//!
//! ```no_run
//! use tasklist_core::storage::{KeyValueStorage, StorageError};
//!
//! fn example<K: KeyValueStorage>(storage: &K) -> Result<(), StorageError> {
//!     storage.set("todos", "[]")?;
//!     assert_eq!(storage.get("todos")?.as_deref(), Some("[]"));
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Reading or writing the underlying medium failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The key cannot be stored by this backend.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The medium refused the operation (quota exceeded, read-only, gone).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The value could not be encoded for storage.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// String key-value storage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the runtime calls them from
/// whichever task holds the state lock.
///
/// Operations are synchronous: the medium is local, and a write must be
/// complete before the mutation that triggered it is reported back.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be read. A missing key is
    /// `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value could not be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Returns whether a value was present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be modified.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

impl<K: KeyValueStorage + ?Sized> KeyValueStorage for Arc<K> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        (**self).remove(key)
    }
}

/// Writes a full snapshot of some state to durable storage.
///
/// The runtime executes [`Effect::Persist`](crate::effect::Effect::Persist)
/// through this trait.
pub trait StatePersistence<S>: Send + Sync {
    /// Persist `state`, overwriting the previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the snapshot could not be written.
    fn persist(&self, state: &S) -> Result<(), StorageError>;
}
