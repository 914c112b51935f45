//! # Todo
//!
//! A persistent todo list built on the tasklist reducer architecture.
//!
//! - [`TodoStore`] owns the ordered list and exposes add, update, delete,
//!   toggle and clear-completed.
//! - [`PersistenceBridge`] loads the list at startup and saves a full snapshot
//!   after every change, as one JSON array under a single storage key.
//! - [`FileStorage`] keeps that key in a data directory.
//!
//! ## Example
//!
//! ```no_run
//! use todo::{FileStorage, PersistenceBridge, TodoEnvironment, TodoStore};
//!
//! # async fn run() -> Result<(), tasklist_runtime::StoreError> {
//! let bridge = PersistenceBridge::new(FileStorage::new(".todo"));
//! let store = TodoStore::open(bridge, TodoEnvironment::production());
//!
//! if let Some(todo) = store.add("Buy milk").await? {
//!     store.toggle_complete(&todo.id).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod file_storage;
pub mod persistence;
pub mod reducer;
pub mod store;
pub mod types;

pub use config::Config;
pub use file_storage::FileStorage;
pub use persistence::{DEFAULT_STORAGE_KEY, PersistenceBridge};
pub use reducer::{TodoEnvironment, TodoReducer, UuidGenerator};
pub use store::TodoStore;
pub use types::{
    ParseFilterError, Rejection, Todo, TodoAction, TodoCounts, TodoFilter, TodoId, TodoState,
};
