//! # Tasklist Runtime
//!
//! Runtime implementation for the tasklist reducer architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, runs the reducer, executes effects
//! - **Persistence hook**: `Effect::Persist` flushes the state through a
//!   registered [`StatePersistence`](tasklist_core::storage::StatePersistence)
//! - **Change notifications**: published actions are broadcast to subscribers
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment)
//!     .with_persistence(Arc::new(bridge));
//!
//! // Send an action; the flush has happened by the time this returns
//! let dispatch = store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use tasklist_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Metric names emitted by the Store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use tasklist_core::storage::StorageError;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Flushing state to durable storage failed.
        ///
        /// The reducer has already applied the action: in-memory state
        /// reflects the mutation, durable storage holds the previous snapshot.
        #[error("Failed to persist state: {0}")]
        Persistence(#[from] StorageError),
    }
}

pub use error::StoreError;
pub use store::{Dispatch, Store};

/// Store module - The runtime coordinator
pub mod store {
    use super::{Arc, Effect, Reducer, RwLock, StoreError};
    use crate::metrics as names;
    use tasklist_core::storage::StatePersistence;
    use tokio::sync::broadcast;

    /// Default capacity of the change notification channel
    pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

    /// Result of a single [`Store::send`]
    ///
    /// Carries the actions the reducer published, in order, and whether the
    /// state was flushed to storage.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Dispatch<A> {
        published: Vec<A>,
        persisted: bool,
    }

    impl<A> Dispatch<A> {
        /// Actions published by the reducer
        #[must_use]
        pub fn published(&self) -> &[A] {
            &self.published
        }

        /// Consume the dispatch, returning the published actions
        #[must_use]
        pub fn into_published(self) -> Vec<A> {
            self.published
        }

        /// Whether a flush to storage happened for this action
        #[must_use]
        pub const fn persisted(&self) -> bool {
            self.persisted
        }
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution: persistence flushes and change notifications
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        persistence: Option<Arc<dyn StatePersistence<S>>>,
        /// Every action published by the reducer is broadcast here after
        /// the state lock is released.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The store starts without persistence: `Effect::Persist` is
        /// accepted and skipped until [`with_persistence`](Self::with_persistence)
        /// registers a target.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (action_broadcast, _) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                persistence: None,
                action_broadcast,
            }
        }

        /// Register where `Effect::Persist` flushes state to
        #[must_use]
        pub fn with_persistence(mut self, persistence: Arc<dyn StatePersistence<S>>) -> Self {
            self.persistence = Some(persistence);
            self
        }

        /// Replace the change notification channel with one of `capacity`
        ///
        /// A capacity of zero is raised to one. Existing subscribers keep
        /// listening on the old channel, so call this before subscribing.
        #[must_use]
        pub fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));
            self.action_broadcast = action_broadcast;
            self
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the state write lock
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Flushes state once if the reducer returned `Effect::Persist`
        /// 4. Releases the lock and broadcasts published actions
        ///
        /// Concurrent sends serialize on the write lock, which is held across
        /// the flush: storage always sees snapshots in mutation order.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Persistence`] if the flush failed. The action
        /// has still been applied and its published actions broadcast.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<Dispatch<A>, StoreError> {
            metrics::counter!(names::ACTIONS_TOTAL).increment(1);

            let (published, flushed) = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                metrics::histogram!(names::REDUCER_DURATION_SECONDS)
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());

                let mut published = Vec::new();
                let mut persist_requests = 0_usize;
                for effect in effects {
                    match effect {
                        Effect::None => {}
                        Effect::Publish(action) => published.push(action),
                        Effect::Persist => persist_requests += 1,
                    }
                }

                if persist_requests > 1 {
                    metrics::counter!(names::PERSIST_COALESCED)
                        .increment((persist_requests - 1) as u64);
                }

                let flushed = if persist_requests > 0 {
                    self.flush(&state)
                } else {
                    Ok(false)
                };

                (published, flushed)
            };

            if !published.is_empty() && self.action_broadcast.receiver_count() > 0 {
                for action in &published {
                    // Only fails when every receiver was dropped in between
                    let _ = self.action_broadcast.send(action.clone());
                }
            }

            let persisted = flushed?;
            tracing::debug!(published = published.len(), persisted, "Action processed");

            Ok(Dispatch {
                published,
                persisted,
            })
        }

        /// Write `state` through the registered persistence, if any
        fn flush(&self, state: &S) -> Result<bool, StoreError> {
            let Some(persistence) = &self.persistence else {
                tracing::trace!("No persistence registered, skipping flush");
                return Ok(false);
            };

            metrics::counter!(names::PERSIST_TOTAL).increment(1);
            match persistence.persist(state) {
                Ok(()) => Ok(true),
                Err(error) => {
                    metrics::counter!(names::PERSIST_FAILURES).increment(1);
                    tracing::error!(%error, "Failed to persist state");
                    Err(StoreError::Persistence(error))
                },
            }
        }

        /// Subscribe to actions published by the reducer
        ///
        /// This is the "state changed" notification channel: every published
        /// action arrives after its mutation (and flush) completed.
        ///
        /// # Notes
        ///
        /// - Only published actions are broadcast, not the actions passed to `send`
        /// - A receiver that lags skips old actions and gets `RecvError::Lagged`;
        ///   re-read state through [`state`](Self::state) to resynchronize
        #[must_use]
        pub fn subscribe(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// Access state through a closure to ensure the lock is released promptly:
        ///
        /// ```ignore
        /// let todo_count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                persistence: self.persistence.clone(),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}
