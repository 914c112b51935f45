//! # Tasklist Core
//!
//! Core traits and types for the tasklist reducer architecture.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state owned by a single store
//! - **Action**: All possible inputs to a reducer (commands and the events they produce)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//! - **Storage**: The durable key-value contract state is flushed to
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! impl Reducer for TodoReducer {
//!     type State = TodoState;
//!     type Action = TodoAction;
//!     type Environment = TodoEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TodoState,
//!         action: TodoAction,
//!         env: &TodoEnvironment,
//!     ) -> SmallVec<[Effect<TodoAction>; 4]> {
//!         // Validate, mutate, then describe what the runtime should do next
//!         smallvec![Effect::Publish(event), Effect::Persist]
//!     }
//! }
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Durable key-value storage contract
pub mod storage;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// A reducer must return [`Effect::Persist`] if and only if it changed
        /// state, so the runtime flushes exactly once per mutation.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution), so reducers stay pure and tests can
/// assert on exactly what a reducer asked for.
pub mod effect {
    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Notify observers that an action was applied.
        ///
        /// The runtime returns published actions to the sender and broadcasts
        /// them to every subscriber.
        Publish(Action),

        /// Flush the full current state to durable storage.
        ///
        /// Runs while the state lock is still held, so flushes happen in
        /// mutation order. Several `Persist` effects from one reduction are
        /// coalesced into a single write.
        Persist,
    }

    impl<Action> Effect<Action> {
        /// Returns `true` for [`Effect::Persist`]
        #[must_use]
        pub const fn is_persist(&self) -> bool {
            matches!(self, Self::Persist)
        }

        /// Returns the published action, if this is [`Effect::Publish`]
        #[must_use]
        pub const fn published(&self) -> Option<&Action> {
            match self {
                Self::Publish(action) => Some(action),
                Self::None | Self::Persist => None,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All non-deterministic inputs are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    /// Id generator - abstracts identifier minting for testability
    ///
    /// Implementations must never hand out the same id twice within a
    /// process. Deriving ids from the current contents of a collection
    /// (e.g. "max + 1") does not satisfy this once records are deleted.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - random UUIDs
    /// struct UuidGenerator;
    /// impl IdGenerator for UuidGenerator {
    ///     fn next_id(&self) -> String {
    ///         Uuid::new_v4().to_string()
    ///     }
    /// }
    ///
    /// // Test - predictable ids for readable assertions
    /// let ids = SequentialIds::new("todo");
    /// assert_eq!(ids.next_id(), "todo-1");
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Mint a fresh identifier
        fn next_id(&self) -> String;
    }
}
