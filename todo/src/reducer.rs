//! Reducer logic for the todo list.
//!
//! Commands are validated, turned into events, and the events are applied to
//! state. Every applied change asks the runtime for exactly one flush; rejected
//! commands leave state and storage untouched.

use crate::types::{Rejection, Todo, TodoAction, TodoId, TodoState};
use std::sync::Arc;
use tasklist_core::{
    SmallVec, effect::Effect, environment::IdGenerator, reducer::Reducer, smallvec,
};
use uuid::Uuid;

/// How many fresh ids `Add` draws before giving up on a colliding generator
pub const MAX_ID_ATTEMPTS: usize = 8;

/// Random UUID v4 ids
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for new todos
    pub ids: Arc<dyn IdGenerator>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// Environment minting random UUIDs
    #[must_use]
    pub fn production() -> Self {
        Self::new(Arc::new(UuidGenerator))
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

type Effects = SmallVec<[Effect<TodoAction>; 4]>;

/// Reducer for the todo list
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Draws ids until one is unused
    fn mint_id(state: &TodoState, env: &TodoEnvironment) -> Option<TodoId> {
        (0..MAX_ID_ATTEMPTS)
            .map(|_| TodoId::new(env.ids.next_id()))
            .find(|id| !state.exists(id))
    }

    fn require(state: &TodoState, id: &TodoId) -> Result<(), Rejection> {
        if state.exists(id) {
            Ok(())
        } else {
            Err(Rejection::NotFound { id: id.clone() })
        }
    }

    /// Applies an event to state, returning whether it touched anything
    ///
    /// Events are idempotent against a state they do not fit: an `Added`
    /// with a taken id, or any per-todo event for an unknown id, is ignored.
    fn apply_event(state: &mut TodoState, event: &TodoAction) -> bool {
        match event {
            TodoAction::Added { todo } => state.push(todo.clone()),
            TodoAction::Updated { id, text } => {
                let Some(todo) = state.get_mut(id) else {
                    return false;
                };
                todo.text.clone_from(text);
                true
            },
            TodoAction::Deleted { id } => state.remove(id).is_some(),
            TodoAction::Toggled { id, completed } => {
                let Some(todo) = state.get_mut(id) else {
                    return false;
                };
                todo.completed = *completed;
                true
            },
            TodoAction::Cleared { ids } => {
                let before = state.count();
                for id in ids {
                    state.remove(id);
                }
                state.count() != before
            },
            // Commands and rejections are not applied to state
            TodoAction::Rejected { .. }
            | TodoAction::Add { .. }
            | TodoAction::Update { .. }
            | TodoAction::Delete { .. }
            | TodoAction::ToggleComplete { .. }
            | TodoAction::ClearCompleted => false,
        }
    }

    /// Applies a validated event, publishes it and requests one flush
    fn commit(state: &mut TodoState, event: TodoAction) -> Effects {
        if Self::apply_event(state, &event) {
            smallvec![Effect::Publish(event), Effect::Persist]
        } else {
            smallvec![Effect::None]
        }
    }

    fn reject(reason: Rejection) -> Effects {
        tracing::debug!(%reason, "Command rejected");
        smallvec![Effect::Publish(TodoAction::Rejected { reason })]
    }

    /// Validation outcome of a command, as the event it produces
    fn decide(
        state: &TodoState,
        command: TodoAction,
        env: &TodoEnvironment,
    ) -> Result<Option<TodoAction>, Rejection> {
        match command {
            TodoAction::Add { text } => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(Rejection::EmptyText);
                }
                let id = Self::mint_id(state, env).ok_or(Rejection::IdUnavailable)?;
                Ok(Some(TodoAction::Added {
                    todo: Todo::new(id, text),
                }))
            },
            TodoAction::Update { id, text } => {
                Self::require(state, &id)?;
                Ok(Some(TodoAction::Updated { id, text }))
            },
            TodoAction::Delete { id } => {
                Self::require(state, &id)?;
                Ok(Some(TodoAction::Deleted { id }))
            },
            TodoAction::ToggleComplete { id } => {
                let todo = state
                    .get(&id)
                    .ok_or_else(|| Rejection::NotFound { id: id.clone() })?;
                let completed = !todo.completed;
                Ok(Some(TodoAction::Toggled { id, completed }))
            },
            TodoAction::ClearCompleted => {
                let ids: Vec<TodoId> = state
                    .todos()
                    .iter()
                    .filter(|todo| todo.completed)
                    .map(|todo| todo.id.clone())
                    .collect();
                Ok((!ids.is_empty()).then_some(TodoAction::Cleared { ids }))
            },
            // Only reached through `reduce`, which routes events elsewhere
            TodoAction::Added { .. }
            | TodoAction::Updated { .. }
            | TodoAction::Deleted { .. }
            | TodoAction::Toggled { .. }
            | TodoAction::Cleared { .. }
            | TodoAction::Rejected { .. } => Ok(None),
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        if action.is_event() {
            // Replayed events: apply, flush if they changed something
            return if Self::apply_event(state, &action) {
                smallvec![Effect::Persist]
            } else {
                smallvec![Effect::None]
            };
        }

        match Self::decide(state, action, env) {
            Ok(Some(event)) => Self::commit(state, event),
            Ok(None) => smallvec![Effect::None],
            Err(reason) => Self::reject(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_testing::{FixedId, ReducerTest, assertions, test_ids};

    fn create_test_env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(test_ids()))
    }

    fn id(raw: &str) -> TodoId {
        TodoId::from(raw)
    }

    fn state_with(items: &[(&str, &str, bool)]) -> TodoState {
        TodoState::from_todos(
            items
                .iter()
                .map(|(raw, text, completed)| Todo {
                    id: id(raw),
                    text: (*text).to_string(),
                    completed: *completed,
                })
                .collect(),
        )
    }

    fn ids_of(state: &TodoState) -> Vec<&str> {
        state.todos().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_add_todo_success() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::add("Buy milk"))
            .then_state(|state| {
                assert_eq!(state.count(), 1);
                let todo = &state.todos()[0];
                assert_eq!(todo.id, id("todo-1"));
                assert_eq!(todo.text, "Buy milk");
                assert!(!todo.completed);
            })
            .then_effects(|effects| {
                assertions::assert_persists_once(effects);
                assertions::assert_published(
                    effects,
                    &TodoAction::Added {
                        todo: Todo::new(id("todo-1"), "Buy milk"),
                    },
                );
            })
            .run();
    }

    #[test]
    fn test_add_appends_at_end() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .given_actions([TodoAction::add("first"), TodoAction::add("second")])
            .when_action(TodoAction::add("third"))
            .then_state(|state| {
                let texts: Vec<_> = state.todos().iter().map(|t| t.text.as_str()).collect();
                assert_eq!(texts, vec!["first", "second", "third"]);
            })
            .run();
    }

    #[test]
    fn test_add_trims_text() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::add("  Walk dog \n"))
            .then_state(|state| assert_eq!(state.todos()[0].text, "Walk dog"))
            .run();
    }

    #[test]
    fn test_add_blank_text_is_noop() {
        for blank in ["", "   ", "\t\n"] {
            ReducerTest::new(TodoReducer::new())
                .with_env(create_test_env())
                .given_state(state_with(&[("a", "existing", false)]))
                .when_action(TodoAction::add(blank))
                .then_state(|state| {
                    assert_eq!(*state, state_with(&[("a", "existing", false)]));
                })
                .then_effects(|effects| {
                    assertions::assert_no_persist(effects);
                    assertions::assert_published(
                        effects,
                        &TodoAction::Rejected {
                            reason: Rejection::EmptyText,
                        },
                    );
                })
                .run();
        }
    }

    #[test]
    fn test_add_skips_ids_already_taken() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("todo-1", "loaded", false), ("todo-2", "loaded", false)]))
            .when_action(TodoAction::add("fresh"))
            .then_state(|state| {
                assert_eq!(ids_of(state), vec!["todo-1", "todo-2", "todo-3"]);
            })
            .run();
    }

    #[test]
    fn test_add_gives_up_on_colliding_generator() {
        ReducerTest::new(TodoReducer::new())
            .with_env(TodoEnvironment::new(Arc::new(FixedId("same".to_string()))))
            .given_state(TodoState::new())
            .given_actions([TodoAction::add("first")])
            .when_action(TodoAction::add("second"))
            .then_state(|state| assert_eq!(state.count(), 1))
            .then_effects(|effects| {
                assertions::assert_no_persist(effects);
                assertions::assert_published(
                    effects,
                    &TodoAction::Rejected {
                        reason: Rejection::IdUnavailable,
                    },
                );
            })
            .run();
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .given_actions([
                TodoAction::add("one"),
                TodoAction::add("two"),
                TodoAction::Delete { id: id("todo-2") },
            ])
            .when_action(TodoAction::add("three"))
            .then_state(|state| assert_eq!(ids_of(state), vec!["todo-1", "todo-3"]))
            .run();
    }

    #[test]
    fn test_update_existing() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "old", true), ("b", "other", false)]))
            .when_action(TodoAction::update(id("a"), "New text"))
            .then_state(|state| {
                assert_eq!(
                    *state,
                    state_with(&[("a", "New text", true), ("b", "other", false)])
                );
            })
            .then_effects(assertions::assert_persists_once)
            .run();
    }

    #[test]
    fn test_update_missing_is_rejected() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "old", false)]))
            .when_action(TodoAction::update(id("zzz"), "x"))
            .then_state(|state| assert_eq!(*state, state_with(&[("a", "old", false)])))
            .then_effects(|effects| {
                assertions::assert_no_persist(effects);
                assertions::assert_published(
                    effects,
                    &TodoAction::Rejected {
                        reason: Rejection::NotFound { id: id("zzz") },
                    },
                );
            })
            .run();
    }

    #[test]
    fn test_update_does_not_validate_text() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "old", false)]))
            .when_action(TodoAction::update(id("a"), "  "))
            .then_state(|state| assert_eq!(state.todos()[0].text, "  "))
            .then_effects(assertions::assert_persists_once)
            .run();
    }

    #[test]
    fn test_delete_preserves_order() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "1", false), ("b", "2", false), ("c", "3", false)]))
            .when_action(TodoAction::Delete { id: id("b") })
            .then_state(|state| assert_eq!(ids_of(state), vec!["a", "c"]))
            .then_effects(|effects| {
                assertions::assert_persists_once(effects);
                assertions::assert_published(effects, &TodoAction::Deleted { id: id("b") });
            })
            .run();
    }

    #[test]
    fn test_delete_twice_is_rejected() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "1", false)]))
            .given_actions([TodoAction::Delete { id: id("a") }])
            .when_action(TodoAction::Delete { id: id("a") })
            .then_state(|state| assert_eq!(state.count(), 0))
            .then_effects(assertions::assert_no_persist)
            .run();
    }

    #[test]
    fn test_toggle_flips_completed() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "1", false)]))
            .when_action(TodoAction::ToggleComplete { id: id("a") })
            .then_state(|state| assert!(state.todos()[0].completed))
            .then_effects(|effects| {
                assertions::assert_persists_once(effects);
                assertions::assert_published(
                    effects,
                    &TodoAction::Toggled {
                        id: id("a"),
                        completed: true,
                    },
                );
            })
            .run();
    }

    #[test]
    fn test_toggle_twice_restores() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "1", true)]))
            .given_actions([TodoAction::ToggleComplete { id: id("a") }])
            .when_action(TodoAction::ToggleComplete { id: id("a") })
            .then_state(|state| assert_eq!(*state, state_with(&[("a", "1", true)])))
            .run();
    }

    #[test]
    fn test_toggle_missing_is_rejected() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::ToggleComplete { id: id("a") })
            .then_effects(assertions::assert_no_persist)
            .run();
    }

    #[test]
    fn test_clear_completed_removes_all_completed_once() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "1", true), ("b", "2", false), ("c", "3", true)]))
            .when_action(TodoAction::ClearCompleted)
            .then_state(|state| assert_eq!(ids_of(state), vec!["b"]))
            .then_effects(|effects| {
                assertions::assert_persists_once(effects);
                assertions::assert_published(
                    effects,
                    &TodoAction::Cleared {
                        ids: vec![id("a"), id("c")],
                    },
                );
            })
            .run();
    }

    #[test]
    fn test_clear_completed_with_nothing_completed_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "1", false)]))
            .when_action(TodoAction::ClearCompleted)
            .then_state(|state| assert_eq!(state.count(), 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_replayed_event_is_applied_and_persisted() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::Added {
                todo: Todo::new(id("x"), "Replayed"),
            })
            .then_state(|state| assert!(state.exists(&id("x"))))
            .then_effects(|effects| {
                assertions::assert_persists_once(effects);
                assert!(assertions::published(effects).is_empty());
            })
            .run();
    }

    #[test]
    fn test_replayed_event_for_unknown_id_is_ignored() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "1", false)]))
            .when_action(TodoAction::Toggled {
                id: id("zzz"),
                completed: true,
            })
            .then_state(|state| assert_eq!(*state, state_with(&[("a", "1", false)])))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_replayed_duplicate_add_is_ignored() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(&[("a", "1", false)]))
            .when_action(TodoAction::Added {
                todo: Todo::new(id("a"), "dup"),
            })
            .then_state(|state| assert_eq!(state.todos()[0].text, "1"))
            .then_effects(assertions::assert_no_persist)
            .run();
    }
}
