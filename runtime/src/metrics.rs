//! Metric names and descriptions for the Store runtime.
//!
//! Metrics are emitted through the `metrics` facade. Nothing is exported
//! unless the embedding application installs a recorder; without one every
//! call is a no-op.

use metrics::{Unit, describe_counter, describe_histogram};

/// Actions sent to a store.
pub const ACTIONS_TOTAL: &str = "store.actions.total";

/// Time spent inside `Reducer::reduce`.
pub const REDUCER_DURATION_SECONDS: &str = "store.reducer.duration_seconds";

/// State flushes attempted.
pub const PERSIST_TOTAL: &str = "store.persist.total";

/// State flushes that returned an error.
pub const PERSIST_FAILURES: &str = "store.persist.failures";

/// Coalesced `Persist` effects (more than one in a single reduction).
pub const PERSIST_COALESCED: &str = "store.persist.coalesced";

/// Register descriptions for every runtime metric.
///
/// Call once after installing a recorder so exporters can show help text.
pub fn register_metrics() {
    describe_counter!(ACTIONS_TOTAL, "Actions sent to the store");
    describe_histogram!(
        REDUCER_DURATION_SECONDS,
        Unit::Seconds,
        "Time spent reducing a single action"
    );
    describe_counter!(PERSIST_TOTAL, "State flushes attempted");
    describe_counter!(PERSIST_FAILURES, "State flushes that failed");
    describe_counter!(
        PERSIST_COALESCED,
        "Duplicate Persist effects folded into one flush"
    );
}
