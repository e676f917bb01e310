//! Store metrics.
//!
//! The Store records through the [`metrics`] facade. No exporter is installed
//! by this crate; a host that wants the numbers installs a recorder and calls
//! [`describe_metrics`] once at startup.
//!
//! # Example
//!
//! ```rust,no_run
//! tasklist_runtime::metrics::describe_metrics();
//! ```

use metrics::{Unit, describe_counter, describe_histogram};

/// Metric names used by the Store
pub mod names {
    /// Actions accepted by `Store::send`
    pub const COMMANDS_TOTAL: &str = "store.commands.total";
    /// Reducer execution time
    pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";
    /// Effects returned per reduced action
    pub const EFFECTS_COUNT: &str = "store.effects.count";
    /// Effects executed, labelled by `type`
    pub const EFFECTS_EXECUTED: &str = "store.effects.executed";
    /// Delayed actions dropped because shutdown started first
    pub const EFFECTS_CANCELLED: &str = "store.effects.cancelled";
    /// Shutdowns started
    pub const SHUTDOWN_INITIATED: &str = "store.shutdown.initiated";
    /// Shutdowns that drained every effect
    pub const SHUTDOWN_COMPLETED: &str = "store.shutdown.completed";
    /// Shutdowns that gave up waiting
    pub const SHUTDOWN_TIMEOUT: &str = "store.shutdown.timeout";
    /// Actions rejected because the store was shutting down
    pub const SHUTDOWN_REJECTED: &str = "store.shutdown.rejected_actions";
}

/// Register descriptions for every Store metric with the installed recorder
pub fn describe_metrics() {
    describe_counter!(
        names::COMMANDS_TOTAL,
        Unit::Count,
        "Actions accepted by the store"
    );
    describe_histogram!(
        names::REDUCER_DURATION,
        Unit::Seconds,
        "Time spent inside the reducer per action"
    );
    describe_histogram!(
        names::EFFECTS_COUNT,
        Unit::Count,
        "Effects returned by the reducer per action"
    );
    describe_counter!(
        names::EFFECTS_EXECUTED,
        Unit::Count,
        "Effects executed by type"
    );
    describe_counter!(
        names::EFFECTS_CANCELLED,
        Unit::Count,
        "Delayed actions cancelled by shutdown"
    );
    describe_counter!(names::SHUTDOWN_INITIATED, "Graceful shutdowns started");
    describe_counter!(names::SHUTDOWN_COMPLETED, "Graceful shutdowns completed");
    describe_counter!(names::SHUTDOWN_TIMEOUT, "Graceful shutdowns that timed out");
    describe_counter!(
        names::SHUTDOWN_REJECTED,
        Unit::Count,
        "Actions rejected during shutdown"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_namespaced() {
        for name in [
            names::COMMANDS_TOTAL,
            names::REDUCER_DURATION,
            names::EFFECTS_COUNT,
            names::EFFECTS_EXECUTED,
            names::EFFECTS_CANCELLED,
            names::SHUTDOWN_INITIATED,
            names::SHUTDOWN_COMPLETED,
            names::SHUTDOWN_TIMEOUT,
            names::SHUTDOWN_REJECTED,
        ] {
            assert!(name.starts_with("store."), "{name}");
        }
    }

    #[test]
    fn describe_without_recorder_is_noop() {
        describe_metrics();
    }
}
