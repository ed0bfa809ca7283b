//! Metric descriptions for the Store runtime.
//!
//! The Store records through the `metrics` facade. Nothing is exported
//! unless the embedding application installs a recorder; calling
//! [`describe_store_metrics`] once after installing one attaches units and
//! help text.

use ::metrics::{describe_counter, describe_histogram, Unit};

/// Names of the metrics recorded by [`crate::Store`].
pub mod names {
    /// Actions reduced, including fed-back actions
    pub const COMMANDS_TOTAL: &str = "store.commands.total";
    /// Wall time spent inside the reducer
    pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";
    /// Effects executed, labelled by `type`
    pub const EFFECTS_EXECUTED: &str = "store.effects.executed";
}

/// Register descriptions for every Store metric with the installed recorder.
pub fn describe_store_metrics() {
    describe_counter!(
        names::COMMANDS_TOTAL,
        Unit::Count,
        "Actions reduced by the store, including fed-back actions"
    );
    describe_histogram!(
        names::REDUCER_DURATION,
        Unit::Seconds,
        "Time spent executing the reducer for one action"
    );
    describe_counter!(
        names::EFFECTS_EXECUTED,
        Unit::Count,
        "Effects executed by the store, by effect type"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describing_without_recorder_is_noop() {
        describe_store_metrics();
        describe_store_metrics();
    }
}
