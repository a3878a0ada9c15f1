//! Orchestration for `liecounter validate`.

use crate::core::types::CounterState;
use crate::error::StateLoadError;
use crate::io::config::ResolvedPaths;
use crate::io::state_store::load_state;

/// One-line description of a valid state, printed by `liecounter validate`.
pub fn describe(state: &CounterState) -> String {
    format!(
        "ok: days_since_lie={} term_1={} term_2={} recent_lies={}",
        state.days_since_lie,
        state.term_1,
        state.term_2,
        state.recent_lies.len()
    )
}

/// Load the state file with full schema and invariant checks.
pub fn validate_state(paths: &ResolvedPaths) -> Result<CounterState, StateLoadError> {
    load_state(&paths.state_path)
}
