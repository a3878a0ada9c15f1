//! Semantic invariants not expressible via JSON Schema.

use crate::core::types::{CounterState, MAX_RECENT_CLAIMS};

/// Check semantic invariants of a loaded state:
/// - `recent_lies` holds at most [`MAX_RECENT_CLAIMS`] entries
/// - claim, source and verdict are non-blank
///
/// `term_2` is not compared with `recent_lies`: carried-over history may list
/// claims the current term never counted.
pub fn validate_invariants(state: &CounterState) -> Vec<String> {
    let mut errors = Vec::new();

    if state.recent_lies.len() > MAX_RECENT_CLAIMS {
        errors.push(format!(
            "recent_lies has {} entries, max is {}",
            state.recent_lies.len(),
            MAX_RECENT_CLAIMS
        ));
    }

    for (idx, record) in state.recent_lies.iter().enumerate() {
        for (field, value) in [
            ("claim", &record.claim),
            ("source", &record.source),
            ("verdict", &record.verdict),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("recent_lies[{}]: {} must not be blank", idx, field));
            }
        }
    }

    errors
}
