//! Counter state load/save with schema + invariant validation.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;
use tracing::debug;

use crate::core::invariants::validate_invariants;
use crate::core::types::CounterState;
use crate::error::{StateLoadError, StateWriteError};
use crate::io::atomic::write_atomic;

const STATE_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/state/v1.schema.json"
));

/// Load and validate the counter state (schema + invariants).
///
/// A missing or malformed file is an error; no default state is substituted.
pub fn load_state(path: &Path) -> Result<CounterState, StateLoadError> {
    debug!(path = %path.display(), "loading counter state");
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => StateLoadError::Missing {
            path: path.to_path_buf(),
        },
        _ => StateLoadError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let value: Value = serde_json::from_str(&contents).map_err(|source| StateLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let violations = schema_violations(&value);
    if !violations.is_empty() {
        return Err(StateLoadError::Schema {
            path: path.to_path_buf(),
            violations,
        });
    }

    let state: CounterState =
        serde_json::from_value(value).map_err(|source| StateLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let violations = validate_invariants(&state);
    if !violations.is_empty() {
        return Err(StateLoadError::Invariants {
            path: path.to_path_buf(),
            violations,
        });
    }

    debug!(
        days_since_lie = state.days_since_lie,
        term_2 = state.term_2,
        recent = state.recent_lies.len(),
        "counter state loaded"
    );
    Ok(state)
}

/// Atomically write the counter state (temp file + rename).
///
/// On failure the temp file is removed and `path` keeps its previous contents.
pub fn write_state(path: &Path, state: &CounterState) -> Result<(), StateWriteError> {
    debug!(
        path = %path.display(),
        days_since_lie = state.days_since_lie,
        term_2 = state.term_2,
        "writing counter state"
    );
    let mut buf = serde_json::to_string_pretty(state).map_err(StateWriteError::Serialize)?;
    buf.push('\n');
    write_atomic(path, &buf).map_err(|err| StateWriteError::Io {
        path: err.path,
        source: err.source,
    })
}

fn schema_violations(value: &Value) -> Vec<String> {
    let schema: Value = match serde_json::from_str(STATE_SCHEMA) {
        Ok(schema) => schema,
        Err(err) => return vec![format!("embedded state schema is invalid json: {err}")],
    };
    let validator: Validator = match jsonschema::validator_for(&schema) {
        Ok(validator) => validator,
        Err(err) => return vec![format!("embedded state schema is invalid: {err}")],
    };
    validator
        .iter_errors(value)
        .map(|err| err.to_string())
        .collect()
}
