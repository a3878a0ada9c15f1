//! Orchestration for a single scheduled `liecounter run`.
//!
//! One run reads the state file once, queries the fact source at most once,
//! applies at most one update, and writes the state and page at most once.
//! Any failure before the state write leaves the persisted state untouched.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::core::counter_update::apply_update;
use crate::core::detect::detect_false_claims;
use crate::core::types::{UpdateKind, UpdateSummary};
use crate::error::{FactSourceError, RunError};
use crate::io::config::{CounterConfig, ResolvedPaths};
use crate::io::fact_source::{FactQuery, FactSource};
use crate::io::page::write_page;
use crate::io::state_store::{load_state, write_state};

/// Inputs for one run.
#[derive(Clone)]
pub struct RunRequest<'a> {
    pub config: &'a CounterConfig,
    pub paths: &'a ResolvedPaths,
    /// API key for the fact source, if one is configured.
    pub api_key: Option<String>,
    pub now: DateTime<Utc>,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub summary: UpdateSummary,
    /// Raw matches returned by the fact source.
    pub matches: usize,
    /// False when the fact source was skipped for lack of a credential.
    pub checked: bool,
}

/// Execute one run: load → fetch → detect → update → persist → render.
#[instrument(skip_all, fields(state = %request.paths.state_path.display()))]
pub fn run_once<S: FactSource>(
    request: &RunRequest<'_>,
    source: &S,
) -> Result<RunOutcome, RunError> {
    let cfg = request.config;
    let prev = load_state(&request.paths.state_path)?;

    let (matches, checked) = match &request.api_key {
        Some(api_key) => {
            let query = FactQuery::from_config(&cfg.fact_source, api_key.clone());
            let matches = source.search(&query).inspect_err(|err| {
                warn!(error = %err, "fact source failed, counter left unchanged");
            })?;
            (matches, true)
        }
        None if cfg.increment_without_credential => {
            warn!(
                env = %cfg.fact_source.api_key_env,
                "no API key configured, counting the day without a check"
            );
            (Vec::new(), false)
        }
        None => {
            return Err(FactSourceError::MissingCredential {
                env: cfg.fact_source.api_key_env.clone(),
            }
            .into());
        }
    };

    let claims = detect_false_claims(&matches, request.now, &cfg.detection_rules());
    let (next, summary) = apply_update(&prev, &claims, cfg.max_recent_claims);

    write_state(&request.paths.state_path, &next)?;
    match summary.kind {
        UpdateKind::Reset => info!(
            new_claims = summary.new_claims,
            term_2 = summary.term_2,
            evicted = summary.evicted,
            "false claims found, counter reset to 0"
        ),
        UpdateKind::Incremented => info!(
            days_since_lie = summary.days_since_lie,
            matches = matches.len(),
            checked,
            "no false claims found, counter incremented"
        ),
    }

    write_page(&request.paths.page_path, &next, request.now.date_naive())
        .map_err(RunError::Render)?;

    Ok(RunOutcome {
        summary,
        matches: matches.len(),
        checked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CounterState;
    use crate::error::StateLoadError;
    use crate::test_support::{ScriptedSource, false_match, fixed_now, state};
    use std::fs;

    struct Fixture {
        _temp: tempfile::TempDir,
        config: CounterConfig,
        paths: ResolvedPaths,
    }

    impl Fixture {
        fn new(initial: &CounterState) -> Self {
            let temp = tempfile::tempdir().expect("tempdir");
            let config = CounterConfig::default();
            let paths = config.resolve_paths(temp.path());
            write_state(&paths.state_path, initial).expect("seed");
            Self {
                _temp: temp,
                config,
                paths,
            }
        }

        fn request(&self, api_key: Option<&str>) -> RunRequest<'_> {
            RunRequest {
                config: &self.config,
                paths: &self.paths,
                api_key: api_key.map(str::to_string),
                now: fixed_now(),
            }
        }

        fn state_bytes(&self) -> String {
            fs::read_to_string(&self.paths.state_path).expect("read state")
        }
    }

    #[test]
    fn no_matches_increments_and_renders() {
        let fixture = Fixture::new(&state(5, 30573, 0, Vec::new()));
        let source = ScriptedSource::answering(Vec::new());

        let outcome = run_once(&fixture.request(Some("key")), &source).expect("run");

        assert_eq!(outcome.summary.kind, UpdateKind::Incremented);
        assert!(outcome.checked);
        let next = load_state(&fixture.paths.state_path).expect("load");
        assert_eq!(next, state(6, 30573, 0, Vec::new()));
        assert!(fixture.paths.page_path.exists());
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn false_claim_resets_counter() {
        let fixture = Fixture::new(&state(5, 30573, 0, Vec::new()));
        let source =
            ScriptedSource::answering(vec![false_match("Big claim", "2026-10-16T08:00:00Z")]);

        let outcome = run_once(&fixture.request(Some("key")), &source).expect("run");

        assert_eq!(outcome.summary.kind, UpdateKind::Reset);
        let next = load_state(&fixture.paths.state_path).expect("load");
        assert_eq!(next.days_since_lie, 0);
        assert_eq!(next.term_2, 1);
        assert_eq!(next.recent_lies[0].claim, "Big claim");
        assert_eq!(next.recent_lies[0].detected.to_string(), "2026-10-16");
    }

    #[test]
    fn stale_matches_count_as_clean_day() {
        let fixture = Fixture::new(&state(1, 30573, 0, Vec::new()));
        let source = ScriptedSource::answering(vec![false_match("Old", "2026-10-10T08:00:00Z")]);

        let outcome = run_once(&fixture.request(Some("key")), &source).expect("run");

        assert_eq!(outcome.matches, 1);
        assert_eq!(outcome.summary.kind, UpdateKind::Incremented);
        assert_eq!(
            load_state(&fixture.paths.state_path).expect("load").days_since_lie,
            2
        );
    }

    #[test]
    fn fact_source_failure_leaves_state_untouched() {
        let fixture = Fixture::new(&state(5, 30573, 0, Vec::new()));
        let before = fixture.state_bytes();
        let source = ScriptedSource::failing();

        let err = run_once(&fixture.request(Some("key")), &source).expect_err("run fails");

        assert!(matches!(err, RunError::FactSource(_)));
        assert_eq!(fixture.state_bytes(), before);
        assert!(!fixture.paths.page_path.exists());
    }

    #[test]
    fn missing_credential_aborts_by_default() {
        let fixture = Fixture::new(&state(5, 30573, 0, Vec::new()));
        let before = fixture.state_bytes();
        let source = ScriptedSource::answering(Vec::new());

        let err = run_once(&fixture.request(None), &source).expect_err("run fails");

        assert!(matches!(
            err,
            RunError::FactSource(FactSourceError::MissingCredential { .. })
        ));
        assert_eq!(fixture.state_bytes(), before);
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn missing_credential_can_count_the_day() {
        let mut fixture = Fixture::new(&state(5, 30573, 0, Vec::new()));
        fixture.config.increment_without_credential = true;
        let source = ScriptedSource::answering(Vec::new());

        let outcome = run_once(&fixture.request(None), &source).expect("run");

        assert!(!outcome.checked);
        assert_eq!(source.calls(), 0);
        assert_eq!(
            load_state(&fixture.paths.state_path).expect("load").days_since_lie,
            6
        );
    }

    #[test]
    fn malformed_state_aborts_before_fetch() {
        let fixture = Fixture::new(&CounterState::seed());
        fs::write(&fixture.paths.state_path, "not json").expect("corrupt");
        let source = ScriptedSource::answering(Vec::new());

        let err = run_once(&fixture.request(Some("key")), &source).expect_err("run fails");

        assert!(matches!(err, RunError::StateLoad(StateLoadError::Parse { .. })));
        assert_eq!(source.calls(), 0);
        assert_eq!(fixture.state_bytes(), "not json");
        assert!(!fixture.paths.page_path.exists());
    }

    #[test]
    fn render_failure_keeps_saved_state() {
        let fixture = Fixture::new(&state(5, 30573, 0, Vec::new()));
        // A directory in place of the page makes the final rename fail.
        fs::create_dir_all(fixture.paths.page_path.join("blocker")).expect("mkdir");
        let source = ScriptedSource::answering(Vec::new());

        let err = run_once(&fixture.request(Some("key")), &source).expect_err("render fails");

        assert!(matches!(err, RunError::Render(_)));
        assert_eq!(
            load_state(&fixture.paths.state_path).expect("load").days_since_lie,
            6
        );
    }
}
