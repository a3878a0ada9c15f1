//! Test-only helpers: deterministic claims, states, and scripted fact sources.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reqwest::StatusCode;

use crate::core::detect::DetectionRules;
use crate::core::types::{ClaimRecord, CounterState};
use crate::error::FactSourceError;
use crate::fact_check::{ClaimMatch, ClaimReview, Publisher};
use crate::io::config::{CounterConfig, ResolvedPaths, config_base_dir, write_config};
use crate::io::fact_source::{FactQuery, FactSource};
use crate::io::state_store::write_state;

/// 2026-10-16T12:00:00Z, the "current time" for deterministic tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0)
        .single()
        .expect("valid fixed timestamp")
}

/// Detection rules matching the default config (24h lookback, 1h grace).
pub fn default_rules() -> DetectionRules {
    CounterConfig::default().detection_rules()
}

fn date(raw: &str) -> NaiveDate {
    raw.parse().expect("valid date")
}

/// Claim reviewed 2026-10-15 and detected 2026-10-16.
pub fn claim(text: &str) -> ClaimRecord {
    ClaimRecord {
        claim: text.to_string(),
        source: "PolitiFact".to_string(),
        verdict: "False".to_string(),
        review_date: date("2026-10-15"),
        detected: date("2026-10-16"),
    }
}

/// `count` claims named `{prefix}-0`, `{prefix}-1`, ...
pub fn numbered_claims(prefix: &str, count: usize) -> Vec<ClaimRecord> {
    (0..count).map(|i| claim(&format!("{prefix}-{i}"))).collect()
}

pub fn state(days: u64, term_1: u64, term_2: u64, recent: Vec<ClaimRecord>) -> CounterState {
    CounterState {
        days_since_lie: days,
        term_1,
        term_2,
        recent_lies: recent,
    }
}

/// Raw API match with a single "False" review dated `review_date`.
pub fn false_match(text: &str, review_date: &str) -> ClaimMatch {
    ClaimMatch {
        text: Some(text.to_string()),
        claim_review: vec![ClaimReview {
            publisher: Some(Publisher {
                name: Some("PolitiFact".to_string()),
                site: Some("politifact.com".to_string()),
            }),
            review_date: Some(review_date.to_string()),
            textual_rating: Some("False".to_string()),
            ..ClaimReview::default()
        }],
        ..ClaimMatch::default()
    }
}

/// Fact source that returns a fixed answer and counts calls.
pub struct ScriptedSource {
    answer: Option<Vec<ClaimMatch>>,
    calls: Cell<usize>,
}

impl ScriptedSource {
    pub fn answering(matches: Vec<ClaimMatch>) -> Self {
        Self {
            answer: Some(matches),
            calls: Cell::new(0),
        }
    }

    /// Every call fails with a 503.
    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl FactSource for ScriptedSource {
    fn search(&self, _query: &FactQuery) -> Result<Vec<ClaimMatch>, FactSourceError> {
        self.calls.set(self.calls.get() + 1);
        match &self.answer {
            Some(matches) => Ok(matches.clone()),
            None => Err(FactSourceError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "scripted outage".to_string(),
            }),
        }
    }
}

/// Temporary site directory holding a config file and seeded state.
pub struct TestSite {
    temp: tempfile::TempDir,
    config: CounterConfig,
}

impl TestSite {
    /// Site with the default config written to `liecounter.toml`.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(CounterConfig::default())
    }

    pub fn with_config(config: CounterConfig) -> anyhow::Result<Self> {
        let temp = tempfile::tempdir()?;
        write_config(&temp.path().join("liecounter.toml"), &config)?;
        Ok(Self { temp, config })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("liecounter.toml")
    }

    pub fn paths(&self) -> ResolvedPaths {
        self.config.resolve_paths(&config_base_dir(&self.config_path()))
    }

    pub fn write_state(&self, state: &CounterState) -> anyhow::Result<()> {
        write_state(&self.paths().state_path, state)?;
        Ok(())
    }

    pub fn read_state_raw(&self) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(self.paths().state_path)?)
    }
}
