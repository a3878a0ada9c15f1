//! Job configuration stored in `liecounter.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::core::detect::DetectionRules;
use crate::core::types::MAX_RECENT_CLAIMS;
use crate::io::atomic::write_atomic;

pub const DEFAULT_CONFIG_FILE: &str = "liecounter.toml";
const MAX_GRACE_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_ENDPOINT: &str = "https://factchecktools.googleapis.com/v1alpha1/claims:search";

/// Job configuration (TOML).
///
/// Edited by humans and read by the scheduled run. Missing fields default to
/// the values the job has always used. Relative paths resolve against the
/// directory holding the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CounterConfig {
    /// Counter state file.
    pub state_path: PathBuf,

    /// Static page regenerated after every successful update.
    pub page_path: PathBuf,

    /// Bound on `recent_lies` (at most 10).
    pub max_recent_claims: usize,

    /// Count the day as clean when no API key is configured instead of failing.
    pub increment_without_credential: bool,

    pub fact_source: FactSourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FactSourceConfig {
    pub endpoint: String,
    pub query: String,
    pub language_code: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    /// Reviews older than this are not new for the current run.
    pub lookback_hours: u32,
    /// Slack added to the lookback window for clock skew.
    pub grace_secs: u64,
    /// Rating substrings (case-insensitive) that mark a claim as false.
    pub false_rating_terms: Vec<String>,
}

impl Default for FactSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            query: "Donald Trump".to_string(),
            language_code: "en".to_string(),
            api_key_env: "GOOGLE_FACT_CHECK_API_KEY".to_string(),
            timeout_secs: 30,
            page_size: 100,
            lookback_hours: 24,
            grace_secs: 60 * 60,
            false_rating_terms: ["false", "pants on fire", "lie", "incorrect", "wrong"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("data.json"),
            page_path: PathBuf::from("index.html"),
            max_recent_claims: MAX_RECENT_CLAIMS,
            increment_without_credential: false,
            fact_source: FactSourceConfig::default(),
        }
    }
}

/// State and page locations after resolving against the config directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub state_path: PathBuf,
    pub page_path: PathBuf,
}

impl CounterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_recent_claims == 0 || self.max_recent_claims > MAX_RECENT_CLAIMS {
            return Err(anyhow!(
                "max_recent_claims must be between 1 and {}",
                MAX_RECENT_CLAIMS
            ));
        }
        if self.state_path.as_os_str().is_empty() {
            return Err(anyhow!("state_path must not be empty"));
        }
        if self.page_path.as_os_str().is_empty() {
            return Err(anyhow!("page_path must not be empty"));
        }
        let source = &self.fact_source;
        if source.endpoint.trim().is_empty() {
            return Err(anyhow!("fact_source.endpoint must not be empty"));
        }
        if source.query.trim().is_empty() {
            return Err(anyhow!("fact_source.query must not be empty"));
        }
        if source.api_key_env.trim().is_empty() {
            return Err(anyhow!("fact_source.api_key_env must not be empty"));
        }
        if source.timeout_secs == 0 {
            return Err(anyhow!("fact_source.timeout_secs must be > 0"));
        }
        if source.page_size == 0 {
            return Err(anyhow!("fact_source.page_size must be > 0"));
        }
        if source.lookback_hours == 0 {
            return Err(anyhow!("fact_source.lookback_hours must be > 0"));
        }
        if source.grace_secs > MAX_GRACE_SECS {
            return Err(anyhow!("fact_source.grace_secs must be <= {}", MAX_GRACE_SECS));
        }
        if source.false_rating_terms.iter().all(|t| t.trim().is_empty()) {
            return Err(anyhow!(
                "fact_source.false_rating_terms must contain a non-empty term"
            ));
        }
        Ok(())
    }

    /// Resolve relative paths against `base_dir`.
    pub fn resolve_paths(&self, base_dir: &Path) -> ResolvedPaths {
        ResolvedPaths {
            state_path: base_dir.join(&self.state_path),
            page_path: base_dir.join(&self.page_path),
        }
    }

    pub fn detection_rules(&self) -> DetectionRules {
        let source = &self.fact_source;
        DetectionRules::new(
            TimeDelta::hours(i64::from(source.lookback_hours)),
            TimeDelta::seconds(i64::try_from(source.grace_secs.min(MAX_GRACE_SECS)).unwrap_or(0)),
            &source.false_rating_terms,
        )
    }
}

impl FactSourceConfig {
    /// `maxAgeDays` sent with the query: the lookback window rounded up to whole days.
    pub fn max_age_days(&self) -> u32 {
        self.lookback_hours.div_ceil(24)
    }
}

/// Directory that relative config paths resolve against.
pub fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CounterConfig::default()`.
pub fn load_config(path: &Path) -> Result<CounterConfig> {
    if !path.exists() {
        let cfg = CounterConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CounterConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &CounterConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf).with_context(|| format!("write config {}", path.display()))
}
