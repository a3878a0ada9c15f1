//! Shared deterministic types for the counter core.
//!
//! These types mirror the persisted state file one-to-one. They carry no I/O
//! and serialize to a stable field order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound on `recent_lies` in the persisted file.
pub const MAX_RECENT_CLAIMS: usize = 10;

/// Historical total carried in `term_1` when the state file is seeded.
pub const TERM_1_SEED: u64 = 30_573;

/// One detected false claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimRecord {
    /// Claim text as reported by the fact source.
    pub claim: String,
    /// Publisher of the review.
    pub source: String,
    /// Textual rating given by the reviewer (e.g. "False").
    pub verdict: String,
    /// Calendar date of the review, in the publisher's offset.
    pub review_date: NaiveDate,
    /// Date of the run that detected this claim.
    pub detected: NaiveDate,
}

/// Persisted counter state (`data.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CounterState {
    /// Consecutive runs with no detected false claim.
    pub days_since_lie: u64,
    /// Frozen historical total. Never incremented by a run.
    pub term_1: u64,
    /// Running total for the current term.
    pub term_2: u64,
    /// Most-recent-first, bounded by [`MAX_RECENT_CLAIMS`].
    pub recent_lies: Vec<ClaimRecord>,
}

impl CounterState {
    /// State written by `liecounter init`.
    pub fn seed() -> Self {
        Self {
            days_since_lie: 0,
            term_1: TERM_1_SEED,
            term_2: 0,
            recent_lies: Vec::new(),
        }
    }

    pub fn term(&self, term: Term) -> u64 {
        match term {
            Term::First => self.term_1,
            Term::Second => self.term_2,
        }
    }

    /// Term counters in display order.
    pub fn terms(&self) -> [(Term, u64); 2] {
        [Term::First, Term::Second].map(|term| (term, self.term(term)))
    }

    /// Sum of all term counters.
    pub fn total(&self) -> u64 {
        self.term_1.saturating_add(self.term_2)
    }
}

/// Period identifiers for the term counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    First,
    Second,
}

impl Term {
    /// Key used in the persisted file.
    pub const fn key(self) -> &'static str {
        match self {
            Self::First => "term_1",
            Self::Second => "term_2",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "First term",
            Self::Second => "Second term",
        }
    }
}

/// Which rule the update procedure applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// No new claims: `days_since_lie` went up by one.
    Incremented,
    /// At least one new claim: `days_since_lie` reset to zero.
    Reset,
}

/// Summary of a single counter update, for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    pub kind: UpdateKind,
    /// Number of claims merged into the state.
    pub new_claims: usize,
    pub days_since_lie: u64,
    pub term_2: u64,
    /// Entries dropped from `recent_lies` to respect the bound.
    pub evicted: usize,
}
