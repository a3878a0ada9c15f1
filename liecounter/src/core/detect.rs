//! Selection of false-verdict reviews inside the lookback window.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::core::types::ClaimRecord;
use crate::fact_check::ClaimMatch;

const UNKNOWN_CLAIM: &str = "Unknown claim";
const UNKNOWN_SOURCE: &str = "Unknown source";
const UNKNOWN_VERDICT: &str = "Unknown";

/// Rules applied to raw fact-source matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRules {
    /// How far back a review may be dated and still count for this run.
    pub lookback: TimeDelta,
    /// Extra slack subtracted from the cutoff to absorb clock skew.
    pub grace: TimeDelta,
    /// Lowercase substrings of a textual rating that mark a claim as false.
    pub false_terms: Vec<String>,
}

impl DetectionRules {
    pub fn new(lookback: TimeDelta, grace: TimeDelta, false_terms: &[String]) -> Self {
        Self {
            lookback,
            grace,
            false_terms: false_terms
                .iter()
                .map(|term| term.trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        }
    }

    /// Earliest review timestamp that still counts as new.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.lookback - self.grace
    }

    /// True if the rating contains any false term (case-insensitive).
    pub fn is_false_rating(&self, rating: &str) -> bool {
        let rating = rating.to_lowercase();
        self.false_terms.iter().any(|term| rating.contains(term.as_str()))
    }
}

/// Turn raw matches into claim records for the current run.
///
/// Every review that is dated on or after the cutoff and carries a false rating
/// yields one record, so a claim reviewed false by two publishers counts twice.
/// Reviews without a parseable date are skipped; reviews dated after `now` are
/// kept. Output is newest review first, stable for equal timestamps.
pub fn detect_false_claims(
    matches: &[ClaimMatch],
    now: DateTime<Utc>,
    rules: &DetectionRules,
) -> Vec<ClaimRecord> {
    let cutoff = rules.cutoff(now);
    let detected = now.date_naive();

    let mut found: Vec<(DateTime<Utc>, ClaimRecord)> = Vec::new();
    for claim in matches {
        for review in &claim.claim_review {
            let Some((reviewed_at, review_date)) =
                review.review_date.as_deref().and_then(parse_review_date)
            else {
                continue;
            };
            if reviewed_at < cutoff {
                continue;
            }
            let rating = review.textual_rating.as_deref().unwrap_or_default();
            if !rules.is_false_rating(rating) {
                continue;
            }
            let record = ClaimRecord {
                claim: non_empty_or(claim.text.as_deref(), UNKNOWN_CLAIM),
                source: non_empty_or(
                    review.publisher.as_ref().and_then(|p| p.name.as_deref()),
                    UNKNOWN_SOURCE,
                ),
                verdict: non_empty_or(review.textual_rating.as_deref(), UNKNOWN_VERDICT),
                review_date,
                detected,
            };
            found.push((reviewed_at, record));
        }
    }

    found.sort_by(|a, b| b.0.cmp(&a.0));
    found.into_iter().map(|(_, record)| record).collect()
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date as midnight UTC.
///
/// Returns the instant used for the window check and the calendar date in the
/// publisher's own offset, which is what gets stored.
fn parse_review_date(raw: &str) -> Option<(DateTime<Utc>, NaiveDate)> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some((parsed.with_timezone(&Utc), parsed.date_naive()));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
    Some((midnight, date))
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}
