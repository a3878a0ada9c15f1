//! Counter state transition for a single run.

use crate::core::types::{ClaimRecord, CounterState, UpdateKind, UpdateSummary};

/// Compute the next counter state from `prev` and the claims detected this run.
///
/// - No new claims: `days_since_lie` increments by one, everything else is carried.
/// - Any new claims: `days_since_lie` resets to zero, `term_2` grows by the number
///   of claims, and the claims are prepended (in the order given) to `recent_lies`,
///   which is then truncated to `limit`.
///
/// `term_1` is always carried forward. Claims are not deduplicated against
/// `recent_lies`. Calling this twice with the same claims counts them twice.
pub fn apply_update(
    prev: &CounterState,
    new_claims: &[ClaimRecord],
    limit: usize,
) -> (CounterState, UpdateSummary) {
    if new_claims.is_empty() {
        let next = CounterState {
            days_since_lie: prev.days_since_lie.saturating_add(1),
            ..prev.clone()
        };
        let summary = UpdateSummary {
            kind: UpdateKind::Incremented,
            new_claims: 0,
            days_since_lie: next.days_since_lie,
            term_2: next.term_2,
            evicted: 0,
        };
        return (next, summary);
    }

    let added = u64::try_from(new_claims.len()).unwrap_or(u64::MAX);
    let mut recent_lies = Vec::with_capacity(new_claims.len() + prev.recent_lies.len());
    recent_lies.extend_from_slice(new_claims);
    recent_lies.extend_from_slice(&prev.recent_lies);
    let evicted = recent_lies.len().saturating_sub(limit);
    recent_lies.truncate(limit);

    let next = CounterState {
        days_since_lie: 0,
        term_1: prev.term_1,
        term_2: prev.term_2.saturating_add(added),
        recent_lies,
    };
    let summary = UpdateSummary {
        kind: UpdateKind::Reset,
        new_claims: new_claims.len(),
        days_since_lie: next.days_since_lie,
        term_2: next.term_2,
        evicted,
    };
    (next, summary)
}
