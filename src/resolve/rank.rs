//! Candidate dedup and ranking.
//!
//! A pure pass over the collector output: exact-URL dedup keeping the
//! first occurrence's rationale, then a stable ascending sort by the score
//! policy so ties keep discovery order.

use std::collections::HashSet;

use crate::config::ScorePolicy;
use crate::resolve::Candidate;

/// Deduplicate by exact URL (first-seen rationale wins) and sort ascending
/// by specificity score.
pub fn dedup_and_rank(candidates: Vec<Candidate>, policy: &ScorePolicy) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut out: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| !c.url.is_empty() && seen.insert(c.url.clone()))
        .collect();
    out.sort_by_key(|c| policy.score(&c.url));
    out
}
