//! The link resolution pipeline.
//!
//! Stages, leaves first: tracking-parameter stripping, offline redirector
//! unwrapping, HTTP redirect resolution, the Facebook candidate collector
//! with its heuristic battery, and dedup/ranking. [`resolver::Resolver`] is
//! the orchestrator and the only stage callers invoke directly.

pub mod collector;
pub mod fetch;
pub mod heuristics;
pub mod rank;
pub mod resolver;
pub mod tracking;
pub mod unwrap;

use serde::{Deserialize, Serialize};

/// A target URL extracted by one heuristic, with provenance.
///
/// `rationale` names the front-end and heuristic that produced the URL
/// (e.g. `"m meta-refresh"`). It is diagnostic only; no logic branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub url: String,
    pub rationale: String,
}

impl Candidate {
    pub fn new(url: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            rationale: rationale.into(),
        }
    }
}

/// Outcome of one normalization call.
///
/// `resolved_url` is never empty: on total failure it falls back to the
/// tracking-stripped input. `candidates` is empty unless the Facebook
/// collector path was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub resolved_url: String,
    pub candidates: Vec<Candidate>,
}

pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use resolver::Resolver;
