//! Resolution data model
//!
//! A batch starts as an ordered list of [`Query`] values and ends as one
//! [`ResolutionOutcome`] per query. Failures never escape as errors: every
//! per-query problem becomes [`ResolutionOutcome::Unresolved`] with a reason
//! that stays inspectable for logging.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Normalized search text for one playlist track ("title primary-artist")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Identifier of the first candidate returned by the catalog search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
}

/// Full catalog record for a search hit
///
/// Opaque to the resolver: it is passed through to the caller untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetailRecord(serde_json::Value);

impl DetailRecord {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// Which of the two catalog calls a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStage {
    Search,
    Detail,
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStage::Search => f.write_str("search"),
            LookupStage::Detail => f.write_str("detail"),
        }
    }
}

/// Failure of a single catalog call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{stage} request failed: {message}")]
    Network { stage: LookupStage, message: String },

    #[error("{stage} request timed out")]
    Timeout { stage: LookupStage },

    #[error("{stage} returned HTTP {status}")]
    Status { stage: LookupStage, status: u16 },

    #[error("{stage} response malformed: {message}")]
    Malformed { stage: LookupStage, message: String },
}

impl LookupError {
    pub fn stage(&self) -> LookupStage {
        match self {
            LookupError::Network { stage, .. }
            | LookupError::Timeout { stage }
            | LookupError::Status { stage, .. }
            | LookupError::Malformed { stage, .. } => *stage,
        }
    }
}

/// Why a query produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnresolvedReason {
    #[error("search returned no hits")]
    NoSearchHits,

    #[error("detail lookup returned no record")]
    NoDetailRecord,

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("batch deadline expired before the lookup finished")]
    DeadlineExceeded,

    #[error("batch was cancelled before the lookup finished")]
    Cancelled,

    #[error("lookup task failed: {0}")]
    TaskFailed(String),
}

impl UnresolvedReason {
    /// Catalog stage that failed, for lookup errors
    pub fn stage(&self) -> Option<LookupStage> {
        match self {
            UnresolvedReason::Lookup(err) => Some(err.stage()),
            _ => None,
        }
    }
}

/// Terminal result for one query
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Resolved(DetailRecord),
    Unresolved { reason: UnresolvedReason },
}

impl ResolutionOutcome {
    pub fn unresolved(reason: impl Into<UnresolvedReason>) -> Self {
        ResolutionOutcome::Unresolved {
            reason: reason.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }

    pub fn record(&self) -> Option<&DetailRecord> {
        match self {
            ResolutionOutcome::Resolved(record) => Some(record),
            ResolutionOutcome::Unresolved { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&UnresolvedReason> {
        match self {
            ResolutionOutcome::Resolved(_) => None,
            ResolutionOutcome::Unresolved { reason } => Some(reason),
        }
    }
}

/// Outcome paired with the position of its query in the input
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedOutcome {
    pub index: usize,
    pub query: Query,
    pub outcome: ResolutionOutcome,
}

/// How a batch run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchCompletion {
    /// Every lookup reached a terminal state
    Complete,
    /// The batch deadline expired; outstanding lookups were aborted
    DeadlineExceeded,
    /// The caller cancelled; outstanding lookups were aborted
    Cancelled,
}

/// Outcomes for every query of one request
///
/// Always holds exactly one outcome per input query, sorted by input index.
#[derive(Debug, Clone)]
pub struct ResolutionBatch {
    pub batch_id: Uuid,
    pub outcomes: Vec<IndexedOutcome>,
    pub completion: BatchCompletion,
    pub elapsed: Duration,
}

impl ResolutionBatch {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when the run stopped before every lookup finished
    pub fn is_partial(&self) -> bool {
        self.completion != BatchCompletion::Complete
    }

    pub fn resolved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_resolved()).count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.len() - self.resolved_count()
    }

    /// Resolved records in input order
    pub fn resolved(&self) -> impl Iterator<Item = &DetailRecord> + '_ {
        self.outcomes.iter().filter_map(|o| o.outcome.record())
    }

    pub fn into_resolved(self) -> Vec<DetailRecord> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o.outcome {
                ResolutionOutcome::Resolved(record) => Some(record),
                ResolutionOutcome::Unresolved { .. } => None,
            })
            .collect()
    }
}
