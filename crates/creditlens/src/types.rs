//! Core domain types and the error taxonomy for the retrieval layer.

use std::path::PathBuf;

use serde::Serialize;

/// A loan-applicant identifier as issued by the scoring service.
pub type ClientId = i64;

/// Classification of a model feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Categorical,
    Numeric,
    /// Not present in either classified set of the catalog.
    Unknown,
}

/// Display-size hint for a bivariate analysis image.
///
/// Mixed-type pairings (one categorical, one numeric) render wider in the
/// dashboard, everything else uses the normal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutHint {
    Normal,
    Large,
}

/// Filter applied to the feature-selection list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionFilter {
    /// Features of the current loan application.
    #[default]
    Current,
    /// Features of previous loans.
    Previous,
    /// Every feature.
    All,
}

impl SelectionFilter {
    /// Wire value for the `filter` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            SelectionFilter::Current => "current",
            SelectionFilter::Previous => "previous",
            SelectionFilter::All => "all",
        }
    }
}

/// Score at or above which a credit application is refused.
pub const REFUSAL_THRESHOLD: f64 = 0.5;

/// Outcome of a scored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreVerdict {
    Accepted,
    Refused,
}

impl ScoreVerdict {
    /// Apply the refusal threshold to a raw model score.
    pub fn from_score(score: f64) -> Self {
        if score >= REFUSAL_THRESHOLD {
            ScoreVerdict::Refused
        } else {
            ScoreVerdict::Accepted
        }
    }
}

/// What the fetcher hands back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactHandle {
    /// Path to a fully-written artifact in the local store.
    Image(PathBuf),
    /// Live gauge scalar, never persisted.
    Score(f64),
}

impl ArtifactHandle {
    /// Image path, if this handle is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ArtifactHandle::Image(p) => Some(p),
            ArtifactHandle::Score(_) => None,
        }
    }
}

/// Errors that can occur in the retrieval layer.
#[derive(thiserror::Error, Debug)]
pub enum CreditError {
    /// Remote call exceeded its time bound.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection-level failure before any response was received.
    #[error("scoring service unreachable: {0}")]
    Unreachable(String),

    /// Non-success status from the scoring service.
    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },

    /// Cache-store read miss. Callers check `exists` first, so hitting this
    /// is a programming error rather than a user-facing condition.
    #[error("artifact not found in store: {0}")]
    NotFound(String),

    /// Feature name absent from the loaded catalog.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// Request parameter rejected before any network call.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The `/feature_lists` payload violated the catalog invariants.
    #[error("inconsistent feature catalog: {0}")]
    Catalog(String),

    /// Malformed JSON payload from a scalar endpoint.
    #[error("malformed response payload: {0}")]
    Json(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type CreditResult<T> = Result<T, CreditError>;
