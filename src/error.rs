//! error.rs — Typed failure taxonomy for the rubric engine.
//!
//! Two hard failure classes exist:
//!   - `ConfigError`: a malformed or inconsistent rubric, rejected at build
//!     time. A tree that builds successfully can never fail on shape later.
//!   - `EvaluateError`: evidence that references vocabulary the rubric does
//!     not know. Fatal for that one evaluation only.
//!
//! Missing evidence is NOT an error anywhere in the engine; it is absorbed by
//! weight renormalization during aggregation. Likewise "insufficient data" in
//! a bias audit is a report state, not an error.

use thiserror::Error;

/// Rejected rubric configuration. Raised by `RubricTree::build` and the
/// file loaders; never raised during evaluation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("node `{0}` declares both children and a scoring table")]
    BothChildrenAndScoring(String),

    #[error("node `{name}` has negative weight {weight}")]
    NegativeWeight { name: String, weight: f64 },

    #[error("category `{0}` has no children")]
    EmptyCategory(String),

    #[error("duplicate node name `{0}`")]
    DuplicateName(String),

    #[error("node `{0}` is neither a category nor a keyword/bucket leaf")]
    UnclassifiableNode(String),

    #[error("leaf `{leaf}` references bucket `{bucket}` with no scoring entry")]
    MissingScoreEntry { leaf: String, bucket: String },

    #[error("keyword leaf `{0}` has no zero-match threshold (absence of evidence must map to a bucket)")]
    MissingDefaultBucket(String),

    #[error("leaf `{leaf}`, bucket `{bucket}`: score {score} outside [0, 1]")]
    ScoreOutOfRange {
        leaf: String,
        bucket: String,
        score: f64,
    },

    #[error("failed to read rubric config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rubric config: {0}")]
    Parse(String),
}

/// Evidence that cannot be interpreted against the rubric. Evidence comes
/// from an external extractor and is treated as untrusted input; anything
/// outside the configured vocabulary is surfaced, never silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluateError {
    #[error("evidence references unknown leaf `{0}`")]
    UnknownLeaf(String),

    #[error("leaf `{leaf}`: bucket label `{label}` is not in the scoring table")]
    UnknownBucket { leaf: String, label: String },

    #[error("leaf `{leaf}`: evidence kind does not match the leaf kind")]
    KindMismatch { leaf: String },

    #[error("experience multiplier applies to `{0}`, which is not a category of the rubric")]
    UnknownMultiplierTarget(String),
}
