// src/lib.rs
// Public library surface for integration tests (and reuse by API layers).
//
// Hierarchical weighted rubric scoring: a validated, immutable rubric tree is
// evaluated against per-leaf evidence into a composite score with a full
// per-node breakdown; batches of composites are audited for group-level
// selection-rate disparity (four-fifths rule). Everything here is pure and
// synchronous — document parsing, profile crawling, LLM extraction and the
// serving layer live outside this crate and talk to it through `RubricConfig`,
// `Evidence` and the serializable outputs.

pub mod aggregate;
pub mod bias;
pub mod error;
pub mod evidence;
pub mod experience;
pub mod explain;
pub mod insights;
pub mod rubric;
pub mod scorer;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{evaluate, Evaluation, ScoreBreakdown};
pub use crate::bias::{BiasAudit, BiasReport, GroupScoreRecord, DEFAULT_FAIRNESS_THRESHOLD};
pub use crate::error::{ConfigError, EvaluateError};
pub use crate::evidence::{Evidence, LeafEvidence};
pub use crate::experience::ExperienceMultiplier;
pub use crate::explain::{build_explanation, ExplanationRow};
pub use crate::insights::{scoring_insights, ScoringInsights, Tier};
pub use crate::rubric::{RubricConfig, RubricNode, RubricTree};
pub use crate::scorer::Rationale;
