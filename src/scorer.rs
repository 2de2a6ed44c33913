//! scorer.rs — Scores one leaf criterion against its evidence.
//!
//! Keyword leaves: count the matched keywords that are actually configured,
//! pick the most demanding satisfied count threshold (an entry may also
//! require the evidence's intensity indicator), and look its bucket up in the
//! scoring table. Zero matches fall through to the mandatory zero-count
//! bucket — absence of signal is a valid low score, never an error.
//!
//! Bucket leaves: direct table lookup of the evidence label. A label missing
//! from the table is `UnknownBucket`; "no evidence" must be modeled as an
//! explicit bucket such as "none".

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::EvaluateError;
use crate::evidence::LeafEvidence;
use crate::rubric::{normalize, RubricNode};

/// Which bucket/keywords drove a leaf score. Required input to the
/// explanation builder; the aggregator carries it through the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rationale {
    /// Bucket label the scoring table was entered with.
    pub bucket: String,
    /// Configured keywords that matched (empty for bucket leaves).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched: Vec<String>,
    /// One-line human-readable summary.
    pub summary: String,
}

/// Score a single leaf. Caller guarantees `node` is a leaf and `evidence`
/// has already passed `Evidence::validate`, so the only failure left is a
/// bucket label outside the scoring table.
pub fn score_leaf(
    node: &RubricNode,
    evidence: &LeafEvidence,
) -> Result<(f64, Rationale), EvaluateError> {
    match (node, evidence) {
        (
            RubricNode::KeywordLeaf {
                name,
                keywords,
                thresholds,
                scoring,
                ..
            },
            LeafEvidence::Keywords { matched, indicator },
        ) => {
            // Distinct configured keywords only; extractors may over-report.
            let hits: BTreeSet<String> = matched
                .iter()
                .map(|m| normalize(m))
                .filter(|m| keywords.contains(m))
                .collect();
            let indicator = indicator.as_deref().map(normalize);

            let threshold = thresholds
                .iter()
                .find(|t| {
                    hits.len() >= t.min_matches
                        && match &t.requires_indicator {
                            Some(required) => indicator.as_deref() == Some(required.as_str()),
                            None => true,
                        }
                })
                .ok_or_else(|| EvaluateError::UnknownBucket {
                    // Unreachable for a built tree (zero-count floor is
                    // enforced at build time), but surfaced rather than
                    // panicking if a tree was constructed by hand.
                    leaf: name.clone(),
                    label: format!("{} matches", hits.len()),
                })?;

            let score = *scoring.get(&threshold.bucket).ok_or_else(|| {
                EvaluateError::UnknownBucket {
                    leaf: name.clone(),
                    label: threshold.bucket.clone(),
                }
            })?;

            let matched: Vec<String> = hits.into_iter().collect();
            let summary = format!(
                "{}/{} keywords matched -> {}",
                matched.len(),
                keywords.len(),
                threshold.bucket
            );
            Ok((
                score,
                Rationale {
                    bucket: threshold.bucket.clone(),
                    matched,
                    summary,
                },
            ))
        }
        (
            RubricNode::BucketLeaf { name, scoring, .. },
            LeafEvidence::Bucket { label },
        ) => {
            let score = *scoring
                .get(label)
                .ok_or_else(|| EvaluateError::UnknownBucket {
                    leaf: name.clone(),
                    label: label.clone(),
                })?;
            Ok((
                score,
                Rationale {
                    bucket: label.clone(),
                    matched: Vec::new(),
                    summary: format!("bucket `{label}`"),
                },
            ))
        }
        (node, _) => Err(EvaluateError::KindMismatch {
            leaf: node.name().to_string(),
        }),
    }
}
