//! evidence.rs — Per-evaluation input: pre-extracted signal keyed by leaf name.
//!
//! Evidence is produced outside the engine (by an LLM-assisted or rule-based
//! extractor working over a candidate profile) and is treated as untrusted
//! input: `validate` checks every referenced leaf name and bucket/indicator
//! label against the rubric's vocabulary before any scoring happens.
//! A leaf with no evidence entry at all is fine — the aggregator excludes it
//! from its parent's weight denominator rather than scoring it as zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EvaluateError;
use crate::rubric::{normalize, RubricNode, RubricTree};

/// Signal for one leaf. The variant must match the leaf kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeafEvidence {
    /// Keyword leaf: the subset of configured keywords found present, plus an
    /// optional intensity indicator label (e.g. "impact", "production").
    Keywords {
        #[serde(default)]
        matched: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        indicator: Option<String>,
    },
    /// Bucket leaf: the matched bucket label (e.g. "5-8 years"). Absence of
    /// evidence is modeled as an explicit bucket such as "none", not as a
    /// missing entry.
    Bucket { label: String },
}

/// Everything known about one candidate for one evaluation. Supplied
/// wholesale per request and never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub per_leaf: BTreeMap<String, LeafEvidence>,
    /// Seniority bucket consumed by the experience multiplier (e.g. "senior").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seniority: Option<String>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds keyword evidence for a leaf (builder style).
    pub fn with_keywords(mut self, leaf: impl Into<String>, matched: &[&str]) -> Self {
        self.per_leaf.insert(
            leaf.into(),
            LeafEvidence::Keywords {
                matched: matched.iter().map(|m| m.to_string()).collect(),
                indicator: None,
            },
        );
        self
    }

    /// Adds keyword evidence with an intensity indicator.
    pub fn with_keywords_indicator(
        mut self,
        leaf: impl Into<String>,
        matched: &[&str],
        indicator: impl Into<String>,
    ) -> Self {
        self.per_leaf.insert(
            leaf.into(),
            LeafEvidence::Keywords {
                matched: matched.iter().map(|m| m.to_string()).collect(),
                indicator: Some(indicator.into()),
            },
        );
        self
    }

    /// Adds bucket evidence for a leaf.
    pub fn with_bucket(mut self, leaf: impl Into<String>, label: impl Into<String>) -> Self {
        self.per_leaf
            .insert(leaf.into(), LeafEvidence::Bucket { label: label.into() });
        self
    }

    /// Sets the seniority bucket for the experience multiplier.
    pub fn with_seniority(mut self, label: impl Into<String>) -> Self {
        self.seniority = Some(label.into());
        self
    }

    pub fn for_leaf(&self, name: &str) -> Option<&LeafEvidence> {
        self.per_leaf.get(name)
    }

    /// Validate against the rubric vocabulary. Every evidence key must name a
    /// known leaf of the matching kind; bucket and indicator labels must be
    /// in the leaf's tables. Matched keywords outside the configured list are
    /// tolerated here (extractors over-report) and simply not counted.
    pub fn validate(&self, tree: &RubricTree) -> Result<(), EvaluateError> {
        for (name, evidence) in &self.per_leaf {
            let node = tree
                .find_leaf(name)
                .ok_or_else(|| EvaluateError::UnknownLeaf(name.clone()))?;

            match (node, evidence) {
                (
                    RubricNode::KeywordLeaf { indicators, .. },
                    LeafEvidence::Keywords { indicator, .. },
                ) => {
                    if let Some(label) = indicator {
                        if !indicators.contains(&normalize(label)) {
                            return Err(EvaluateError::UnknownBucket {
                                leaf: name.clone(),
                                label: label.clone(),
                            });
                        }
                    }
                }
                (RubricNode::BucketLeaf { scoring, .. }, LeafEvidence::Bucket { label }) => {
                    if !scoring.contains_key(label) {
                        return Err(EvaluateError::UnknownBucket {
                            leaf: name.clone(),
                            label: label.clone(),
                        });
                    }
                }
                _ => {
                    return Err(EvaluateError::KindMismatch { leaf: name.clone() });
                }
            }
        }
        Ok(())
    }
}
