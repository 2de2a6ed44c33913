//! # Aggregator
//! Pure, post-order recursion that maps `(tree, evidence)` → a full
//! per-node breakdown plus the composite score. No I/O, no clock, no
//! randomness: identical inputs yield bit-identical output.
//!
//! The central policy is weight renormalization over partially-missing data:
//! a child with entirely absent evidence is excluded from its parent's
//! weight denominator rather than scored as zero, so a category missing one
//! subcategory is not unfairly penalized against a fully-evidenced one.
//! `effective_weight(child) = weight / Σ weight(evidenced siblings)`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EvaluateError;
use crate::evidence::Evidence;
use crate::experience::ExperienceMultiplier;
use crate::rubric::{RubricNode, RubricTree};
use crate::scorer::{score_leaf, Rationale};

/// Output tree mirroring the rubric shape, produced fresh per evaluation and
/// owned solely by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub name: String,
    /// Score in [0, 1]; 0.0 when `no_evidence`.
    pub raw_score: f64,
    /// Weight actually used after renormalization over evidenced siblings;
    /// 0.0 when excluded from the denominator.
    pub effective_weight: f64,
    /// `effective_weight × raw_score`.
    pub contribution: f64,
    /// True when no descendant leaf had any evidence; the node was excluded
    /// from its parent's denominator.
    pub no_evidence: bool,
    /// Seniority factor applied to this category, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ScoreBreakdown>,
    /// Leaf only: which keywords/bucket drove the score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<Rationale>,
}

impl ScoreBreakdown {
    fn absent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            raw_score: 0.0,
            effective_weight: 0.0,
            contribution: 0.0,
            no_evidence: true,
            multiplier: None,
            children: Vec::new(),
            rationale: None,
        }
    }
}

/// Composite result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Root raw score × 100, rounded to one decimal (half-to-even).
    pub composite: f64,
    pub breakdown: ScoreBreakdown,
}

/// Evaluate one candidate's evidence against a rubric.
///
/// Evidence is validated up front (unknown leaf names, bucket labels or
/// indicator labels fail the whole evaluation); missing evidence is handled
/// by renormalization and never fails. When a multiplier is given and the
/// evidence carries a seniority label, the named category's raw score is
/// scaled and clamped to [0, 1] before its parent sums it. A multiplier whose
/// `applies_to` does not name a category of this tree is rejected rather than
/// left as a silent no-op.
pub fn evaluate(
    tree: &RubricTree,
    evidence: &Evidence,
    multiplier: Option<&ExperienceMultiplier>,
) -> Result<Evaluation, EvaluateError> {
    evidence.validate(tree)?;
    if let Some(m) = multiplier {
        let targets_category = tree.walk().any(|n| !n.is_leaf() && n.name() == m.applies_to);
        if !targets_category {
            return Err(EvaluateError::UnknownMultiplierTarget(m.applies_to.clone()));
        }
        if let Some(label) = evidence.seniority.as_deref() {
            if m.factor_for(label).is_none() {
                return Err(EvaluateError::UnknownBucket {
                    leaf: m.applies_to.clone(),
                    label: label.to_string(),
                });
            }
        }
    }

    let mut root = eval_node(tree.root(), evidence, multiplier)?;
    root.effective_weight = if root.no_evidence { 0.0 } else { 1.0 };
    root.contribution = root.raw_score;

    let composite = round_half_even_1dp(root.raw_score * 100.0);
    debug!(composite, no_evidence = root.no_evidence, "evaluation complete");
    Ok(Evaluation {
        composite,
        breakdown: root,
    })
}

// An absent leaf becomes a `no_evidence` marker node. Evidence is validated
// before recursion starts, so leaf scoring failures cannot occur for a built
// tree, but errors still propagate rather than panic.
fn eval_node(
    node: &RubricNode,
    evidence: &Evidence,
    multiplier: Option<&ExperienceMultiplier>,
) -> Result<ScoreBreakdown, EvaluateError> {
    if node.is_leaf() {
        return match evidence.for_leaf(node.name()) {
            None => Ok(ScoreBreakdown::absent(node.name())),
            Some(ev) => {
                let (raw_score, rationale) = score_leaf(node, ev)?;
                Ok(ScoreBreakdown {
                    name: node.name().to_string(),
                    raw_score,
                    effective_weight: 0.0,
                    contribution: 0.0,
                    no_evidence: false,
                    multiplier: None,
                    children: Vec::new(),
                    rationale: Some(rationale),
                })
            }
        };
    }

    let mut children: Vec<ScoreBreakdown> = node
        .children()
        .iter()
        .map(|child| eval_node(child, evidence, multiplier))
        .collect::<Result<_, _>>()?;

    let present: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, b)| !b.no_evidence)
        .map(|(i, _)| i)
        .collect();

    if present.is_empty() {
        let mut absent = ScoreBreakdown::absent(node.name());
        absent.children = children;
        return Ok(absent);
    }

    let denom: f64 = present.iter().map(|&i| node.children()[i].weight()).sum();
    let mut raw_score = 0.0;
    for &i in &present {
        // All-zero sibling weights renormalize to an equal split.
        let effective_weight = if denom > 0.0 {
            node.children()[i].weight() / denom
        } else {
            1.0 / present.len() as f64
        };
        children[i].effective_weight = effective_weight;
        children[i].contribution = effective_weight * children[i].raw_score;
        raw_score += children[i].contribution;
    }

    let mut applied = None;
    if let (Some(m), Some(label)) = (multiplier, evidence.seniority.as_deref()) {
        if node.name() == m.applies_to {
            if let Some(factor) = m.factor_for(label) {
                raw_score = m.apply(raw_score, factor);
                applied = Some(factor);
            }
        }
    }

    Ok(ScoreBreakdown {
        name: node.name().to_string(),
        raw_score,
        effective_weight: 0.0,
        contribution: 0.0,
        no_evidence: false,
        multiplier: applied,
        children,
        rationale: None,
    })
}

/// Round to one decimal place, ties to even (banker's rounding).
pub(crate) fn round_half_even_1dp(x: f64) -> f64 {
    let y = x * 10.0;
    let floor = y.floor();
    let rem = y - floor;
    let rounded = if (rem - 0.5).abs() < 1e-9 {
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        y.round()
    };
    rounded / 10.0
}
