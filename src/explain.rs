//! explain.rs — Flat, presentation-ready projection of a score breakdown.
//!
//! Pure projection, no scoring logic: each node of the breakdown tree
//! becomes one row with its slash-joined category path, in depth-first
//! order. Downstream UI/API layers consume the rows directly.

use serde::{Deserialize, Serialize};

use crate::aggregate::ScoreBreakdown;
use crate::scorer::Rationale;

/// One row per rubric node, ordered depth-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRow {
    /// Slash-joined path from the root, e.g. "overall/technical_skills/databases".
    pub path: String,
    pub raw_score: f64,
    pub effective_weight: f64,
    pub contribution: f64,
    pub no_evidence: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<Rationale>,
}

/// Flatten a breakdown produced by [`crate::aggregate::evaluate`].
pub fn build_explanation(breakdown: &ScoreBreakdown) -> Vec<ExplanationRow> {
    let mut rows = Vec::new();
    flatten(breakdown, "", &mut rows);
    rows
}

fn flatten(node: &ScoreBreakdown, prefix: &str, rows: &mut Vec<ExplanationRow>) {
    let path = if prefix.is_empty() {
        node.name.clone()
    } else {
        format!("{prefix}/{}", node.name)
    };

    // Anything the aggregator produced satisfies the renormalization
    // invariant; a breakdown assembled by hand may not.
    debug_assert!(
        {
            let sum: f64 = node
                .children
                .iter()
                .filter(|c| !c.no_evidence)
                .map(|c| c.effective_weight)
                .sum();
            node.children.iter().all(|c| c.no_evidence) || (sum - 1.0).abs() < 1e-9
        },
        "breakdown node `{}` was not produced by the aggregator",
        node.name
    );

    rows.push(ExplanationRow {
        path: path.clone(),
        raw_score: node.raw_score,
        effective_weight: node.effective_weight,
        contribution: node.contribution,
        no_evidence: node.no_evidence,
        rationale: node.rationale.clone(),
    });
    for child in &node.children {
        flatten(child, &path, rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::evaluate;
    use crate::evidence::Evidence;
    use crate::rubric::RubricTree;

    #[test]
    fn rows_follow_depth_first_order_with_full_paths() {
        let tree = RubricTree::default_seed();
        let evidence = Evidence::new()
            .with_keywords("programming_languages", &["rust", "python"])
            .with_bucket("total_years", "5-8 years");
        let result = evaluate(tree, &evidence, None).unwrap();
        let rows = build_explanation(&result.breakdown);

        assert_eq!(rows[0].path, "overall");
        let lang = rows
            .iter()
            .position(|r| r.path == "overall/technical_skills/programming_languages")
            .unwrap();
        let years = rows
            .iter()
            .position(|r| r.path == "overall/experience/total_years")
            .unwrap();
        assert!(lang < years, "technical skills precede experience");
        assert_eq!(rows.len(), tree.walk().count());
    }

    #[test]
    fn leaf_rows_carry_rationale_and_absent_rows_carry_flag() {
        let tree = RubricTree::default_seed();
        let evidence = Evidence::new().with_bucket("total_years", "2-4 years");
        let result = evaluate(tree, &evidence, None).unwrap();
        let rows = build_explanation(&result.breakdown);

        let years = rows
            .iter()
            .find(|r| r.path.ends_with("/total_years"))
            .unwrap();
        assert_eq!(years.rationale.as_ref().unwrap().bucket, "2-4 years");
        assert!(!years.no_evidence);

        let degree = rows
            .iter()
            .find(|r| r.path.ends_with("/degree_level"))
            .unwrap();
        assert!(degree.no_evidence);
        assert!(degree.rationale.is_none());
    }
}
