//! insights.rs — Coarse ranking tier and improvement/advantage summary
//! derived from a finished evaluation. Presentation sugar on top of the
//! breakdown; no scoring logic of its own.

use serde::{Deserialize, Serialize};

use crate::aggregate::Evaluation;

/// Ranking band for a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    TopTier,
    HighQuality,
    MidLevel,
    Developing,
}

impl Tier {
    /// Band boundaries: >=85 top tier, >=70 high quality, >=55 mid level.
    pub fn for_composite(composite: f64) -> Self {
        if composite >= 85.0 {
            Tier::TopTier
        } else if composite >= 70.0 {
            Tier::HighQuality
        } else if composite >= 55.0 {
            Tier::MidLevel
        } else {
            Tier::Developing
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Tier::TopTier => "Exceptional candidate with strong qualifications",
            Tier::HighQuality => "Strong candidate with good qualifications",
            Tier::MidLevel => "Adequate candidate with some qualifications",
            Tier::Developing => "Candidate may need additional development",
        }
    }
}

/// Summary view over the top-level categories of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringInsights {
    pub tier: Tier,
    pub summary: String,
    /// Up to three lowest-scoring evidenced categories.
    pub improvement_priorities: Vec<String>,
    /// Up to three highest-scoring evidenced categories.
    pub competitive_advantages: Vec<String>,
}

/// Derive insights from an evaluation. Categories without evidence are left
/// out of both lists; ties resolve by category name for determinism.
pub fn scoring_insights(evaluation: &Evaluation) -> ScoringInsights {
    let tier = Tier::for_composite(evaluation.composite);

    let mut categories: Vec<(&str, f64)> = evaluation
        .breakdown
        .children
        .iter()
        .filter(|c| !c.no_evidence)
        .map(|c| (c.name.as_str(), c.raw_score))
        .collect();
    categories.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(b.0))
    });

    let improvement_priorities = categories
        .iter()
        .take(3)
        .map(|(name, _)| name.to_string())
        .collect();
    let competitive_advantages = categories
        .iter()
        .rev()
        .take(3)
        .map(|(name, _)| name.to_string())
        .collect();

    ScoringInsights {
        tier,
        summary: tier.summary().to_string(),
        improvement_priorities,
        competitive_advantages,
    }
}
