//! experience.rs — Seniority multiplier for the experience category.
//!
//! Maps a bucketed seniority label (e.g. "senior") to a multiplicative factor
//! applied to the experience category's raw score before it is summed into
//! its parent. The result is clamped back into [0, 1]; a category score can
//! never exceed its weighted share of the composite.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rubric::normalize;

/// Configurable multiplier table, keyed by normalized seniority label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceMultiplier {
    /// Name of the category the multiplier applies to.
    pub applies_to: String,
    pub table: BTreeMap<String, f64>,
}

impl ExperienceMultiplier {
    /// Built-in table over the default rubric's "experience" category.
    pub fn default_seed() -> Self {
        let table = [
            ("junior", 0.9),
            ("mid", 1.0),
            ("senior", 1.2),
            ("staff", 1.25),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            applies_to: "experience".into(),
            table,
        }
    }

    /// Factor for a seniority label (case/whitespace-insensitive lookup).
    /// `None` when the label is not in the table.
    pub fn factor_for(&self, label: &str) -> Option<f64> {
        self.table.get(&normalize(label)).copied()
    }

    /// Apply the factor to a base experience score, clamped to [0, 1].
    pub fn apply(&self, base_score: f64, factor: f64) -> f64 {
        (base_score * factor).clamp(0.0, 1.0)
    }
}
