//! bias.rs — Disparate-impact audit over a batch of composite scores.
//!
//! Implements the four-fifths rule: each group's selection rate is the share
//! of its records at or above the decision threshold, and the audit flags
//! when the lowest rate falls below 80% (configurable) of the highest.
//!
//! Pure function of its inputs: no state is retained between calls, and
//! selection-rate counting is a fold over records, so batches may be
//! partitioned across workers and merged. Callers schedule periodic audits
//! and persist the report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Default four-fifths-rule threshold.
pub const DEFAULT_FAIRNESS_THRESHOLD: f64 = 0.8;

/// One scored subject with its group membership. Ephemeral, constructed by
/// the caller per audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupScoreRecord {
    pub subject_id: String,
    pub group_label: String,
    pub composite_score: f64,
}

impl GroupScoreRecord {
    pub fn new(
        subject_id: impl Into<String>,
        group_label: impl Into<String>,
        composite_score: f64,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            group_label: group_label.into(),
            composite_score,
        }
    }
}

/// Audit parameters (builder style). `expected_groups` lets the caller name
/// groups that must appear; those with zero records are reported under
/// `insufficient_data` instead of silently vanishing from the ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasAudit {
    pub decision_threshold: f64,
    pub fairness_threshold: f64,
    #[serde(default)]
    pub expected_groups: Vec<String>,
}

impl BiasAudit {
    pub fn new(decision_threshold: f64) -> Self {
        Self {
            decision_threshold,
            fairness_threshold: DEFAULT_FAIRNESS_THRESHOLD,
            expected_groups: Vec::new(),
        }
    }

    pub fn fairness_threshold(mut self, threshold: f64) -> Self {
        self.fairness_threshold = threshold;
        self
    }

    pub fn expect_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Compute selection rates and the min/max disparity ratio.
    ///
    /// Fewer than two groups with records (or a highest rate of zero) means
    /// disparity cannot be assessed: `min_max_ratio` is `None` and the
    /// report is unflagged. Ties at the minimum or maximum rate resolve to
    /// the lexicographically smallest group label.
    pub fn analyze(&self, records: &[GroupScoreRecord]) -> BiasReport {
        let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for record in records {
            let entry = counts.entry(record.group_label.as_str()).or_insert((0, 0));
            entry.1 += 1;
            if record.composite_score >= self.decision_threshold {
                entry.0 += 1;
            }
        }

        let selection_rates: BTreeMap<String, f64> = counts
            .iter()
            .map(|(group, (selected, total))| {
                (group.to_string(), *selected as f64 / *total as f64)
            })
            .collect();

        let mut insufficient_data: Vec<String> = self
            .expected_groups
            .iter()
            .filter(|g| !selection_rates.contains_key(*g))
            .cloned()
            .collect();
        insufficient_data.sort();
        insufficient_data.dedup();

        // BTreeMap iteration is lexicographic, so strict comparisons keep
        // the smallest label on ties.
        let mut min: Option<(&str, f64)> = None;
        let mut max: Option<(&str, f64)> = None;
        for (group, &rate) in &selection_rates {
            if min.is_none_or(|(_, r)| rate < r) {
                min = Some((group, rate));
            }
            if max.is_none_or(|(_, r)| rate > r) {
                max = Some((group, rate));
            }
        }

        let (min_max_ratio, flagged, min_group, max_group) = match (min, max) {
            (Some((min_g, min_r)), Some((max_g, max_r)))
                if selection_rates.len() >= 2 && max_r > 0.0 =>
            {
                let ratio = min_r / max_r;
                (
                    Some(ratio),
                    ratio < self.fairness_threshold,
                    Some(min_g.to_string()),
                    Some(max_g.to_string()),
                )
            }
            _ => (None, false, None, None),
        };

        if flagged {
            warn!(
                ratio = min_max_ratio.unwrap_or(0.0),
                threshold = self.fairness_threshold,
                min_group = min_group.as_deref().unwrap_or(""),
                max_group = max_group.as_deref().unwrap_or(""),
                "disparate impact flagged"
            );
        } else {
            info!(
                groups = selection_rates.len(),
                records = records.len(),
                "bias audit clean"
            );
        }

        BiasReport {
            selection_rates,
            min_max_ratio,
            flagged,
            threshold: self.fairness_threshold,
            insufficient_data,
            min_group,
            max_group,
        }
    }
}

/// Immutable audit outcome, serializable for the caller's audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
    pub selection_rates: BTreeMap<String, f64>,
    /// `None` when fewer than two groups have records (or nobody was
    /// selected anywhere) — disparity cannot be assessed.
    pub min_max_ratio: Option<f64>,
    pub flagged: bool,
    pub threshold: f64,
    /// Expected groups that contributed zero records.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insufficient_data: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_group: Option<String>,
}
