//! # Rubric tree
//!
//! Validated, immutable representation of a scoring configuration: a tree of
//! weighted categories whose leaves carry keyword or bucket scoring tables.
//!
//! - Loads from JSON or TOML config (same nested shape in both).
//! - `build` is a strict parse-and-validate step: malformed shapes are
//!   rejected up front with `ConfigError`, never deep inside recursive
//!   scoring.
//! - Sibling weights are relative, not required to sum to 1; the aggregator
//!   renormalizes over the evidenced subset.
//! - Includes a built-in `default_seed()` rubric for the common
//!   software-engineering role profile.
//!
//! After `build` succeeds the tree is read-only and `Send + Sync`; any number
//! of evaluations may share one tree without synchronization.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;

static DEFAULT_RUBRIC: Lazy<RubricTree> = Lazy::new(|| {
    let raw = include_str!("../default_rubric.json");
    let config: RubricConfig = serde_json::from_str(raw).expect("valid built-in rubric JSON");
    RubricTree::build(&config).expect("built-in rubric passes validation")
});

/// One node of the raw configuration document. The kind (category vs. leaf)
/// is inferred during `build` from which optional fields are populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub children: Vec<NodeConfig>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Intensity indicator vocabulary a threshold may require (e.g. "impact").
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub thresholds: Vec<ThresholdConfig>,
    #[serde(default)]
    pub buckets: Vec<String>,
    #[serde(default)]
    pub scoring: BTreeMap<String, f64>,
}

/// Maps a matched-keyword count (optionally plus a required indicator) to a
/// qualitative bucket label, e.g. ">=3 matches with `impact`" -> "high_complexity".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub bucket: String,
    pub min_matches: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_indicator: Option<String>,
}

/// Top-level configuration document: categories under a single implicit root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RubricConfig {
    #[serde(default)]
    pub root_name: Option<String>,
    pub categories: Vec<NodeConfig>,
}

/// A validated tree node. Exactly one kind; categories have >=1 child and no
/// scoring table, leaves have no children.
#[derive(Debug, Clone, PartialEq)]
pub enum RubricNode {
    Category {
        name: String,
        weight: f64,
        children: Vec<RubricNode>,
    },
    KeywordLeaf {
        name: String,
        weight: f64,
        /// Normalized (lowercased, trimmed) keyword vocabulary.
        keywords: BTreeSet<String>,
        /// Normalized indicator vocabulary.
        indicators: BTreeSet<String>,
        /// Sorted by descending `min_matches`, indicator-requiring entries
        /// first within a count; first satisfied entry wins.
        thresholds: Vec<CountThreshold>,
        scoring: BTreeMap<String, f64>,
    },
    BucketLeaf {
        name: String,
        weight: f64,
        /// Ordered bucket labels, including the explicit no-evidence bucket.
        buckets: Vec<String>,
        scoring: BTreeMap<String, f64>,
    },
}

/// Validated form of [`ThresholdConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct CountThreshold {
    pub bucket: String,
    pub min_matches: usize,
    pub requires_indicator: Option<String>,
}

impl RubricNode {
    pub fn name(&self) -> &str {
        match self {
            RubricNode::Category { name, .. }
            | RubricNode::KeywordLeaf { name, .. }
            | RubricNode::BucketLeaf { name, .. } => name,
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            RubricNode::Category { weight, .. }
            | RubricNode::KeywordLeaf { weight, .. }
            | RubricNode::BucketLeaf { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, RubricNode::Category { .. })
    }

    /// Children of a category; empty slice for leaves.
    pub fn children(&self) -> &[RubricNode] {
        match self {
            RubricNode::Category { children, .. } => children,
            _ => &[],
        }
    }

    /// Scoring table of a leaf; `None` for categories.
    pub fn scoring(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            RubricNode::Category { .. } => None,
            RubricNode::KeywordLeaf { scoring, .. } | RubricNode::BucketLeaf { scoring, .. } => {
                Some(scoring)
            }
        }
    }
}

/// Immutable rubric, built once from configuration and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct RubricTree {
    root: RubricNode,
}

impl RubricTree {
    /// Parse and validate a configuration document into a tree.
    ///
    /// Rejections (`ConfigError`): a node with both children and a scoring
    /// table, a negative weight, a childless category, a leaf with neither
    /// keyword nor bucket vocabulary, duplicate names, a threshold or bucket
    /// whose label has no scoring entry, a keyword leaf without a zero-match
    /// threshold, or a score outside [0, 1].
    pub fn build(config: &RubricConfig) -> Result<Self, ConfigError> {
        if config.categories.is_empty() {
            return Err(ConfigError::EmptyCategory(
                config.root_name.clone().unwrap_or_else(|| "root".into()),
            ));
        }
        let root_name = config.root_name.clone().unwrap_or_else(|| "overall".into());
        let root_config = NodeConfig {
            name: root_name,
            weight: 1.0,
            children: config.categories.clone(),
            ..NodeConfig::default()
        };
        let root = build_node(&root_config)?;

        let tree = Self { root };
        tree.check_unique_names()?;
        info!(
            leaves = tree.leaf_names().len(),
            root = tree.root.name(),
            "rubric built"
        );
        Ok(tree)
    }

    /// Load a rubric from a `.json` or `.toml` file, then `build` it.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config: RubricConfig = if path.extension().and_then(|e| e.to_str()) == Some("toml") {
            toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?
        };
        Self::build(&config)
    }

    /// Built-in rubric for a general software-engineering role: five weighted
    /// categories (technical skills, experience, education, projects,
    /// soft skills) with keyword and tenure-band leaves. Validated through
    /// the same `build` path as external configs.
    pub fn default_seed() -> &'static RubricTree {
        &DEFAULT_RUBRIC
    }

    pub fn root(&self) -> &RubricNode {
        &self.root
    }

    /// Depth-first (pre-order) traversal over all nodes.
    pub fn walk(&self) -> DepthFirst<'_> {
        DepthFirst {
            stack: vec![&self.root],
        }
    }

    /// First node with the given name, depth-first. A category declared
    /// earlier in the traversal can shadow a same-named leaf here; evidence
    /// resolution must go through [`RubricTree::find_leaf`] instead.
    pub fn find(&self, name: &str) -> Option<&RubricNode> {
        self.walk().find(|n| n.name() == name)
    }

    /// The leaf with the given name. Unambiguous: leaf names are unique
    /// tree-wide (enforced at build), and categories never shadow leaves in
    /// this lookup.
    pub fn find_leaf(&self, name: &str) -> Option<&RubricNode> {
        self.walk().find(|n| n.is_leaf() && n.name() == name)
    }

    /// Names of all leaves, in depth-first order.
    pub fn leaf_names(&self) -> Vec<&str> {
        self.walk()
            .filter(|n| n.is_leaf())
            .map(|n| n.name())
            .collect()
    }

    fn check_unique_names(&self) -> Result<(), ConfigError> {
        // Leaf names address evidence, so they must be unique tree-wide.
        let mut seen = BTreeSet::new();
        for node in self.walk().filter(|n| n.is_leaf()) {
            if !seen.insert(node.name().to_string()) {
                return Err(ConfigError::DuplicateName(node.name().to_string()));
            }
        }
        Ok(())
    }
}

/// Depth-first iterator over a tree; children visited in declaration order.
pub struct DepthFirst<'a> {
    stack: Vec<&'a RubricNode>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a RubricNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children().iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

fn build_node(config: &NodeConfig) -> Result<RubricNode, ConfigError> {
    if config.weight < 0.0 {
        return Err(ConfigError::NegativeWeight {
            name: config.name.clone(),
            weight: config.weight,
        });
    }

    let has_leaf_fields = !config.scoring.is_empty()
        || !config.keywords.is_empty()
        || !config.thresholds.is_empty()
        || !config.buckets.is_empty();

    if !config.children.is_empty() {
        if has_leaf_fields {
            return Err(ConfigError::BothChildrenAndScoring(config.name.clone()));
        }
        let mut sibling_names = BTreeSet::new();
        let mut children = Vec::with_capacity(config.children.len());
        for child in &config.children {
            if !sibling_names.insert(child.name.as_str()) {
                return Err(ConfigError::DuplicateName(child.name.clone()));
            }
            children.push(build_node(child)?);
        }
        return Ok(RubricNode::Category {
            name: config.name.clone(),
            weight: config.weight,
            children,
        });
    }

    check_scores_in_range(&config.name, &config.scoring)?;

    if !config.keywords.is_empty() || !config.thresholds.is_empty() {
        build_keyword_leaf(config)
    } else if !config.buckets.is_empty() {
        build_bucket_leaf(config)
    } else {
        Err(ConfigError::UnclassifiableNode(config.name.clone()))
    }
}

fn build_keyword_leaf(config: &NodeConfig) -> Result<RubricNode, ConfigError> {
    // Every threshold bucket must resolve in the scoring table now, so the
    // scorer can never miss a lookup later.
    for t in &config.thresholds {
        if !config.scoring.contains_key(&t.bucket) {
            return Err(ConfigError::MissingScoreEntry {
                leaf: config.name.clone(),
                bucket: t.bucket.clone(),
            });
        }
    }
    // Zero matches is a valid low bucket, never an error, so the table must
    // be total over counts.
    let has_floor = config
        .thresholds
        .iter()
        .any(|t| t.min_matches == 0 && t.requires_indicator.is_none());
    if !has_floor {
        return Err(ConfigError::MissingDefaultBucket(config.name.clone()));
    }

    let mut thresholds: Vec<CountThreshold> = config
        .thresholds
        .iter()
        .map(|t| CountThreshold {
            bucket: t.bucket.clone(),
            min_matches: t.min_matches,
            requires_indicator: t.requires_indicator.as_deref().map(normalize),
        })
        .collect();
    // Most demanding first; indicator-requiring entries outrank plain ones
    // at the same count.
    thresholds.sort_by(|a, b| {
        b.min_matches
            .cmp(&a.min_matches)
            .then(b.requires_indicator.is_some().cmp(&a.requires_indicator.is_some()))
    });

    Ok(RubricNode::KeywordLeaf {
        name: config.name.clone(),
        weight: config.weight,
        keywords: config.keywords.iter().map(|k| normalize(k)).collect(),
        indicators: config.indicators.iter().map(|i| normalize(i)).collect(),
        thresholds,
        scoring: config.scoring.clone(),
    })
}

fn build_bucket_leaf(config: &NodeConfig) -> Result<RubricNode, ConfigError> {
    // Total mapping: every listed bucket, "none"/"unmatched" included, must
    // carry a score.
    for bucket in &config.buckets {
        if !config.scoring.contains_key(bucket) {
            return Err(ConfigError::MissingScoreEntry {
                leaf: config.name.clone(),
                bucket: bucket.clone(),
            });
        }
    }
    Ok(RubricNode::BucketLeaf {
        name: config.name.clone(),
        weight: config.weight,
        buckets: config.buckets.clone(),
        scoring: config.scoring.clone(),
    })
}

fn check_scores_in_range(
    leaf: &str,
    scoring: &BTreeMap<String, f64>,
) -> Result<(), ConfigError> {
    for (bucket, &score) in scoring {
        if !(0.0..=1.0).contains(&score) {
            return Err(ConfigError::ScoreOutOfRange {
                leaf: leaf.to_string(),
                bucket: bucket.clone(),
                score,
            });
        }
    }
    Ok(())
}

/// Normalize a keyword/indicator/bucket token: trim + lowercase.
pub(crate) fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}
