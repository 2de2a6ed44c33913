// tests/e2e_smoke.rs
//
// Whole-pipeline pass over the built-in rubric: evidence -> evaluation ->
// explanation rows -> insights -> bias audit, plus output-shape checks for
// the serialized structures downstream layers consume.

use candidate_rubric_engine::{
    build_explanation, evaluate, scoring_insights, BiasAudit, Evidence, ExperienceMultiplier,
    GroupScoreRecord, RubricTree, Tier,
};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn strong_candidate() -> Evidence {
    Evidence::new()
        .with_keywords_indicator(
            "programming_languages",
            &["rust", "python", "go", "sql"],
            "production",
        )
        .with_keywords("frameworks_libraries", &["axum", "tokio", "react"])
        .with_keywords("databases", &["postgresql", "redis"])
        .with_keywords("cloud_devops", &["aws", "docker", "kubernetes"])
        .with_bucket("total_years", "9+ years")
        .with_bucket("relevant_years", "5-8 years")
        .with_bucket("company_tier", "enterprise")
        .with_bucket("degree_level", "masters")
        .with_bucket("relevance", "directly_related")
        .with_keywords_indicator(
            "complexity",
            &["distributed", "real-time", "migration"],
            "impact",
        )
        .with_keywords("impact", &["latency", "cost"])
        .with_keywords("leadership", &["mentored", "led"])
        .with_keywords("communication", &["presented", "documented"])
        .with_seniority("senior")
}

fn weak_candidate() -> Evidence {
    Evidence::new()
        .with_keywords("programming_languages", &["python"])
        .with_bucket("total_years", "0-1 years")
        .with_bucket("degree_level", "bachelors")
        .with_seniority("junior")
}

#[test]
fn smoke_evaluate_and_explain() {
    init_tracing();
    let tree = RubricTree::default_seed();
    let multiplier = ExperienceMultiplier::default_seed();

    let strong = evaluate(tree, &strong_candidate(), Some(&multiplier)).unwrap();
    let weak = evaluate(tree, &weak_candidate(), Some(&multiplier)).unwrap();

    assert!((0.0..=100.0).contains(&strong.composite));
    assert!((0.0..=100.0).contains(&weak.composite));
    assert!(
        strong.composite > weak.composite,
        "strong={} weak={}",
        strong.composite,
        weak.composite
    );

    let rows = build_explanation(&strong.breakdown);
    assert_eq!(rows.len(), tree.walk().count());
    assert!(rows
        .iter()
        .filter(|r| !r.no_evidence && r.path.matches('/').count() == 2)
        .all(|r| r.rationale.is_some()));

    let insights = scoring_insights(&strong);
    assert!(matches!(insights.tier, Tier::TopTier | Tier::HighQuality));
    assert!(!insights.competitive_advantages.is_empty());
}

#[test]
fn smoke_audit_over_scored_batch() {
    init_tracing();
    let tree = RubricTree::default_seed();
    let multiplier = ExperienceMultiplier::default_seed();

    let mut records = Vec::new();
    for i in 0..8 {
        let evidence = if i % 2 == 0 {
            strong_candidate()
        } else {
            weak_candidate()
        };
        let group = if i < 4 { "group_a" } else { "group_b" };
        let result = evaluate(tree, &evidence, Some(&multiplier)).unwrap();
        records.push(GroupScoreRecord::new(
            format!("cand-{i}"),
            group,
            result.composite,
        ));
    }

    // Both groups are half strong, half weak, so rates are equal.
    let report = BiasAudit::new(60.0).analyze(&records);
    assert_eq!(report.min_max_ratio, Some(1.0));
    assert!(!report.flagged);
}

#[test]
fn serialized_shapes_match_contract() {
    let tree = RubricTree::default_seed();
    let result = evaluate(tree, &strong_candidate(), None).unwrap();

    let v = serde_json::to_value(&result).unwrap();
    assert!(v["composite"].is_number());
    assert_eq!(v["breakdown"]["name"], serde_json::json!("overall"));
    assert!(v["breakdown"]["children"].is_array());
    let first = &v["breakdown"]["children"][0];
    assert!(first["raw_score"].is_number());
    assert!(first["effective_weight"].is_number());
    assert!(first["contribution"].is_number());

    let report = BiasAudit::new(70.0).analyze(&[
        GroupScoreRecord::new("a", "A", 90.0),
        GroupScoreRecord::new("b", "B", 40.0),
    ]);
    let v = serde_json::to_value(&report).unwrap();
    assert!(v["selection_rates"].is_object());
    assert!(v["min_max_ratio"].is_number());
    assert_eq!(v["flagged"], serde_json::json!(true));
    let threshold = v["threshold"].as_f64().unwrap();
    assert!((threshold - 0.8).abs() < 1e-9);
}
