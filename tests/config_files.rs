// tests/config_files.rs
//
// Rubric loading from JSON and TOML files, and strict rejection of
// malformed documents at load time.

use candidate_rubric_engine::{evaluate, ConfigError, Evidence, RubricTree};
use std::fs;
use std::path::PathBuf;

/// Create a unique temporary directory in std::env::temp_dir().
fn unique_tmp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.push(format!("rubric_test_{}", nanos));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const RUBRIC_JSON: &str = r#"{
  "root_name": "fit",
  "categories": [
    {
      "name": "skills",
      "weight": 0.7,
      "children": [
        {
          "name": "langs",
          "weight": 1.0,
          "keywords": ["rust", "python"],
          "thresholds": [
            { "bucket": "hit", "min_matches": 1 },
            { "bucket": "miss", "min_matches": 0 }
          ],
          "scoring": { "hit": 0.8, "miss": 0.0 }
        }
      ]
    },
    {
      "name": "tenure",
      "weight": 0.3,
      "children": [
        {
          "name": "years",
          "weight": 1.0,
          "buckets": ["none", "5-8 years"],
          "scoring": { "none": 0.0, "5-8 years": 0.9 }
        }
      ]
    }
  ]
}"#;

const RUBRIC_TOML: &str = r#"
root_name = "fit"

[[categories]]
name = "skills"
weight = 0.7

[[categories.children]]
name = "langs"
weight = 1.0
keywords = ["rust", "python"]

[[categories.children.thresholds]]
bucket = "hit"
min_matches = 1

[[categories.children.thresholds]]
bucket = "miss"
min_matches = 0

[categories.children.scoring]
hit = 0.8
miss = 0.0

[[categories]]
name = "tenure"
weight = 0.3

[[categories.children]]
name = "years"
weight = 1.0
buckets = ["none", "5-8 years"]

[categories.children.scoring]
none = 0.0
"5-8 years" = 0.9
"#;

#[test]
fn loads_equivalent_trees_from_json_and_toml() {
    let dir = unique_tmp_dir();
    let json_path = dir.join("rubric.json");
    let toml_path = dir.join("rubric.toml");
    fs::write(&json_path, RUBRIC_JSON).unwrap();
    fs::write(&toml_path, RUBRIC_TOML).unwrap();

    let from_json = RubricTree::load_from_file(&json_path).unwrap();
    let from_toml = RubricTree::load_from_file(&toml_path).unwrap();
    assert_eq!(from_json, from_toml);

    let evidence = Evidence::new()
        .with_keywords("langs", &["rust"])
        .with_bucket("years", "5-8 years");
    let a = evaluate(&from_json, &evidence, None).unwrap();
    let b = evaluate(&from_toml, &evidence, None).unwrap();
    assert_eq!(a, b);
    // 0.8 * 0.7 + 0.9 * 0.3 = 0.83.
    assert_eq!(a.composite, 83.0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = unique_tmp_dir();
    let err = RubricTree::load_from_file(dir.join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn malformed_document_is_a_parse_error() {
    let dir = unique_tmp_dir();
    let path = dir.join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let err = RubricTree::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_shape_is_rejected_at_load_time() {
    // A leaf with both children and a scoring table never reaches evaluation.
    let dir = unique_tmp_dir();
    let path = dir.join("invalid.json");
    let doc = RUBRIC_JSON.replace(
        r#""name": "skills",
      "weight": 0.7,"#,
        r#""name": "skills",
      "weight": 0.7,
      "scoring": { "hit": 1.0 },"#,
    );
    fs::write(&path, doc).unwrap();
    let err = RubricTree::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::BothChildrenAndScoring(_)));
    let _ = fs::remove_dir_all(&dir);
}
