use crate::config::OutputFormat;
use crate::handlers::{check_spec, load_spec, render, retry_rows};
use jobspec_core::BuildSpec;
use pretty_assertions::assert_eq;

const SPEC: &str = r#"
jobs:
  - name: build
    image: rust:1.85
    commands: [cargo build]
    retry_condition: failed
    max_retries: 3
    retry_delay: 10
  - name: test
    image: rust:1.85
    commands: [cargo test]
    job_dependencies:
      - job_name: build
"#;

#[tokio::test]
async fn test_load_spec_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".jobspec.yml");
    std::fs::write(&path, SPEC).unwrap();

    let spec = load_spec(path.to_str().unwrap()).await.unwrap();
    assert_eq!(spec.job_names().collect::<Vec<_>>(), vec!["build", "test"]);
}

#[tokio::test]
async fn test_load_spec_missing_file() {
    let err = load_spec("/nonexistent/.jobspec.yml").await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to read"));
}

#[test]
fn test_check_valid_spec() {
    let spec = BuildSpec::from_yaml(SPEC).unwrap();
    let report = check_spec(&spec);
    assert!(report.valid);
    assert_eq!(report.jobs, 2);
    assert!(report.graph_error.is_none());
}

#[test]
fn test_check_reports_violations() {
    let yaml = r#"
jobs:
  - name: build
    image: ""
    commands: [make]
"#;
    let spec = BuildSpec::from_yaml(yaml).unwrap();
    let report = check_spec(&spec);
    assert!(!report.valid);
    assert_eq!(report.violations.len(), 1);
    assert_eq!(
        report.violations.iter().next().unwrap().to_string(),
        "jobs[0].image: may not be empty"
    );
}

#[test]
fn test_check_reports_cycles() {
    let yaml = r#"
jobs:
  - name: a
    image: alpine
    commands: ["true"]
    job_dependencies: [{ job_name: b }]
  - name: b
    image: alpine
    commands: ["true"]
    job_dependencies: [{ job_name: a }]
"#;
    let spec = BuildSpec::from_yaml(yaml).unwrap();
    let report = check_spec(&spec);
    assert!(!report.valid);
    assert!(report.violations.is_empty());
    assert_eq!(
        report.graph_error.as_deref(),
        Some("Cycle detected in job dependencies: a -> b")
    );
}

#[test]
fn test_retry_rows() {
    let spec = BuildSpec::from_yaml(SPEC).unwrap();
    assert_eq!(
        retry_rows(&spec, "build").unwrap(),
        vec![(1, 10), (2, 20), (3, 40)]
    );
    assert_eq!(
        retry_rows(&spec, "jobs/build").unwrap(),
        retry_rows(&spec, "build").unwrap()
    );
    assert!(retry_rows(&spec, "test").unwrap().is_empty());
    assert!(retry_rows(&spec, "deploy").is_err());
}

#[test]
fn test_render_formats() {
    let order = vec!["build", "test"];
    assert_eq!(render(OutputFormat::Table, &order).unwrap(), None);
    assert_eq!(
        render(OutputFormat::Json, &order).unwrap().unwrap(),
        "[\n  \"build\",\n  \"test\"\n]"
    );
    assert_eq!(
        render(OutputFormat::Yaml, &order).unwrap().unwrap(),
        "- build\n- test\n"
    );
}
