//! Command handlers.

use crate::config::{CliConfig, OutputFormat};
use chrono::{DateTime, Utc};
use console::style;
use jobspec_core::query::build_query;
use jobspec_core::{BuildSpec, CommitId, ProjectEvent, Validate, Violations};
use jobspec_scheduler::schedule::upcoming;
use jobspec_scheduler::{Backoff, DagBuilder, TriggerDispatcher};
use serde::Serialize;
use std::path::Path;

type HandlerResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const TEMPLATE: &str = r#"version: "1"
jobs:
  - name: build
    image: rust:1.85
    commands:
      - cargo build --release
    caches:
      - key: cargo-registry
        path: /usr/local/cargo/registry
    triggers:
      - type: branch_update
        branches: [main]

  - name: test
    image: rust:1.85
    commands:
      - cargo test
    job_dependencies:
      - job_name: build
    triggers:
      - type: dependency_finished
    retry_condition: failed
    max_retries: 2
    retry_delay: 30
"#;

/// Outcome of validating a build spec.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub jobs: usize,
    pub violations: Violations,
    /// Dependency graph problem, only looked at once the jobs themselves are valid.
    pub graph_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    job: &'a str,
    trigger_index: usize,
    trigger: String,
}

#[derive(Debug, Serialize)]
struct RetryRow {
    attempt: u32,
    delay_secs: u64,
}

#[derive(Debug, Serialize)]
struct FireRow<'a> {
    job: &'a str,
    cron_expression: &'a str,
    at: DateTime<Utc>,
}

fn spec_path<'a>(config: &'a CliConfig, path: &'a Option<String>) -> &'a str {
    path.as_deref().unwrap_or(&config.spec_path)
}

pub async fn load_spec(path: &str) -> HandlerResult<BuildSpec> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let spec = BuildSpec::from_yaml(&content)?;
    tracing::debug!(path, jobs = spec.jobs.len(), "Loaded build spec");
    Ok(spec)
}

/// Load a spec and refuse to go on if it has violations.
async fn load_valid_spec(path: &str) -> HandlerResult<BuildSpec> {
    let spec = load_spec(path).await?;
    let report = check_spec(&spec);
    if !report.valid {
        print_violations(&report);
        return Err(format!("{} is not a valid build spec", path).into());
    }
    Ok(spec)
}

/// Validate a spec, then its dependency graph.
pub fn check_spec(spec: &BuildSpec) -> ValidationReport {
    let violations = spec.validate().err().unwrap_or_default();
    let graph_error = if violations.is_empty() {
        DagBuilder::new().build(spec).err().map(|e| e.to_string())
    } else {
        None
    };
    ValidationReport {
        valid: violations.is_empty() && graph_error.is_none(),
        jobs: spec.jobs.len(),
        violations,
        graph_error,
    }
}

pub fn render<T: Serialize>(format: OutputFormat, value: &T) -> HandlerResult<Option<String>> {
    match format {
        OutputFormat::Table => Ok(None),
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(Some(serde_yaml::to_string(value)?)),
    }
}

fn print_violations(report: &ValidationReport) {
    for violation in report.violations.iter() {
        println!("  {} {}", style("✗").red(), violation);
    }
    if let Some(error) = &report.graph_error {
        println!("  {} {}", style("✗").red(), error);
    }
}

/// Write a starter build spec.
pub async fn init(config: &CliConfig) -> HandlerResult {
    let path = Path::new(&config.spec_path);

    if path.exists() {
        println!("{} {} already exists", style("!").yellow(), path.display());
        return Ok(());
    }

    tokio::fs::write(path, TEMPLATE).await?;
    println!("{} Created {}", style("✓").green(), path.display());
    Ok(())
}

/// Validate a build spec, exiting non-zero when it has problems.
pub async fn validate(config: &CliConfig, path: &Option<String>) -> HandlerResult {
    let path = spec_path(config, path);
    let spec = load_spec(path).await?;
    let report = check_spec(&spec);

    if let Some(out) = render(config.output_format, &report)? {
        println!("{}", out);
    } else if report.valid {
        println!(
            "{} {} is valid ({} jobs)",
            style("✓").green(),
            path,
            report.jobs
        );
        for job in &spec.jobs {
            println!("    - {} ({} triggers)", job.name, job.triggers.len());
        }
    } else {
        println!("{} {} has problems:", style("✗").red(), path);
        print_violations(&report);
    }

    if report.valid {
        Ok(())
    } else {
        let count = report.violations.len() + usize::from(report.graph_error.is_some());
        Err(format!("{} problem(s) found", count).into())
    }
}

/// Show the jobs an event fires.
pub async fn match_event(config: &CliConfig, path: &Option<String>, event: &str) -> HandlerResult {
    let spec = load_valid_spec(spec_path(config, path)).await?;
    let content = tokio::fs::read_to_string(event)
        .await
        .map_err(|e| format!("Failed to read {}: {}", event, e))?;
    let event: ProjectEvent = serde_json::from_str(&content)?;

    let rows: Vec<MatchRow> = TriggerDispatcher::new()
        .dispatch(&spec, &event)
        .into_iter()
        .map(|d| MatchRow {
            job: d.job_name,
            trigger_index: d.trigger_index,
            trigger: d.trigger.to_string(),
        })
        .collect();

    if let Some(out) = render(config.output_format, &rows)? {
        println!("{}", out);
    } else if rows.is_empty() {
        println!("No jobs triggered by {} event", event.kind());
    } else {
        println!("{:<24} {:<8} TRIGGER", "JOB", "INDEX");
        for row in &rows {
            println!("{:<24} {:<8} {}", row.job, row.trigger_index, row.trigger);
        }
    }
    Ok(())
}

/// Print the build query for a commit and job.
pub fn query(commit: &str, job: &str) -> HandlerResult {
    let commit: CommitId = commit.parse()?;
    println!("{}", build_query(&commit, job)?);
    Ok(())
}

/// Print jobs in dependency order.
pub async fn plan(config: &CliConfig, path: &Option<String>) -> HandlerResult {
    let spec = load_valid_spec(spec_path(config, path)).await?;
    let dag = DagBuilder::new().build(&spec)?;
    let order: Vec<&str> = dag.topological_order()?.iter().map(|n| n.name).collect();

    if let Some(out) = render(config.output_format, &order)? {
        println!("{}", out);
        return Ok(());
    }

    for (i, name) in order.iter().enumerate() {
        let needs: Vec<&str> = dag.predecessors(name).iter().map(|n| n.name).collect();
        if needs.is_empty() {
            println!("{:>3}. {}", i + 1, style(name).bold());
        } else {
            println!(
                "{:>3}. {} {}",
                i + 1,
                style(name).bold(),
                style(format!("(after {})", needs.join(", "))).dim()
            );
        }
    }
    Ok(())
}

/// Retry delays of a job, selected by name or `jobs/<name>`.
pub fn retry_rows(spec: &BuildSpec, job: &str) -> HandlerResult<Vec<(u32, u64)>> {
    let job = spec.select(job).ok_or_else(|| format!("Job not found: {}", job))?;
    if !job.retry_policy().is_enabled() {
        return Ok(vec![]);
    }
    Ok(Backoff::from_policy(job.retry_policy())
        .schedule()
        .into_iter()
        .zip(1..)
        .map(|(delay, attempt)| (attempt, delay.as_secs()))
        .collect())
}

/// Print the retry schedule of a job.
pub async fn retries(config: &CliConfig, path: &Option<String>, job: &str) -> HandlerResult {
    let spec = load_valid_spec(spec_path(config, path)).await?;
    let rows: Vec<RetryRow> = retry_rows(&spec, job)?
        .into_iter()
        .map(|(attempt, delay_secs)| RetryRow {
            attempt,
            delay_secs,
        })
        .collect();

    if let Some(out) = render(config.output_format, &rows)? {
        println!("{}", out);
    } else if rows.is_empty() {
        println!("Job {} is never retried", job);
    } else {
        println!("{:<8} DELAY", "ATTEMPT");
        for row in &rows {
            println!("{:<8} {}s", row.attempt, row.delay_secs);
        }
    }
    Ok(())
}

/// Print the next fire time of every schedule trigger.
pub async fn schedule(config: &CliConfig, path: &Option<String>) -> HandlerResult {
    let spec = load_valid_spec(spec_path(config, path)).await?;
    let rows: Vec<FireRow> = upcoming(&spec, Utc::now())
        .into_iter()
        .map(|fire| FireRow {
            job: fire.job_name,
            cron_expression: fire.cron_expression,
            at: fire.at,
        })
        .collect();

    if let Some(out) = render(config.output_format, &rows)? {
        println!("{}", out);
    } else if rows.is_empty() {
        println!("No schedule triggers");
    } else {
        println!("{:<24} {:<20} NEXT", "JOB", "CRON");
        for row in &rows {
            println!(
                "{:<24} {:<20} {}",
                row.job,
                row.cron_expression,
                row.at.to_rfc3339()
            );
        }
    }
    Ok(())
}

/// Print the JSON schema of the build spec format.
pub fn schema() -> HandlerResult {
    let schema = schemars::schema_for!(BuildSpec);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Show configuration.
pub fn show_config(config: &CliConfig) -> HandlerResult {
    println!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

/// Set configuration value.
pub fn set_config(key: &str, value: &str) -> HandlerResult {
    let mut config = CliConfig::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}
