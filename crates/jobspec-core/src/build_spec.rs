//! Build spec: the ordered set of jobs of one project revision.

use crate::error::{Error, Result};
use crate::job::Job;
use crate::validation::{FieldPath, Validate, Violations, duplicate_indexes};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BuildSpec {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

fn default_version() -> String {
    "1".to_string()
}

impl BuildSpec {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            version: default_version(),
            jobs,
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse and validate in one step.
    pub fn parse(content: &str) -> Result<Self> {
        let spec = Self::from_yaml(content)?;
        spec.validate().map_err(Error::InvalidSpec)?;
        Ok(spec)
    }

    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.name == name)
    }

    /// Job picked by a selection, either a bare name or `jobs/<name>`.
    pub fn select(&self, selection: &str) -> Option<&Job> {
        let name = selection
            .strip_prefix(Job::SELECTION_PREFIX)
            .unwrap_or(selection);
        self.job(name)
    }

    pub fn job_names(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().map(|job| job.name.as_str())
    }
}

impl Validate for BuildSpec {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        let jobs = path.field("jobs");

        for (i, job) in self.jobs.iter().enumerate() {
            job.check(&jobs.index(i), violations);
        }

        for (i, name) in duplicate_indexes(self.job_names()) {
            violations.push(jobs.index(i).field("name"), format!("Duplicate job: {}", name));
        }

        let known: HashSet<&str> = self.job_names().collect();
        for (i, job) in self.jobs.iter().enumerate() {
            let job_path = jobs.index(i);
            for (j, dependency) in job.job_dependencies.iter().enumerate() {
                let dep_path = job_path.field("job_dependencies").index(j).field("job_name");
                check_job_reference(&dependency.job_name, &job.name, &known, dep_path, violations);
            }
            for (j, action) in job.post_build_actions.iter().enumerate() {
                if let Some(target) = action.run_job_name() {
                    let action_path = job_path.field("post_build_actions").index(j).field("job_name");
                    check_job_reference(target, &job.name, &known, action_path, violations);
                }
            }
        }

        tracing::debug!(
            jobs = self.jobs.len(),
            violations = violations.len(),
            "Validated build spec"
        );
    }
}

fn check_job_reference(
    target: &str,
    owner: &str,
    known: &HashSet<&str>,
    path: FieldPath,
    violations: &mut Violations,
) {
    if target.trim().is_empty() {
        // Already reported by the job itself.
        return;
    }
    if target == owner {
        violations.push(path, "A job may not reference itself");
    } else if !known.contains(target) {
        violations.push(path, format!("Job not found: {}", target));
    }
}
