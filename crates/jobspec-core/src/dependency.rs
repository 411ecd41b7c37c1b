//! Dependencies on other jobs and other projects.

use crate::param::{ParamSupply, check_supplies};
use crate::validation::{FieldPath, Validate, Violations, check_not_empty};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ordering and artifact dependency on another job of the same build spec.
///
/// Only the job's own dependency list is checked here. Whether `job_name`
/// resolves, and whether the graph across jobs is acyclic, is decided at the
/// build-spec and scheduler level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobDependency {
    pub job_name: String,
    #[serde(default = "default_true")]
    pub require_successful: bool,
    #[serde(default)]
    pub job_params: Vec<ParamSupply>,
    /// Artifacts of the upstream build to retrieve, as a pattern.
    #[serde(default)]
    pub artifacts: Option<String>,
    #[serde(default)]
    pub destination_path: Option<String>,
}

impl JobDependency {
    pub fn on(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            require_successful: true,
            job_params: vec![],
            artifacts: None,
            destination_path: None,
        }
    }
}

impl Validate for JobDependency {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.job_name, path.field("job_name"), violations);
        check_supplies(&self.job_params, &path.field("job_params"), violations);
    }
}

/// Artifact dependency on a build of another project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectDependency {
    pub project_path: String,
    #[serde(default)]
    pub build: BuildSelector,
    #[serde(default = "default_artifacts")]
    pub artifacts: String,
    #[serde(default)]
    pub destination_path: Option<String>,
    /// Name of the job secret holding an access token for the other project.
    #[serde(default)]
    pub access_token_secret: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildSelector {
    #[default]
    LastFinished,
    LastFinishedOnBranch { branch: String },
    ByNumber { number: u64 },
    ByQuery { query: String },
}

impl Validate for ProjectDependency {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.project_path, path.field("project_path"), violations);
        check_not_empty(&self.artifacts, path.field("artifacts"), violations);
        match &self.build {
            BuildSelector::LastFinishedOnBranch { branch } => {
                check_not_empty(branch, path.field("build").field("branch"), violations);
            }
            BuildSelector::ByNumber { number } if *number == 0 => {
                violations.push(
                    path.field("build").field("number"),
                    "Build number must be positive",
                );
            }
            BuildSelector::ByQuery { query } => {
                check_not_empty(query, path.field("build").field("query"), violations);
            }
            _ => {}
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_artifacts() -> String {
    "**".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_dependency_defaults() {
        let dep: JobDependency = serde_yaml::from_str("job_name: build").unwrap();
        assert_eq!(dep, JobDependency::on("build"));
        assert!(dep.require_successful);
    }

    #[test]
    fn test_project_dependency_defaults() {
        let dep: ProjectDependency = serde_yaml::from_str("project_path: org/lib").unwrap();
        assert_eq!(dep.artifacts, "**");
        assert_eq!(dep.build, BuildSelector::LastFinished);
        assert!(dep.validate().is_ok());
    }

    #[test]
    fn test_project_dependency_selector_checks() {
        let dep: ProjectDependency = serde_yaml::from_str(
            "project_path: ''\nbuild:\n  type: by_number\n  number: 0\n",
        )
        .unwrap();
        let err = dep.validate().unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(
            err.messages_at(&"build.number".parse().unwrap()),
            vec!["Build number must be positive"]
        );
    }
}
