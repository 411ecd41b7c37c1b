//! The job specification.
//!
//! A [`Job`] is one executable unit of a build spec: the image and commands it
//! runs, what it depends on, what triggers it, which caches it reuses, how it
//! is retried and what it needs from the cluster. Jobs are parsed from the
//! authored YAML, checked once with [`Validate`], and then treated as
//! read-only for the lifetime of a run.

use crate::action::PostBuildAction;
use crate::cache::CacheSpec;
use crate::credential::SubmoduleCredential;
use crate::dependency::{JobDependency, ProjectDependency};
use crate::event::ProjectEvent;
use crate::interpolation;
use crate::param::{ParamSpec, param_spec_map};
use crate::report::JobReport;
use crate::retry::RetryPolicy;
use crate::service::JobService;
use crate::trigger::JobTrigger;
use crate::validation::{
    FieldPath, MSG_NOT_EMPTY, Validate, Violations, check_each, check_not_empty,
    duplicate_indexes,
};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{LazyLock, OnceLock};

static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)(m|k|M|G|T|P|E|Ki|Mi|Gi|Ti|Pi|Ei|[eE][+-]?\d+)?$")
        .expect("quantity pattern is valid")
});

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    param_specs: Vec<ParamSpec>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default = "default_true")]
    pub retrieve_source: bool,
    #[serde(default)]
    pub clone_depth: Option<u32>,
    #[serde(default)]
    pub submodule_credentials: Vec<SubmoduleCredential>,
    #[serde(default)]
    pub job_dependencies: Vec<JobDependency>,
    #[serde(default)]
    pub project_dependencies: Vec<ProjectDependency>,
    #[serde(default)]
    pub services: Vec<JobService>,
    /// Files to publish as artifacts, relative to the job workspace.
    #[serde(default)]
    pub artifacts: Option<String>,
    #[serde(default)]
    pub reports: Vec<JobReport>,
    #[serde(default)]
    pub triggers: Vec<JobTrigger>,
    #[serde(default)]
    pub caches: Vec<CacheSpec>,
    #[serde(default = "default_cpu")]
    pub cpu_requirement: String,
    #[serde(default = "default_memory")]
    pub memory_requirement: String,
    /// Timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub post_build_actions: Vec<PostBuildAction>,
    #[serde(flatten)]
    pub retry: RetryPolicy,

    #[serde(skip)]
    param_spec_map: OnceLock<HashMap<String, ParamSpec>>,
}

impl Job {
    /// Prefix of job selections, e.g. `jobs/build`.
    pub const SELECTION_PREFIX: &'static str = "jobs/";

    /// Fields whose values may reference `@variables@`.
    pub const INTERPOLATIVE_FIELDS: &'static [&'static str] = &[
        "image",
        "commands",
        "artifacts",
        "cpu_requirement",
        "memory_requirement",
    ];

    pub fn new(name: impl Into<String>, image: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            name: name.into(),
            param_specs: vec![],
            image: image.into(),
            commands,
            retrieve_source: true,
            clone_depth: None,
            submodule_credentials: vec![],
            job_dependencies: vec![],
            project_dependencies: vec![],
            services: vec![],
            artifacts: None,
            reports: vec![],
            triggers: vec![],
            caches: vec![],
            cpu_requirement: default_cpu(),
            memory_requirement: default_memory(),
            timeout: default_timeout(),
            post_build_actions: vec![],
            retry: RetryPolicy::default(),
            param_spec_map: OnceLock::new(),
        }
    }

    pub fn param_specs(&self) -> &[ParamSpec] {
        &self.param_specs
    }

    /// Replace the parameter specs and drop the memoized lookup.
    pub fn set_param_specs(&mut self, param_specs: Vec<ParamSpec>) {
        self.param_specs = param_specs;
        self.param_spec_map = OnceLock::new();
    }

    pub fn with_param_specs(mut self, param_specs: Vec<ParamSpec>) -> Self {
        self.set_param_specs(param_specs);
        self
    }

    /// Parameter specs keyed by name, built on first use and then reused.
    pub fn param_spec_map(&self) -> &HashMap<String, ParamSpec> {
        self.param_spec_map
            .get_or_init(|| param_spec_map(&self.param_specs))
    }

    /// First trigger, in declaration order, that fires for `event`.
    pub fn matched_trigger(&self, event: &ProjectEvent) -> Option<&JobTrigger> {
        let matched = self.triggers.iter().find(|t| t.matches(event, self));
        match matched {
            Some(trigger) => {
                tracing::debug!(job = %self.name, event = event.kind(), trigger = trigger.kind(), "Trigger matched");
            }
            None => {
                tracing::trace!(job = %self.name, event = event.kind(), "No trigger matched");
            }
        }
        matched
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn is_interpolative(field: &str) -> bool {
        Self::INTERPOLATIVE_FIELDS.contains(&field)
    }

    /// Names of the jobs this job depends on, in declaration order.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.job_dependencies.iter().map(|d| d.job_name.as_str())
    }

    fn check_caches(&self, path: &FieldPath, violations: &mut Violations) {
        let caches = path.field("caches");
        check_each(&self.caches, &caches, violations);
        // Key and path collisions are tracked independently.
        for (i, key) in duplicate_indexes(self.caches.iter().map(|c| c.key.as_str())) {
            violations.push(caches.index(i).field("key"), format!("Duplicate key: {}", key));
        }
        for (i, cache_path) in duplicate_indexes(self.caches.iter().map(|c| c.path.as_str())) {
            violations.push(
                caches.index(i).field("path"),
                format!("Duplicate path: {}", cache_path),
            );
        }
    }

    fn check_dependencies(&self, path: &FieldPath, violations: &mut Violations) {
        let deps = path.field("job_dependencies");
        check_each(&self.job_dependencies, &deps, violations);
        for (i, name) in duplicate_indexes(self.dependency_names()) {
            violations.push(
                deps.index(i).field("job_name"),
                format!("Duplicate dependency: {}", name),
            );
        }
        check_each(
            &self.project_dependencies,
            &path.field("project_dependencies"),
            violations,
        );
    }

    fn check_param_specs(&self, path: &FieldPath, violations: &mut Violations) {
        let specs = path.field("param_specs");
        check_each(&self.param_specs, &specs, violations);
        for (i, name) in duplicate_indexes(self.param_specs.iter().map(|p| p.name.as_str())) {
            violations.push(
                specs.index(i).field("name"),
                format!("Duplicate parameter spec: {}", name),
            );
        }
    }

    fn check_source_retrieval(&self, path: &FieldPath, violations: &mut Violations) {
        if !self.retrieve_source {
            return;
        }
        if self.clone_depth == Some(0) {
            violations.push(path.field("clone_depth"), "Clone depth must be positive");
        }
        let credentials = path.field("submodule_credentials");
        for (i, credential) in self.submodule_credentials.iter().enumerate() {
            if !credential.has_http_url() {
                violations.push(
                    credentials.index(i).field("url"),
                    "Can only provide credentials for submodules accessing via http/https",
                );
            }
        }
    }

    fn check_execution(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.image, path.field("image"), violations);
        check_interpolation(&self.image, path.field("image"), violations);

        let commands = path.field("commands");
        if self.commands.is_empty() {
            violations.push(commands.clone(), MSG_NOT_EMPTY);
        }
        for (i, command) in self.commands.iter().enumerate() {
            check_interpolation(command, commands.index(i), violations);
        }

        if let Some(artifacts) = &self.artifacts {
            check_interpolation(artifacts, path.field("artifacts"), violations);
        }

        let services = path.field("services");
        check_each(&self.services, &services, violations);
        for (i, name) in duplicate_indexes(self.services.iter().map(|s| s.name.as_str())) {
            violations.push(
                services.index(i).field("name"),
                format!("Duplicate service: {}", name),
            );
        }

        let reports = path.field("reports");
        check_each(&self.reports, &reports, violations);
        for (i, name) in duplicate_indexes(self.reports.iter().map(JobReport::report_name)) {
            violations.push(
                reports.index(i).field("report_name"),
                format!("Duplicate report: {}", name),
            );
        }
    }

    fn check_resources(&self, path: &FieldPath, violations: &mut Violations) {
        for (field, value) in [
            ("cpu_requirement", &self.cpu_requirement),
            ("memory_requirement", &self.memory_requirement),
        ] {
            let field_path = path.field(field);
            if value.trim().is_empty() {
                violations.push(field_path, MSG_NOT_EMPTY);
            } else if interpolation::has_variables(value) {
                check_interpolation(value, field_path, violations);
            } else if !QUANTITY.is_match(value.trim()) {
                violations.push(field_path, format!("Invalid resource quantity: {}", value));
            }
        }
        if self.timeout == 0 {
            violations.push(path.field("timeout"), "Timeout must be positive");
        }
    }
}

fn check_interpolation(value: &str, path: FieldPath, violations: &mut Violations) {
    if let Err(e) = interpolation::parse(value) {
        violations.push(path, e.to_string());
    }
}

impl Validate for Job {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.name, path.field("name"), violations);
        self.check_execution(path, violations);
        self.check_caches(path, violations);
        self.check_dependencies(path, violations);
        self.check_param_specs(path, violations);
        self.check_source_retrieval(path, violations);
        check_each(&self.triggers, &path.field("triggers"), violations);
        self.check_resources(path, violations);
        check_each(
            &self.post_build_actions,
            &path.field("post_build_actions"),
            violations,
        );
        self.retry.check(path, violations);
    }
}

fn default_true() -> bool {
    true
}

fn default_cpu() -> String {
    "250m".to_string()
}

fn default_memory() -> String {
    "128m".to_string()
}

fn default_timeout() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ProjectEvent;
    use pretty_assertions::assert_eq;

    fn job() -> Job {
        Job::new("build", "rust:1.85", vec!["cargo build".into()])
    }

    #[test]
    fn test_defaults() {
        let job: Job = serde_yaml::from_str(
            "name: build\nimage: rust\ncommands: [cargo build]\n",
        )
        .unwrap();
        assert!(job.retrieve_source);
        assert_eq!(job.cpu_requirement, "250m");
        assert_eq!(job.memory_requirement, "128m");
        assert_eq!(job.timeout, 3600);
        assert_eq!(job.retry, RetryPolicy::default());
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_missing_required_fields_are_violations() {
        let job: Job = serde_yaml::from_str("retrieve_source: false").unwrap();
        let err = job.validate().unwrap_err();
        let paths: Vec<String> = err.iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["name", "image", "commands"]);
    }

    #[test]
    fn test_param_spec_map_is_memoized() {
        let job = job().with_param_specs(vec![ParamSpec::text("a"), ParamSpec::text("b")]);
        let first = job.param_spec_map();
        let second = job.param_spec_map();
        assert_eq!(first.len(), 2);
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_param_spec_map_invalidated_on_set() {
        let mut job = job().with_param_specs(vec![ParamSpec::text("a")]);
        assert_eq!(job.param_spec_map().len(), 1);
        job.set_param_specs(vec![ParamSpec::text("x"), ParamSpec::text("y")]);
        assert!(job.param_spec_map().contains_key("y"));
        assert_eq!(job.param_spec_map().len(), 2);
    }

    #[test]
    fn test_first_matching_trigger_wins() {
        let mut job = job();
        job.triggers = vec![
            JobTrigger::TagCreate { tags: vec![] },
            JobTrigger::BranchUpdate {
                branches: vec!["main".into()],
                paths: vec![],
            },
            JobTrigger::BranchUpdate {
                branches: vec![],
                paths: vec![],
            },
        ];
        let event = ProjectEvent::RefUpdated {
            ref_name: "refs/heads/main".into(),
            old_commit: "aa".parse().unwrap(),
            new_commit: "bb".parse().unwrap(),
            changed_files: vec![],
        };
        let matched = job.matched_trigger(&event).unwrap();
        assert!(std::ptr::eq(matched, &job.triggers[1]));
    }

    #[test]
    fn test_no_triggers_no_match() {
        let event = ProjectEvent::Manual { user: None };
        assert!(job().matched_trigger(&event).is_none());
    }

    #[test]
    fn test_resource_quantities() {
        let mut job = job();
        job.cpu_requirement = "2 cores".into();
        job.memory_requirement = "@param:memory@".into();
        let err = job.validate().unwrap_err();
        assert_eq!(
            err.messages_at(&FieldPath::root().field("cpu_requirement")),
            vec!["Invalid resource quantity: 2 cores"]
        );
        assert!(
            err.messages_at(&FieldPath::root().field("memory_requirement"))
                .is_empty()
        );

        job.cpu_requirement = "1.5".into();
        job.memory_requirement = "2Gi".into();
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_interpolation_errors_attributed_to_command() {
        let mut job = job();
        job.commands = vec!["echo ok".into(), "echo @oops".into()];
        let err = job.validate().unwrap_err();
        assert_eq!(
            err.messages_at(&"commands[1]".parse().unwrap()),
            vec!["Unterminated variable starting at position 5"]
        );
    }

    #[test]
    fn test_clone_depth_and_timeout() {
        let mut job = job();
        job.clone_depth = Some(0);
        job.timeout = 0;
        assert_eq!(job.validate().unwrap_err().len(), 2);

        job.retrieve_source = false;
        assert_eq!(job.validate().unwrap_err().len(), 1);
    }

    #[test]
    fn test_interpolative_fields() {
        assert!(Job::is_interpolative("image"));
        assert!(Job::is_interpolative("memory_requirement"));
        assert!(!Job::is_interpolative("name"));
    }
}
