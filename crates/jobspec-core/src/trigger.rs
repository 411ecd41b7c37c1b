//! Job triggers.
//!
//! A job's triggers are evaluated in declaration order and the first one that
//! matches an event wins, so the order triggers are declared in is significant.

use crate::event::{BuildStatus, ProjectEvent, PullRequestAction};
use crate::job::Job;
use crate::patterns;
use crate::validation::{FieldPath, Validate, Violations, check_not_empty};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Condition under which a job runs automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobTrigger {
    /// A branch received new commits.
    BranchUpdate {
        #[serde(default)]
        branches: Vec<String>,
        #[serde(default)]
        paths: Vec<String>,
    },
    /// A tag was created.
    TagCreate {
        #[serde(default)]
        tags: Vec<String>,
    },
    /// A pull request targeting a matching branch was opened or changed.
    PullRequest {
        #[serde(default)]
        branches: Vec<String>,
        #[serde(default)]
        paths: Vec<String>,
        #[serde(default)]
        actions: Vec<PullRequestAction>,
    },
    /// A build of one of the job's dependencies finished.
    DependencyFinished {
        #[serde(default = "default_true")]
        require_successful: bool,
    },
    /// A cron schedule fired for a branch.
    Schedule {
        cron_expression: String,
        #[serde(default)]
        branches: Vec<String>,
    },
}

const DEFAULT_PULL_REQUEST_ACTIONS: [PullRequestAction; 2] =
    [PullRequestAction::Opened, PullRequestAction::Updated];

impl JobTrigger {
    /// Whether `event` fires this trigger for `job`.
    pub fn matches(&self, event: &ProjectEvent, job: &Job) -> bool {
        match (self, event) {
            (
                JobTrigger::BranchUpdate { branches, paths },
                ProjectEvent::RefUpdated {
                    new_commit,
                    changed_files,
                    ..
                },
            ) => {
                let Some(branch) = event.updated_branch() else {
                    return false;
                };
                !new_commit.is_zero()
                    && patterns::matches_any(branches, branch)
                    && patterns::touches_any(paths, changed_files)
            }
            (
                JobTrigger::TagCreate { tags },
                ProjectEvent::RefUpdated {
                    old_commit,
                    new_commit,
                    ..
                },
            ) => {
                let Some(tag) = event.updated_tag() else {
                    return false;
                };
                old_commit.is_zero() && !new_commit.is_zero() && patterns::matches_any(tags, tag)
            }
            (
                JobTrigger::PullRequest {
                    branches,
                    paths,
                    actions,
                },
                ProjectEvent::PullRequest {
                    action,
                    target_branch,
                    changed_files,
                    ..
                },
            ) => {
                let action_matches = if actions.is_empty() {
                    DEFAULT_PULL_REQUEST_ACTIONS.contains(action)
                } else {
                    actions.contains(action)
                };
                action_matches
                    && patterns::matches_any(branches, target_branch)
                    && patterns::touches_any(paths, changed_files)
            }
            (
                JobTrigger::DependencyFinished { require_successful },
                ProjectEvent::BuildFinished {
                    job_name, status, ..
                },
            ) => {
                job.job_dependencies.iter().any(|d| &d.job_name == job_name)
                    && (!require_successful || *status == BuildStatus::Successful)
            }
            (
                JobTrigger::Schedule {
                    cron_expression,
                    branches,
                },
                ProjectEvent::ScheduledTimeReached {
                    cron_expression: fired,
                    branch,
                },
            ) => {
                normalize_cron(cron_expression) == normalize_cron(fired)
                    && patterns::matches_any(branches, branch)
            }
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JobTrigger::BranchUpdate { .. } => "branch_update",
            JobTrigger::TagCreate { .. } => "tag_create",
            JobTrigger::PullRequest { .. } => "pull_request",
            JobTrigger::DependencyFinished { .. } => "dependency_finished",
            JobTrigger::Schedule { .. } => "schedule",
        }
    }

    /// Parsed cron schedule of a schedule trigger.
    pub fn cron_schedule(&self) -> Option<cron::Schedule> {
        match self {
            JobTrigger::Schedule {
                cron_expression, ..
            } => cron::Schedule::from_str(cron_expression).ok(),
            _ => None,
        }
    }
}

fn normalize_cron(expression: &str) -> String {
    expression.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn check_patterns(patterns: &[String], path: &FieldPath, violations: &mut Violations) {
    for (i, pattern) in patterns.iter().enumerate() {
        if let Err(reason) = patterns::check(pattern) {
            violations.push(path.index(i), format!("Malformed pattern '{}': {}", pattern, reason));
        }
    }
}

impl Validate for JobTrigger {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        match self {
            JobTrigger::BranchUpdate { branches, paths } => {
                check_patterns(branches, &path.field("branches"), violations);
                check_patterns(paths, &path.field("paths"), violations);
            }
            JobTrigger::TagCreate { tags } => {
                check_patterns(tags, &path.field("tags"), violations);
            }
            JobTrigger::PullRequest {
                branches, paths, ..
            } => {
                check_patterns(branches, &path.field("branches"), violations);
                check_patterns(paths, &path.field("paths"), violations);
            }
            JobTrigger::DependencyFinished { .. } => {}
            JobTrigger::Schedule {
                cron_expression,
                branches,
            } => {
                let cron_path = path.field("cron_expression");
                if cron_expression.trim().is_empty() {
                    check_not_empty(cron_expression, cron_path, violations);
                } else if let Err(e) = cron::Schedule::from_str(cron_expression) {
                    violations.push(cron_path, format!("Invalid cron expression: {}", e));
                }
                check_patterns(branches, &path.field("branches"), violations);
            }
        }
    }
}

impl fmt::Display for JobTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(items: &[String]) -> String {
            if items.is_empty() {
                "any".to_string()
            } else {
                items.join(", ")
            }
        }
        match self {
            JobTrigger::BranchUpdate { branches, paths } => write!(
                f,
                "branch update (branches: {}; paths: {})",
                list(branches),
                list(paths)
            ),
            JobTrigger::TagCreate { tags } => write!(f, "tag create (tags: {})", list(tags)),
            JobTrigger::PullRequest {
                branches, paths, ..
            } => write!(
                f,
                "pull request (target branches: {}; paths: {})",
                list(branches),
                list(paths)
            ),
            JobTrigger::DependencyFinished { require_successful } => {
                if *require_successful {
                    write!(f, "dependency finished successfully")
                } else {
                    write!(f, "dependency finished")
                }
            }
            JobTrigger::Schedule {
                cron_expression,
                branches,
            } => write!(
                f,
                "schedule '{}' (branches: {})",
                cron_expression,
                list(branches)
            ),
        }
    }
}

fn default_true() -> bool {
    true
}
