//! Repository and build events that may fire job triggers.

use crate::ids::CommitId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const BRANCH_REF_PREFIX: &str = "refs/heads/";
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// An event in a project, as seen by trigger matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectEvent {
    RefUpdated {
        ref_name: String,
        old_commit: CommitId,
        new_commit: CommitId,
        #[serde(default)]
        changed_files: Vec<String>,
    },
    PullRequest {
        action: PullRequestAction,
        source_branch: String,
        target_branch: String,
        #[serde(default)]
        changed_files: Vec<String>,
    },
    BuildFinished {
        job_name: String,
        status: BuildStatus,
        #[serde(default)]
        ref_name: Option<String>,
    },
    ScheduledTimeReached {
        cron_expression: String,
        branch: String,
    },
    Manual {
        #[serde(default)]
        user: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    Updated,
    Merged,
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    Successful,
    Failed,
    Cancelled,
    TimedOut,
}

impl ProjectEvent {
    /// Short name of the event kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProjectEvent::RefUpdated { .. } => "ref_updated",
            ProjectEvent::PullRequest { .. } => "pull_request",
            ProjectEvent::BuildFinished { .. } => "build_finished",
            ProjectEvent::ScheduledTimeReached { .. } => "scheduled_time_reached",
            ProjectEvent::Manual { .. } => "manual",
        }
    }

    /// Branch updated by a `RefUpdated` event, if the ref is a branch.
    pub fn updated_branch(&self) -> Option<&str> {
        match self {
            ProjectEvent::RefUpdated { ref_name, .. } => ref_name.strip_prefix(BRANCH_REF_PREFIX),
            _ => None,
        }
    }

    /// Tag updated by a `RefUpdated` event, if the ref is a tag.
    pub fn updated_tag(&self) -> Option<&str> {
        match self {
            ProjectEvent::RefUpdated { ref_name, .. } => ref_name.strip_prefix(TAG_REF_PREFIX),
            _ => None,
        }
    }
}
