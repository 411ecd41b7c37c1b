//! Actions performed after a build finishes.

use crate::param::{ParamSupply, check_supplies};
use crate::validation::{FieldPath, Validate, Violations, check_not_empty};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An action gated by a condition over the finished build.
///
/// `condition` is evaluated by the external condition evaluator, the same one
/// that handles retry conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PostBuildAction {
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(flatten)]
    pub kind: PostBuildActionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostBuildActionKind {
    CreateTag {
        tag_name: String,
        #[serde(default)]
        tag_message: Option<String>,
    },
    RunJob {
        job_name: String,
        #[serde(default)]
        job_params: Vec<ParamSupply>,
    },
    SendNotification {
        receivers: String,
    },
}

impl PostBuildAction {
    /// Name of the job this action runs, if it runs one.
    pub fn run_job_name(&self) -> Option<&str> {
        match &self.kind {
            PostBuildActionKind::RunJob { job_name, .. } => Some(job_name),
            _ => None,
        }
    }
}

impl Validate for PostBuildAction {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.condition, path.field("condition"), violations);
        match &self.kind {
            PostBuildActionKind::CreateTag { tag_name, .. } => {
                check_not_empty(tag_name, path.field("tag_name"), violations);
            }
            PostBuildActionKind::RunJob {
                job_name,
                job_params,
            } => {
                check_not_empty(job_name, path.field("job_name"), violations);
                check_supplies(job_params, &path.field("job_params"), violations);
            }
            PostBuildActionKind::SendNotification { receivers } => {
                check_not_empty(receivers, path.field("receivers"), violations);
            }
        }
    }
}

fn default_condition() -> String {
    "successful".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_condition() {
        let action: PostBuildAction =
            serde_yaml::from_str("type: create_tag\ntag_name: v1.0\n").unwrap();
        assert_eq!(action.condition, "successful");
        assert!(action.run_job_name().is_none());
        assert!(action.validate().is_ok());
    }

    #[test]
    fn test_run_job_action() {
        let action: PostBuildAction = serde_yaml::from_str(
            "condition: failed\ntype: run_job\njob_name: notify\n",
        )
        .unwrap();
        assert_eq!(action.run_job_name(), Some("notify"));
    }

    #[test]
    fn test_empty_receivers() {
        let action = PostBuildAction {
            condition: "".into(),
            kind: PostBuildActionKind::SendNotification {
                receivers: "".into(),
            },
        };
        assert_eq!(action.validate().unwrap_err().len(), 2);
    }
}
