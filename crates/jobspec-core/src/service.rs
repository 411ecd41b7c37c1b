//! Auxiliary service containers started alongside a job.

use crate::validation::{
    FieldPath, Validate, Violations, check_each, check_not_empty, duplicate_indexes,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobService {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub env_vars: Vec<EnvVar>,
    /// Command run inside the service container; exit code 0 means ready.
    pub readiness_check_command: String,
    #[serde(default = "default_cpu")]
    pub cpu_requirement: String,
    #[serde(default = "default_memory")]
    pub memory_requirement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnvVar {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Validate for EnvVar {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.name, path.field("name"), violations);
    }
}

impl Validate for JobService {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.name, path.field("name"), violations);
        check_not_empty(&self.image, path.field("image"), violations);
        check_not_empty(
            &self.readiness_check_command,
            path.field("readiness_check_command"),
            violations,
        );
        check_not_empty(&self.cpu_requirement, path.field("cpu_requirement"), violations);
        check_not_empty(&self.memory_requirement, path.field("memory_requirement"), violations);

        let env_path = path.field("env_vars");
        check_each(&self.env_vars, &env_path, violations);
        for (i, name) in duplicate_indexes(self.env_vars.iter().map(|e| e.name.as_str())) {
            violations.push(
                env_path.index(i).field("name"),
                format!("Duplicate environment variable: {}", name),
            );
        }
    }
}

fn default_cpu() -> String {
    "250m".to_string()
}

fn default_memory() -> String {
    "256Mi".to_string()
}
