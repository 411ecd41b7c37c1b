//! Cache slot declarations.

use crate::validation::{FieldPath, Validate, Violations, check_not_empty};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A best-effort reusable directory, restored before and saved after a job.
///
/// Jobs must not rely on the cache being present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CacheSpec {
    pub key: String,
    pub path: String,
}

impl CacheSpec {
    pub fn new(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }
}

impl Validate for CacheSpec {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.key, path.field("key"), violations);
        check_not_empty(&self.path, path.field("path"), violations);
    }
}
