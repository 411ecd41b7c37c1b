//! Retry policy embedded in a job.

use crate::validation::{FieldPath, Validate, Violations, check_not_empty};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const NEVER: &str = "never";

/// When and how often a failed build is re-run.
///
/// `retry_condition` is an expression over the build outcome evaluated by an
/// external condition evaluator. `max_retries` and `retry_delay` seed the
/// exponential back-off: the first retry waits `retry_delay` seconds and each
/// following one waits longer. Both are unsigned, so a negative count or delay
/// cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RetryPolicy {
    #[serde(default = "default_retry_condition")]
    pub retry_condition: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry, in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u32,
}

impl RetryPolicy {
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.retry_delay))
    }

    /// False when the condition is `never` or no retries are allowed.
    pub fn is_enabled(&self) -> bool {
        self.retry_condition.trim() != NEVER && self.max_retries > 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_condition: default_retry_condition(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

impl Validate for RetryPolicy {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(&self.retry_condition, path.field("retry_condition"), violations);
    }
}

fn default_retry_condition() -> String {
    NEVER.to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retry_condition, "never");
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay(), Duration::from_secs(30));
        assert!(!policy.is_enabled());
    }

    #[test]
    fn test_enabled() {
        let policy = RetryPolicy {
            retry_condition: "failed".into(),
            ..Default::default()
        };
        assert!(policy.is_enabled());
        let no_retries = RetryPolicy {
            max_retries: 0,
            ..policy
        };
        assert!(!no_retries.is_enabled());
    }

    #[test]
    fn test_negative_values_rejected_at_parse() {
        assert!(serde_yaml::from_str::<RetryPolicy>("max_retries: -1").is_err());
        assert!(serde_yaml::from_str::<RetryPolicy>("retry_delay: -5").is_err());
    }

    #[test]
    fn test_empty_condition() {
        let policy = RetryPolicy {
            retry_condition: "  ".into(),
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }
}
