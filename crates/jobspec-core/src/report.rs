//! Reports published from job output.

use crate::validation::{FieldPath, Validate, Violations, check_not_empty};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobReport {
    Junit {
        report_name: String,
        file_patterns: String,
    },
    Checkstyle {
        report_name: String,
        file_patterns: String,
    },
    Jest {
        report_name: String,
        file_patterns: String,
    },
    Clover {
        report_name: String,
        file_patterns: String,
    },
    Markdown {
        report_name: String,
        file_patterns: String,
        start_page: String,
    },
}

impl JobReport {
    pub fn report_name(&self) -> &str {
        match self {
            JobReport::Junit { report_name, .. }
            | JobReport::Checkstyle { report_name, .. }
            | JobReport::Jest { report_name, .. }
            | JobReport::Clover { report_name, .. }
            | JobReport::Markdown { report_name, .. } => report_name,
        }
    }

    pub fn file_patterns(&self) -> &str {
        match self {
            JobReport::Junit { file_patterns, .. }
            | JobReport::Checkstyle { file_patterns, .. }
            | JobReport::Jest { file_patterns, .. }
            | JobReport::Clover { file_patterns, .. }
            | JobReport::Markdown { file_patterns, .. } => file_patterns,
        }
    }
}

impl Validate for JobReport {
    fn check(&self, path: &FieldPath, violations: &mut Violations) {
        check_not_empty(self.report_name(), path.field("report_name"), violations);
        check_not_empty(self.file_patterns(), path.field("file_patterns"), violations);
        if let JobReport::Markdown { start_page, .. } = self {
            check_not_empty(start_page, path.field("start_page"), violations);
        }
    }
}
