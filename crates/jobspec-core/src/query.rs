//! Build search query fragments.
//!
//! Produces queries in the build-search grammar: quoted field names and
//! literals, `is` for equality and `and` as connective.

use crate::error::{Error, Result};
use crate::ids::CommitId;

pub const FIELD_COMMIT: &str = "Commit";
pub const FIELD_JOB: &str = "Job";

const IS: &str = "is";
const AND: &str = "and";

/// Quote a literal, escaping embedded quotes and backslashes.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Query selecting builds of `job_name` at `commit`.
pub fn build_query(commit: &CommitId, job_name: &str) -> Result<String> {
    if job_name.trim().is_empty() {
        return Err(Error::InvalidArgument("job name may not be empty".to_string()));
    }
    Ok(format!(
        "{} {} {} {} {} {} {}",
        quote(FIELD_COMMIT),
        IS,
        quote(commit.as_str()),
        AND,
        quote(FIELD_JOB),
        IS,
        quote(job_name)
    ))
}
