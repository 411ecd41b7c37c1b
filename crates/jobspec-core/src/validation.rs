//! Accumulating validation with field attribution.
//!
//! Validation never stops at the first problem. Every check appends a
//! [`Violation`] carrying the [`FieldPath`] it concerns, so that a caller can
//! point at `caches[1].key` or `submodule_credentials[0].url` directly and a
//! user can fix a specification in a single edit cycle.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

pub const MSG_NOT_EMPTY: &str = "may not be empty";

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location of a value inside a specification, e.g. `jobs[2].caches[0].key`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.to_string()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether `self` equals `other` or lies underneath it.
    pub fn starts_with(&self, other: &FieldPath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for FieldPath {
    type Err = std::convert::Infallible;

    /// Parses the display form back, e.g. `caches[1].key`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut path = FieldPath::root();
        for part in s.split('.').filter(|p| !p.is_empty()) {
            let (name, rest) = part.split_once('[').unwrap_or((part, ""));
            if !name.is_empty() {
                path = path.field(name);
            }
            for index in rest.split('[') {
                if let Ok(i) = index.trim_end_matches(']').parse::<usize>() {
                    path = path.index(i);
                }
            }
        }
        Ok(path)
    }
}

/// A single structural problem found in a specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: FieldPath,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Ordered list of violations. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: FieldPath, message: impl Into<String>) {
        let violation = Violation {
            path,
            message: message.into(),
        };
        tracing::debug!(path = %violation.path, message = %violation.message, "Specification violation");
        self.0.push(violation);
    }

    pub fn extend(&mut self, other: Violations) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Messages reported exactly at `path`.
    pub fn messages_at(&self, path: &FieldPath) -> Vec<&str> {
        self.0
            .iter()
            .filter(|v| &v.path == path)
            .map(|v| v.message.as_str())
            .collect()
    }

    /// Violations at `path` or anywhere below it.
    pub fn under(&self, path: &FieldPath) -> Vec<&Violation> {
        self.0.iter().filter(|v| v.path.starts_with(path)).collect()
    }

    pub fn into_result(self) -> Result<(), Violations> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {}", violation)?;
        }
        Ok(())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Structural self-check for specification entities.
///
/// Implementors report into `violations` with paths built from `path`; they
/// never return early on the first failure.
pub trait Validate {
    fn check(&self, path: &FieldPath, violations: &mut Violations);

    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::new();
        self.check(&FieldPath::root(), &mut violations);
        violations.into_result()
    }
}

/// Check every entry of a list, attributing violations to `path[i]`.
pub fn check_each<T: Validate>(items: &[T], path: &FieldPath, violations: &mut Violations) {
    for (i, item) in items.iter().enumerate() {
        item.check(&path.index(i), violations);
    }
}

pub fn check_not_empty(value: &str, path: FieldPath, violations: &mut Violations) {
    if value.trim().is_empty() {
        violations.push(path, MSG_NOT_EMPTY);
    }
}

/// Indexes of entries whose key was already seen earlier in the sequence.
///
/// The first occurrence of a key is never reported; every later one is.
pub fn duplicate_indexes<'a, I>(keys: I) -> Vec<(usize, &'a str)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    keys.into_iter()
        .enumerate()
        .filter(|(_, key)| !seen.insert(*key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_display() {
        let path = FieldPath::root()
            .field("jobs")
            .index(2)
            .field("caches")
            .index(0)
            .field("key");
        assert_eq!(path.to_string(), "jobs[2].caches[0].key");
        assert_eq!(FieldPath::root().to_string(), "");
    }

    #[test]
    fn test_field_path_parse() {
        let path: FieldPath = "submodule_credentials[3].url".parse().unwrap();
        assert_eq!(
            path,
            FieldPath::root()
                .field("submodule_credentials")
                .index(3)
                .field("url")
        );
    }

    #[test]
    fn test_duplicate_indexes_skip_first_occurrence() {
        let dups = duplicate_indexes(["a", "b", "a", "a", "c"]);
        assert_eq!(dups, vec![(2, "a"), (3, "a")]);
    }

    #[test]
    fn test_violations_into_result() {
        assert!(Violations::new().into_result().is_ok());

        let mut violations = Violations::new();
        violations.push(FieldPath::root().field("name"), MSG_NOT_EMPTY);
        let err = violations.into_result().unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.to_string(), "  - name: may not be empty");
    }

    #[test]
    fn test_under_collects_nested_paths() {
        let caches = FieldPath::root().field("caches");
        let mut violations = Violations::new();
        violations.push(caches.index(0).field("key"), "a");
        violations.push(caches.index(1).field("path"), "b");
        violations.push(FieldPath::root().field("image"), "c");
        assert_eq!(violations.under(&caches).len(), 2);
    }
}
