//! Strongly-typed identifiers.

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let uuid_str = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }
    };
}

define_id!(PackBlobId, "blb");
define_id!(PackBlobReferenceId, "bref");
define_id!(PackId, "pck");

/// A git object id in lowercase hex.
///
/// Accepts abbreviated ids; the only requirement is a non-empty run of up to
/// 64 hex digits (SHA-1 and SHA-256 repositories).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    /// Id git uses for the "other side" of a ref creation or deletion.
    pub const ZERO: &'static str = "0000000000000000000000000000000000000000";

    pub fn zero() -> Self {
        Self(Self::ZERO.to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CommitId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.len() > 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidCommitId(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }
}

impl<'de> Deserialize<'de> for CommitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_id_display() {
        let id = PackBlobId::new();
        assert!(id.to_string().starts_with("blb_"));
    }

    #[test]
    fn test_blob_reference_id_parse() {
        let id = PackBlobReferenceId::new();
        let parsed: PackBlobReferenceId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_commit_id_normalizes_case() {
        let id: CommitId = "ABC123".parse().unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_commit_id_rejects_garbage() {
        assert!("".parse::<CommitId>().is_err());
        assert!("not-a-sha".parse::<CommitId>().is_err());
        assert!("a".repeat(65).parse::<CommitId>().is_err());
    }

    #[test]
    fn test_commit_id_zero() {
        assert!(CommitId::zero().is_zero());
        assert!(!"abc".parse::<CommitId>().unwrap().is_zero());
    }

    #[test]
    fn test_commit_id_deserialize_validates() {
        let ok: CommitId = serde_json::from_str("\"deadBEEF\"").unwrap();
        assert_eq!(ok.as_str(), "deadbeef");
        assert!(serde_json::from_str::<CommitId>("\"xyz\"").is_err());
    }
}
