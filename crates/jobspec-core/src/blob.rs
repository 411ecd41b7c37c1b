//! References from packages to content-addressed blobs.
//!
//! A blob may be garbage-collected once no live reference points at it. A
//! reference marked pending-delete is on its way out and must never be
//! handed back to a new consumer.

use crate::ids::{PackBlobId, PackBlobReferenceId, PackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackBlobReference {
    pub id: PackBlobReferenceId,
    pub pack_id: PackId,
    pub blob_id: PackBlobId,
    #[serde(default)]
    pub pending_delete: bool,
    pub created_at: DateTime<Utc>,
}

impl PackBlobReference {
    pub fn new(pack_id: PackId, blob_id: PackBlobId) -> Self {
        Self {
            id: PackBlobReferenceId::new(),
            pack_id,
            blob_id,
            pending_delete: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_live(&self) -> bool {
        !self.pending_delete
    }
}
