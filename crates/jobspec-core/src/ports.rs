//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the core domain and external adapters.

use crate::blob::PackBlobReference;
use crate::ids::{PackBlobId, PackBlobReferenceId, PackId};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::RwLock;

/// Repository for pack blob references.
#[async_trait]
pub trait PackBlobReferenceRepository: Send + Sync {
    /// Register a new reference from a pack to a blob.
    async fn create(&self, reference: &PackBlobReference) -> Result<()>;

    /// Get a reference to `blob` that is not pending delete, if any.
    async fn find_not_pending_delete(&self, blob: PackBlobId) -> Result<Option<PackBlobReference>>;

    /// Get the live reference of `pack` to `blob`, if any.
    async fn find_live(&self, pack: PackId, blob: PackBlobId) -> Result<Option<PackBlobReference>>;
}

/// Reuse the live reference of `pack` to `blob`, or create one.
///
/// "Not found" means a fresh reference is safe to create. References that are
/// pending delete are never returned.
pub async fn ensure_reference<R>(repo: &R, pack: PackId, blob: PackBlobId) -> Result<PackBlobReference>
where
    R: PackBlobReferenceRepository + ?Sized,
{
    if let Some(existing) = repo.find_live(pack, blob).await? {
        return Ok(existing);
    }
    let reference = PackBlobReference::new(pack, blob);
    repo.create(&reference).await?;
    tracing::debug!(reference = %reference.id, pack = %pack, blob = %blob, "Created blob reference");
    Ok(reference)
}

/// In-memory reference store, for tests and single-process use.
#[derive(Debug, Default)]
pub struct MemoryPackBlobReferenceRepository {
    references: RwLock<Vec<PackBlobReference>>,
}

impl MemoryPackBlobReferenceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a reference for deletion. Returns whether it existed.
    pub fn mark_pending_delete(&self, id: PackBlobReferenceId) -> Result<bool> {
        let mut references = self.references.write().map_err(poisoned)?;
        match references.iter_mut().find(|r| r.id == id) {
            Some(reference) => {
                reference.pending_delete = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.references.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Internal("blob reference store lock poisoned".to_string())
}

#[async_trait]
impl PackBlobReferenceRepository for MemoryPackBlobReferenceRepository {
    async fn create(&self, reference: &PackBlobReference) -> Result<()> {
        let mut references = self.references.write().map_err(poisoned)?;
        let duplicate = references.iter().any(|r| {
            r.is_live() && r.pack_id == reference.pack_id && r.blob_id == reference.blob_id
        });
        if duplicate {
            return Err(Error::BlobReference(format!(
                "pack {} already references blob {}",
                reference.pack_id, reference.blob_id
            )));
        }
        references.push(reference.clone());
        Ok(())
    }

    async fn find_not_pending_delete(&self, blob: PackBlobId) -> Result<Option<PackBlobReference>> {
        let references = self.references.read().map_err(poisoned)?;
        Ok(references
            .iter()
            .find(|r| r.blob_id == blob && r.is_live())
            .cloned())
    }

    async fn find_live(&self, pack: PackId, blob: PackBlobId) -> Result<Option<PackBlobReference>> {
        let references = self.references.read().map_err(poisoned)?;
        Ok(references
            .iter()
            .find(|r| r.pack_id == pack && r.blob_id == blob && r.is_live())
            .cloned())
    }
}
