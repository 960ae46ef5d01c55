//! In-memory gallery for testing and ephemeral use.

use std::sync::RwLock;

use crate::error::GalleryError;
use crate::record::IdentityRecord;
use crate::store::{GalleryResult, GalleryStore};

/// An in-memory gallery that keeps records in enrollment order.
pub struct MemoryGallery {
    dim: usize,
    records: RwLock<Vec<IdentityRecord>>,
}

impl MemoryGallery {
    /// Create an empty gallery for `dim`-dimensional embeddings.
    pub fn new(dim: usize) -> GalleryResult<Self> {
        if dim == 0 {
            return Err(GalleryError::InvalidRecord("dim must be positive".into()));
        }
        Ok(Self {
            dim,
            records: RwLock::new(Vec::new()),
        })
    }
}

impl GalleryStore for MemoryGallery {
    fn dim(&self) -> usize {
        self.dim
    }

    fn snapshot(&self) -> GalleryResult<Vec<IdentityRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        Ok(records.clone())
    }

    fn get(&self, id: &str) -> GalleryResult<Option<IdentityRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    fn upsert(&self, record: IdentityRecord) -> GalleryResult<()> {
        record.validate(self.dim)?;
        let mut records = self
            .records
            .write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record,
            None => records.push(record),
        }
        Ok(())
    }

    fn update(&self, id: &str, f: &mut dyn FnMut(&mut IdentityRecord)) -> GalleryResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let slot = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| GalleryError::NotFound(id.to_string()))?;
        let mut record = slot.clone();
        f(&mut record);
        record.validate(self.dim)?;
        *slot = record;
        Ok(())
    }

    fn remove(&self, id: &str) -> GalleryResult<Option<IdentityRecord>> {
        let mut records = self
            .records
            .write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        Ok(records
            .iter()
            .position(|r| r.id == id)
            .map(|idx| records.remove(idx)))
    }

    fn len(&self) -> GalleryResult<usize> {
        let records = self
            .records
            .read()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        Ok(records.len())
    }
}
