use std::fmt;

use crate::error::GalleryError;
use crate::record::IdentityRecord;

/// Result type for gallery operations.
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Durable collection of enrolled identities.
///
/// Implementations must be safe for concurrent use. Writers are serialized
/// and every record mutation is applied as a whole, so [`GalleryStore::snapshot`]
/// never returns a half-updated record.
pub trait GalleryStore: Send + Sync {
    /// Embedding dimensionality enforced on writes.
    fn dim(&self) -> usize;

    /// Return a consistent copy of every record, active or not.
    fn snapshot(&self) -> GalleryResult<Vec<IdentityRecord>>;

    /// Get a record by id.
    fn get(&self, id: &str) -> GalleryResult<Option<IdentityRecord>>;

    /// Insert a new record or replace the record with the same id.
    /// The record is validated against [`GalleryStore::dim`] first.
    fn upsert(&self, record: IdentityRecord) -> GalleryResult<()>;

    /// Remove a record. Returns the removed record, or `None` if absent.
    fn remove(&self, id: &str) -> GalleryResult<Option<IdentityRecord>>;

    /// Apply `f` to the record with the given id and store the result.
    ///
    /// Read, modify and write happen under the store's write lock (or in one
    /// write transaction), so concurrent updates to the same record are never
    /// lost. The modified record is validated before it is stored.
    fn update(&self, id: &str, f: &mut dyn FnMut(&mut IdentityRecord)) -> GalleryResult<()>;

    /// Replace the display metadata of a record.
    fn update_profile(&self, id: &str, name: &str, position: &str) -> GalleryResult<()> {
        self.update(id, &mut |r: &mut IdentityRecord| {
            r.name = name.to_string();
            r.position = position.to_string();
        })
    }

    /// Mark a record active or inactive.
    fn set_active(&self, id: &str, active: bool) -> GalleryResult<()> {
        self.update(id, &mut |r: &mut IdentityRecord| r.active = active)
    }

    /// Number of records, active or not.
    fn len(&self) -> GalleryResult<usize> {
        Ok(self.snapshot()?.len())
    }

    /// Return true if the gallery has no records.
    fn is_empty(&self) -> GalleryResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of records eligible for matching.
    fn active_count(&self) -> GalleryResult<usize> {
        Ok(self.snapshot()?.iter().filter(|r| r.active).count())
    }
}

impl fmt::Debug for dyn GalleryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GalleryStore {{ dim: {} }}", self.dim())
    }
}
