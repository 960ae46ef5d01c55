//! Redb-backed gallery.

use std::path::Path;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::error::GalleryError;
use crate::record::IdentityRecord;
use crate::store::{GalleryResult, GalleryStore};

const IDENTITIES: TableDefinition<&str, &[u8]> = TableDefinition::new("identities");

/// A persistent gallery with one JSON-encoded record per identity id.
///
/// Each mutation runs in its own write transaction, which redb serializes;
/// readers get a consistent MVCC snapshot.
pub struct RedbGallery {
    dim: usize,
    db: Database,
}

impl RedbGallery {
    /// Open or create a gallery database at the given path.
    pub fn open<P: AsRef<Path>>(path: P, dim: usize) -> GalleryResult<Self> {
        if dim == 0 {
            return Err(GalleryError::InvalidRecord("dim must be positive".into()));
        }
        let db = Database::create(path).map_err(|e| GalleryError::Storage(e.to_string()))?;

        // Create the table if it doesn't exist.
        let tx = db
            .begin_write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        {
            let _ = tx
                .open_table(IDENTITIES)
                .map_err(|e| GalleryError::Storage(e.to_string()))?;
        }
        tx.commit().map_err(|e| GalleryError::Storage(e.to_string()))?;

        Ok(Self { dim, db })
    }
}

fn decode(data: &[u8]) -> GalleryResult<IdentityRecord> {
    serde_json::from_slice(data).map_err(|e| GalleryError::Serialization(e.to_string()))
}

impl GalleryStore for RedbGallery {
    fn dim(&self) -> usize {
        self.dim
    }

    fn snapshot(&self) -> GalleryResult<Vec<IdentityRecord>> {
        let tx = self
            .db
            .begin_read()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let table = tx
            .open_table(IDENTITIES)
            .map_err(|e| GalleryError::Storage(e.to_string()))?;

        let mut records = Vec::new();
        for item in table.iter().map_err(|e| GalleryError::Storage(e.to_string()))? {
            let (_key, value) = item.map_err(|e| GalleryError::Storage(e.to_string()))?;
            records.push(decode(value.value())?);
        }
        Ok(records)
    }

    fn get(&self, id: &str) -> GalleryResult<Option<IdentityRecord>> {
        let tx = self
            .db
            .begin_read()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let table = tx
            .open_table(IDENTITIES)
            .map_err(|e| GalleryError::Storage(e.to_string()))?;

        match table
            .get(id)
            .map_err(|e| GalleryError::Storage(e.to_string()))?
        {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    fn upsert(&self, record: IdentityRecord) -> GalleryResult<()> {
        record.validate(self.dim)?;
        let data =
            serde_json::to_vec(&record).map_err(|e| GalleryError::Serialization(e.to_string()))?;
        let tx = self
            .db
            .begin_write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        {
            let mut table = tx
                .open_table(IDENTITIES)
                .map_err(|e| GalleryError::Storage(e.to_string()))?;
            table
                .insert(record.id.as_str(), data.as_slice())
                .map_err(|e| GalleryError::Storage(e.to_string()))?;
        }
        tx.commit().map_err(|e| GalleryError::Storage(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, id: &str) -> GalleryResult<Option<IdentityRecord>> {
        let tx = self
            .db
            .begin_write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let removed = {
            let mut table = tx
                .open_table(IDENTITIES)
                .map_err(|e| GalleryError::Storage(e.to_string()))?;
            let old = table
                .remove(id)
                .map_err(|e| GalleryError::Storage(e.to_string()))?;
            old.map(|v| v.value().to_vec())
        };
        tx.commit().map_err(|e| GalleryError::Storage(e.to_string()))?;
        removed.as_deref().map(decode).transpose()
    }

    fn update(&self, id: &str, f: &mut dyn FnMut(&mut IdentityRecord)) -> GalleryResult<()> {
        let tx = self
            .db
            .begin_write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        {
            let mut table = tx
                .open_table(IDENTITIES)
                .map_err(|e| GalleryError::Storage(e.to_string()))?;
            let existing = table
                .get(id)
                .map_err(|e| GalleryError::Storage(e.to_string()))?
                .map(|v| v.value().to_vec());
            let Some(data) = existing else {
                return Err(GalleryError::NotFound(id.to_string()));
            };
            let mut record = decode(&data)?;
            f(&mut record);
            record.validate(self.dim)?;
            let data = serde_json::to_vec(&record)
                .map_err(|e| GalleryError::Serialization(e.to_string()))?;
            table
                .insert(id, data.as_slice())
                .map_err(|e| GalleryError::Storage(e.to_string()))?;
        }
        tx.commit().map_err(|e| GalleryError::Storage(e.to_string()))?;
        Ok(())
    }

    fn len(&self) -> GalleryResult<usize> {
        let tx = self
            .db
            .begin_read()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let table = tx
            .open_table(IDENTITIES)
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let n = table.len().map_err(|e| GalleryError::Storage(e.to_string()))?;
        Ok(n as usize)
    }
}
