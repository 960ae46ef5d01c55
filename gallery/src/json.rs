//! JSON-file gallery.
//!
//! The whole collection lives in one JSON array and is rewritten on every
//! mutation. Writes go to a sibling temp file that is renamed over the
//! original, so a crash mid-write leaves the previous version intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::error::GalleryError;
use crate::record::IdentityRecord;
use crate::store::{GalleryResult, GalleryStore};

/// A gallery persisted as a single JSON file.
///
/// Every read goes to disk, so edits made by other tools between calls are
/// picked up. Within this process, readers share a read lock and writers hold
/// the write lock for the whole read-modify-write cycle.
pub struct JsonGallery {
    dim: usize,
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonGallery {
    /// Open a gallery file, creating its parent directory if needed.
    /// A missing file is an empty gallery.
    pub fn open<P: AsRef<Path>>(path: P, dim: usize) -> GalleryResult<Self> {
        if dim == 0 {
            return Err(GalleryError::InvalidRecord("dim must be positive".into()));
        }
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| GalleryError::Storage(e.to_string()))?;
            }
        }
        Ok(Self {
            dim,
            path,
            lock: RwLock::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> GalleryResult<Vec<IdentityRecord>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GalleryError::Storage(e.to_string())),
        };
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&data).map_err(|e| {
            GalleryError::Serialization(format!("{}: {e}", self.path.display()))
        })
    }

    fn persist(&self, records: &[IdentityRecord]) -> GalleryResult<()> {
        let data = serde_json::to_vec_pretty(records)
            .map_err(|e| GalleryError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &data).map_err(|e| GalleryError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| GalleryError::Storage(e.to_string()))?;
        debug!("gallery: wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

impl GalleryStore for JsonGallery {
    fn dim(&self) -> usize {
        self.dim
    }

    fn snapshot(&self) -> GalleryResult<Vec<IdentityRecord>> {
        let _guard = self
            .lock
            .read()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        self.load()
    }

    fn get(&self, id: &str) -> GalleryResult<Option<IdentityRecord>> {
        Ok(self.snapshot()?.into_iter().find(|r| r.id == id))
    }

    fn upsert(&self, record: IdentityRecord) -> GalleryResult<()> {
        record.validate(self.dim)?;
        let _guard = self
            .lock
            .write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let mut records = self.load()?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record,
            None => records.push(record),
        }
        self.persist(&records)
    }

    fn update(&self, id: &str, f: &mut dyn FnMut(&mut IdentityRecord)) -> GalleryResult<()> {
        let _guard = self
            .lock
            .write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let mut records = self.load()?;
        let slot = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| GalleryError::NotFound(id.to_string()))?;
        f(slot);
        slot.validate(self.dim)?;
        self.persist(&records)
    }

    fn remove(&self, id: &str) -> GalleryResult<Option<IdentityRecord>> {
        let _guard = self
            .lock
            .write()
            .map_err(|e| GalleryError::Storage(e.to_string()))?;
        let mut records = self.load()?;
        let Some(idx) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = records.remove(idx);
        self.persist(&records)?;
        Ok(Some(removed))
    }
}
