//! In-memory ledger for testing.

use std::sync::Mutex;

use crate::entry::LedgerEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{Ledger, LedgerIter, ScanFilter};

/// A ledger kept in a vector. Data is lost on drop.
#[derive(Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for MemoryLedger {
    fn append(&self, entry: &LedgerEntry) -> LedgerResult<()> {
        entry.validate()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| LedgerError::Io(e.to_string()))?;
        entries.push(entry.clone());
        Ok(())
    }

    fn scan(&self, filter: &ScanFilter) -> LedgerResult<LedgerIter<'_>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| LedgerError::Io(e.to_string()))?;
        let filter = *filter;
        let snapshot: Vec<LedgerEntry> = entries
            .iter()
            .filter(|e| filter.accepts(e))
            .cloned()
            .collect();
        Ok(Box::new(snapshot.into_iter().map(Ok)))
    }
}
