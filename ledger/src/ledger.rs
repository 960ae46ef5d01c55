use std::collections::VecDeque;
use std::fmt;

use crate::entry::LedgerEntry;
use crate::error::LedgerResult;

/// Lazy sequence of entries in append order.
///
/// Malformed records are skipped inside the iterator; only I/O failures are
/// yielded as errors.
pub type LedgerIter<'a> = Box<dyn Iterator<Item = LedgerResult<LedgerEntry>> + Send + 'a>;

/// Restricts a scan. Bounds are inclusive Unix seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanFilter {
    /// Drop entries before this time.
    pub since: Option<i64>,
    /// Drop entries after this time.
    pub until: Option<i64>,
    /// Keep only accepted matches.
    pub matched_only: bool,
}

impl ScanFilter {
    /// A filter that keeps everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Keep only matched entries within `[since, until]`.
    pub fn matched_between(since: i64, until: i64) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
            matched_only: true,
        }
    }

    /// Report whether an entry passes the filter.
    pub fn accepts(&self, entry: &LedgerEntry) -> bool {
        if self.matched_only && !entry.matched {
            return false;
        }
        if self.since.is_some_and(|s| entry.timestamp < s) {
            return false;
        }
        if self.until.is_some_and(|u| entry.timestamp > u) {
            return false;
        }
        true
    }
}

/// Append-only log of recognition attempts.
///
/// Implementations must be safe for concurrent use. Appends are serialized so
/// that each entry lands whole; scans may run while appends are in progress.
pub trait Ledger: Send + Sync {
    /// Append one entry as a single atomic unit.
    fn append(&self, entry: &LedgerEntry) -> LedgerResult<()>;

    /// Replay entries passing `filter`, in append order.
    fn scan(&self, filter: &ScanFilter) -> LedgerResult<LedgerIter<'_>>;

    /// Return the last `limit` entries, oldest first.
    fn tail(&self, limit: usize) -> LedgerResult<Vec<LedgerEntry>> {
        if limit == 0 {
            return Ok(vec![]);
        }
        let mut ring = VecDeque::with_capacity(limit);
        for entry in self.scan(&ScanFilter::all())? {
            if ring.len() == limit {
                ring.pop_front();
            }
            ring.push_back(entry?);
        }
        Ok(ring.into())
    }

    /// Count the readable entries.
    fn count(&self) -> LedgerResult<usize> {
        let mut n = 0;
        for entry in self.scan(&ScanFilter::all())? {
            entry?;
            n += 1;
        }
        Ok(n)
    }
}

impl fmt::Debug for dyn Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ledger {{ ... }}")
    }
}
