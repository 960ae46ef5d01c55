//! JSON Lines ledger file.
//!
//! One entry per line, appended with `O_APPEND`. A single mutex serializes
//! writers inside the process; each entry is written with one `write_all`.
//! The file is reopened by path on every append, so a log rotated or
//! rewritten by an external tool keeps receiving entries. Readers open their
//! own handle, so scans never block appends.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::entry::LedgerEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{Ledger, LedgerIter, ScanFilter};

/// A ledger stored as a JSON Lines file.
pub struct JsonlLedger {
    path: PathBuf,
    writer: Mutex<()>,
    durable: bool,
}

impl JsonlLedger {
    /// Open or create the ledger file, creating its parent directory if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(()),
            durable: false,
        })
    }

    /// Sync file data to disk after every append.
    pub fn durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Report whether the file ends in the middle of a line.
fn has_partial_tail(file: &mut File) -> LedgerResult<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl Ledger for JsonlLedger {
    fn append(&self, entry: &LedgerEntry) -> LedgerResult<()> {
        entry.validate()?;
        let mut line = entry.to_line()?;
        let _guard = self
            .writer
            .lock()
            .map_err(|e| LedgerError::Io(e.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        if has_partial_tail(&mut file)? {
            // Terminate the fragment left by an interrupted write so this
            // entry starts on its own line.
            warn!("ledger: {}: unterminated last line, closing it", self.path.display());
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes())?;
        file.flush()?;
        if self.durable {
            file.sync_data()?;
        }
        Ok(())
    }

    fn scan(&self, filter: &ScanFilter) -> LedgerResult<LedgerIter<'_>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Box::new(std::iter::empty())),
            Err(e) => return Err(e.into()),
        };
        Ok(Box::new(LineIter {
            reader: BufReader::new(file),
            filter: *filter,
            line_no: 0,
            buf: String::new(),
            done: false,
        }))
    }
}

struct LineIter {
    reader: BufReader<File>,
    filter: ScanFilter,
    line_no: usize,
    buf: String,
    done: bool,
}

impl Iterator for LineIter {
    type Item = LedgerResult<LedgerEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            let n = match self.reader.read_line(&mut self.buf) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    // The reader has already consumed the bad line.
                    self.line_no += 1;
                    warn!("ledger: line {}: not valid UTF-8, skipped", self.line_no);
                    continue;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            if n == 0 {
                self.done = true;
                break;
            }
            self.line_no += 1;

            if !self.buf.ends_with('\n') {
                // A writer is mid-append, or a previous write was cut short.
                debug!("ledger: line {}: incomplete tail, skipped", self.line_no);
                continue;
            }
            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            match LedgerEntry::parse_line(line) {
                Ok(entry) if self.filter.accepts(&entry) => return Some(Ok(entry)),
                Ok(_) => continue,
                Err(e) => {
                    warn!("ledger: line {}: {}, skipped", self.line_no, e);
                    continue;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use tempfile::tempdir;

    fn scan_all(ledger: &JsonlLedger) -> Vec<LedgerEntry> {
        ledger
            .scan(&ScanFilter::all())
            .unwrap()
            .map(|e| e.unwrap())
            .collect()
    }

    #[test]
    fn test_round_trip_in_append_order() {
        let dir = tempdir().unwrap();
        let ledger = JsonlLedger::open(dir.path().join("logs").join("attendance.jsonl")).unwrap();

        // Timestamps deliberately out of order.
        let written = vec![
            LedgerEntry::matched(1_736_900_500, "u1", "Alice", 0.21),
            LedgerEntry::unmatched(1_736_900_100, Some(0.63)).with_reason("above_threshold"),
            LedgerEntry::unmatched(1_736_900_200, None).with_reason("empty_gallery"),
            LedgerEntry::matched(1_736_900_300, "u2", "Bob", 0.05),
        ];
        for e in &written {
            ledger.append(e).unwrap();
        }

        assert_eq!(scan_all(&ledger), written);
        assert_eq!(ledger.count().unwrap(), 4);
    }

    #[test]
    fn test_reopen_appends_after_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.jsonl");
        JsonlLedger::open(&path)
            .unwrap()
            .append(&LedgerEntry::matched(1, "u1", "Alice", 0.1))
            .unwrap();

        let ledger = JsonlLedger::open(&path).unwrap().durable(true);
        ledger.append(&LedgerEntry::matched(2, "u1", "Alice", 0.1)).unwrap();
        let ts: Vec<i64> = scan_all(&ledger).iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec![1, 2]);
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.jsonl");
        let ledger = JsonlLedger::open(&path).unwrap();
        ledger.append(&LedgerEntry::matched(1, "u1", "Alice", 0.1)).unwrap();

        // Simulate edits by an external maintenance tool.
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"{\"ts\": 2, \"name\": \"trunc\n").unwrap();
        f.write_all(b"\n").unwrap();
        f.write_all(b"not json at all\n").unwrap();
        f.write_all(&[0xff, 0xfe, b'\n']).unwrap();
        f.write_all(b"{\"ts\": 3, \"user_id\": null, \"name\": \"x\", \"matched\": true, \"distance\": 0.1}\n")
            .unwrap();
        drop(f);

        ledger.append(&LedgerEntry::matched(4, "u2", "Bob", 0.2)).unwrap();

        let ts: Vec<i64> = scan_all(&ledger).iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec![1, 4]);
    }

    #[test]
    fn test_incomplete_tail_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.jsonl");
        let ledger = JsonlLedger::open(&path).unwrap();
        ledger.append(&LedgerEntry::matched(1, "u1", "Alice", 0.1)).unwrap();

        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(br#"{"ts": 2, "user_id": "u1", "name": "Alice", "matched": true, "distance": 0.1}"#)
            .unwrap();
        drop(f);

        assert_eq!(scan_all(&ledger).len(), 1);
    }

    #[test]
    fn test_scan_applies_filter() {
        let dir = tempdir().unwrap();
        let ledger = JsonlLedger::open(dir.path().join("a.jsonl")).unwrap();
        for ts in [10, 20, 30, 40] {
            ledger.append(&LedgerEntry::matched(ts, "u1", "Alice", 0.1)).unwrap();
            ledger.append(&LedgerEntry::unmatched(ts, Some(0.9))).unwrap();
        }
        let got: Vec<i64> = ledger
            .scan(&ScanFilter::matched_between(20, 30))
            .unwrap()
            .map(|e| e.unwrap().timestamp)
            .collect();
        assert_eq!(got, vec![20, 30]);
    }

    #[test]
    fn test_tail_returns_last_entries() {
        let dir = tempdir().unwrap();
        let ledger = JsonlLedger::open(dir.path().join("a.jsonl")).unwrap();
        for ts in 0..10 {
            ledger.append(&LedgerEntry::matched(ts, "u1", "Alice", 0.1)).unwrap();
        }
        let tail: Vec<i64> = ledger.tail(3).unwrap().iter().map(|e| e.timestamp).collect();
        assert_eq!(tail, vec![7, 8, 9]);
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = tempdir().unwrap();
        let ledger = Arc::new(JsonlLedger::open(dir.path().join("a.jsonl")).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 0..100 {
                        let id = format!("user-{t}");
                        let name = "x".repeat(200 + i);
                        ledger
                            .append(&LedgerEntry::matched(i as i64, id, name, 0.1))
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let entries = scan_all(&ledger);
        assert_eq!(entries.len(), 800);
        for t in 0..8 {
            let id = format!("user-{t}");
            let mine: Vec<i64> = entries
                .iter()
                .filter(|e| e.identity_id.as_deref() == Some(id.as_str()))
                .map(|e| e.timestamp)
                .collect();
            assert_eq!(mine, (0..100).collect::<Vec<i64>>());
        }
    }

    #[test]
    fn test_missing_file_scans_empty_then_recreates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.jsonl");
        let ledger = JsonlLedger::open(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(scan_all(&ledger).is_empty());

        ledger.append(&LedgerEntry::matched(1, "u1", "Alice", 0.1)).unwrap();
        assert!(path.exists());
        assert_eq!(scan_all(&ledger).len(), 1);
    }

    #[test]
    fn test_append_after_interrupted_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.jsonl");
        JsonlLedger::open(&path)
            .unwrap()
            .append(&LedgerEntry::matched(1, "u1", "Alice", 0.1))
            .unwrap();

        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(br#"{"ts": 2, "user_id": "u1", "na"#).unwrap();
        drop(f);

        let ledger = JsonlLedger::open(&path).unwrap();
        ledger.append(&LedgerEntry::matched(3, "u1", "Alice", 0.1)).unwrap();
        ledger.append(&LedgerEntry::matched(4, "u1", "Alice", 0.1)).unwrap();

        let ts: Vec<i64> = scan_all(&ledger).iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec![1, 3, 4]);
    }

    #[test]
    fn test_append_after_file_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.jsonl");
        let ledger = JsonlLedger::open(&path).unwrap();
        ledger.append(&LedgerEntry::matched(1, "u1", "Alice", 0.1)).unwrap();

        // A maintenance tool rewrites the log through a copy and a rename.
        let copy = dir.path().join("attendance.jsonl.new");
        fs::copy(&path, &copy).unwrap();
        fs::rename(&copy, &path).unwrap();

        ledger.append(&LedgerEntry::matched(2, "u1", "Alice", 0.1)).unwrap();
        let ts: Vec<i64> = scan_all(&ledger).iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec![1, 2]);
    }
}
