//! Append-only ledger of recognition attempts.
//!
//! The ledger is write-once, read-many: [`Ledger::append`] is the only
//! mutation, and [`Ledger::scan`] replays entries lazily in append order.
//! Append order is not timestamp order; consumers that need the latter sort.

pub mod entry;
pub mod error;
pub mod jsonl;
pub mod ledger;
pub mod memory;

pub use entry::{LedgerEntry, UNKNOWN_NAME};
pub use error::{LedgerError, LedgerResult};
pub use jsonl::JsonlLedger;
pub use ledger::{Ledger, LedgerIter, ScanFilter};
pub use memory::MemoryLedger;
