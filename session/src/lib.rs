//! Work-session reconstruction.
//!
//! Sessions are never stored. [`reconstruct`] derives them from a slice of
//! the ledger every time: for each identity and local work date, the first
//! and last successful match bound one session.

mod error;
mod session;
mod window;

pub use error::SessionError;
pub use session::{
    reconstruct, totals, IdentityTotal, WorkSession, OVERNIGHT_END_HOUR, OVERNIGHT_START_HOUR,
};
pub use window::{fixed_offset_hours, DateWindow};
