//! Recognition decision path.
//!
//! [`Recognizer`] ties the collaborators together:
//!
//! 1. [`FaceEmbedder::extract`]: image -> embedding (no locks held)
//! 2. [`facelog_gallery::GalleryStore::snapshot`]: consistent gallery copy
//! 3. [`facelog_matcher::Matcher::identify`]: pure decision
//! 4. [`facelog_ledger::Ledger::append`]: audit record of the attempt
//!
//! Reporting reads the ledger back through [`facelog_session::reconstruct`].

mod embed;
mod error;
mod recognizer;

pub use embed::{EmbedError, FaceEmbedder};
pub use error::RecognizeError;
pub use recognizer::{Recognizer, RecognizerConfig, Stats};
