//! Gallery of enrolled identities.
//!
//! Provides the [`GalleryStore`] trait with an in-memory implementation for
//! testing, a JSON-file implementation that rewrites the whole collection on
//! each mutation, and a redb-based implementation.
//!
//! Every store hands out consistent snapshots: a reader never observes a
//! record whose embedding and metadata come from different writes.

pub mod error;
pub mod json;
pub mod memory;
pub mod record;
pub mod redb_store;
pub mod store;

pub use error::GalleryError;
pub use json::JsonGallery;
pub use memory::MemoryGallery;
pub use record::IdentityRecord;
pub use redb_store::RedbGallery;
pub use store::{GalleryResult, GalleryStore};
