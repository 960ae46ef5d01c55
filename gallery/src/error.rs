use thiserror::Error;

/// Errors that can occur in gallery operations.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("gallery: dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("gallery: invalid record: {0}")]
    InvalidRecord(String),

    #[error("gallery: identity not found: {0}")]
    NotFound(String),

    #[error("gallery: storage error: {0}")]
    Storage(String),

    #[error("gallery: serialization error: {0}")]
    Serialization(String),
}
