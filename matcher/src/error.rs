use thiserror::Error;

/// Errors returned by matcher operations.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("matcher: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("matcher: query contains a non-finite value at index {0}")]
    NonFinite(usize),

    #[error("matcher: invalid config: {0}")]
    InvalidConfig(String),
}
