use thiserror::Error;

/// Errors that can occur in ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger: io error: {0}")]
    Io(String),

    #[error("ledger: serialization error: {0}")]
    Serialization(String),

    #[error("ledger: invalid entry: {0}")]
    InvalidEntry(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        LedgerError::Io(e.to_string())
    }
}
