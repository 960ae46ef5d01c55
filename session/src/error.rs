use thiserror::Error;

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session: invalid window: {0}")]
    InvalidWindow(String),

    #[error("session: invalid date {0:?}, want YYYY-MM-DD")]
    InvalidDate(String),

    #[error("session: invalid utc offset: {0}h")]
    InvalidOffset(i32),
}
