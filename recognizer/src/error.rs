use thiserror::Error;

use facelog_gallery::GalleryError;
use facelog_ledger::LedgerError;
use facelog_matcher::MatchError;
use facelog_session::SessionError;

use crate::embed::EmbedError;

/// Errors returned by the recognizer.
///
/// Rejected or ambiguous matches are not errors; they come back as ordinary
/// decisions.
#[derive(Debug, Error)]
pub enum RecognizeError {
    /// Malformed request: bad image, wrong dimensionality, invalid record.
    #[error("recognizer: invalid input: {0}")]
    Input(String),

    /// The embedder found no face. Retrying the same image will not help.
    #[error("recognizer: no face detected")]
    NoFace,

    #[error("recognizer: identity not found: {0}")]
    NotFound(String),

    #[error("recognizer: no face embedder configured")]
    NoEmbedder,

    #[error("recognizer: embedder error: {0}")]
    Embedder(String),

    #[error("recognizer: gallery error: {0}")]
    Gallery(String),

    #[error("recognizer: ledger error: {0}")]
    Ledger(String),

    #[error("recognizer: config error: {0}")]
    Config(String),
}

impl RecognizeError {
    /// Report whether the request itself was at fault.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Input(_) | Self::NoFace)
    }
}

impl From<MatchError> for RecognizeError {
    fn from(e: MatchError) -> Self {
        match e {
            MatchError::InvalidConfig(_) => RecognizeError::Config(e.to_string()),
            _ => RecognizeError::Input(e.to_string()),
        }
    }
}

impl From<GalleryError> for RecognizeError {
    fn from(e: GalleryError) -> Self {
        match e {
            GalleryError::DimensionMismatch { .. } | GalleryError::InvalidRecord(_) => {
                RecognizeError::Input(e.to_string())
            }
            GalleryError::NotFound(id) => RecognizeError::NotFound(id),
            _ => RecognizeError::Gallery(e.to_string()),
        }
    }
}

impl From<LedgerError> for RecognizeError {
    fn from(e: LedgerError) -> Self {
        RecognizeError::Ledger(e.to_string())
    }
}

impl From<SessionError> for RecognizeError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::InvalidOffset(_) => RecognizeError::Config(e.to_string()),
            _ => RecognizeError::Input(e.to_string()),
        }
    }
}

impl From<EmbedError> for RecognizeError {
    fn from(e: EmbedError) -> Self {
        match e {
            EmbedError::NoFaceDetected => RecognizeError::NoFace,
            EmbedError::InvalidImage(_) => RecognizeError::Input(e.to_string()),
            EmbedError::Model(_) => RecognizeError::Embedder(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let e: RecognizeError = EmbedError::NoFaceDetected.into();
        assert!(matches!(e, RecognizeError::NoFace));
        assert!(e.is_input_error());

        let e: RecognizeError = MatchError::DimensionMismatch { expected: 512, got: 128 }.into();
        assert!(e.is_input_error());

        let e: RecognizeError = LedgerError::Io("disk full".into()).into();
        assert!(!e.is_input_error());
        assert!(e.to_string().contains("disk full"));

        let e: RecognizeError = GalleryError::NotFound("u1".into()).into();
        assert!(matches!(e, RecognizeError::NotFound(ref id) if id == "u1"));
    }
}
