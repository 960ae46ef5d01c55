use thiserror::Error;

/// Errors returned by a [`FaceEmbedder`].
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("no face detected")]
    NoFaceDetected,

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("model error: {0}")]
    Model(String),
}

/// Turns a face image into a fixed-length embedding.
///
/// The model itself lives outside this workspace. Implementations must be safe
/// for concurrent use and may be slow; the recognizer never calls them while
/// holding a store lock.
pub trait FaceEmbedder: Send + Sync {
    /// Compute the embedding of the most prominent face in an encoded image.
    fn extract(&self, image: &[u8]) -> Result<Vec<f32>, EmbedError>;

    /// Length of the vectors returned by [`FaceEmbedder::extract`].
    fn dimension(&self) -> usize;

    /// Model name recorded on enrolled identities (e.g. "ArcFace").
    fn model_name(&self) -> &str {
        ""
    }
}
