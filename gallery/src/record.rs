use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GalleryError;

/// IdentityRecord is one enrolled identity with its reference embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Opaque unique identifier, generated at enrollment.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Job title or role. Empty when unknown.
    #[serde(default)]
    pub position: String,

    /// Reference face embedding.
    pub embedding: Vec<f32>,

    /// Name of the model that produced `embedding` (e.g. "ArcFace").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,

    /// Inactive records are kept for audit but excluded from matching.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Enrollment time.
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl IdentityRecord {
    /// Create an active record with a fresh UUID and the current time.
    pub fn new(name: impl Into<String>, position: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            position: position.into(),
            embedding,
            model: String::new(),
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Set the embedding model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Check the record against the deployment's embedding dimensionality.
    pub fn validate(&self, dim: usize) -> Result<(), GalleryError> {
        if self.id.trim().is_empty() {
            return Err(GalleryError::InvalidRecord("empty id".into()));
        }
        if self.name.trim().is_empty() {
            return Err(GalleryError::InvalidRecord(format!(
                "identity {} has an empty name",
                self.id
            )));
        }
        if self.embedding.len() != dim {
            return Err(GalleryError::DimensionMismatch {
                got: self.embedding.len(),
                want: dim,
            });
        }
        if self.embedding.iter().any(|v| !v.is_finite()) {
            return Err(GalleryError::InvalidRecord(format!(
                "identity {} has a non-finite embedding component",
                self.id
            )));
        }
        Ok(())
    }
}
