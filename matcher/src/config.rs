use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Tunables for the acceptance policy.
///
/// The defaults are the values the first deployment was tuned to (ArcFace
/// embeddings, a low-light camera). Treat them as a starting point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Embedding dimensionality. Default: 512.
    pub dim: usize,

    /// Nominal acceptance threshold on cosine distance. Default: 0.45.
    pub threshold: f32,

    /// Tighter absolute ceiling on the best distance. Default: 0.40.
    pub strict_ceiling: f32,

    /// Required gap between the second-best and best distance. Default: 0.05.
    pub min_margin: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            dim: 512,
            threshold: 0.45,
            strict_ceiling: 0.40,
            min_margin: 0.05,
        }
    }
}

impl MatcherConfig {
    /// Check that the values describe a usable policy.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.dim == 0 {
            return Err(MatchError::InvalidConfig("dim must be positive".into()));
        }
        for (name, v) in [
            ("threshold", self.threshold),
            ("strict_ceiling", self.strict_ceiling),
            ("min_margin", self.min_margin),
        ] {
            if !v.is_finite() {
                return Err(MatchError::InvalidConfig(format!("{name} must be finite")));
            }
        }
        if self.threshold <= 0.0 || self.threshold > 2.0 {
            return Err(MatchError::InvalidConfig(format!(
                "threshold must be in (0, 2], got {}",
                self.threshold
            )));
        }
        if self.strict_ceiling <= 0.0 || self.strict_ceiling > self.threshold {
            return Err(MatchError::InvalidConfig(format!(
                "strict_ceiling must be in (0, threshold], got {}",
                self.strict_ceiling
            )));
        }
        if self.min_margin < 0.0 {
            return Err(MatchError::InvalidConfig(format!(
                "min_margin must not be negative, got {}",
                self.min_margin
            )));
        }
        Ok(())
    }
}
