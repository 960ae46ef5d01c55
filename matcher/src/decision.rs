use std::fmt;

use facelog_gallery::IdentityRecord;

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchReason {
    /// Every acceptance rule held.
    Accepted,
    /// No active gallery record to compare against.
    EmptyGallery,
    /// Best distance is above the nominal threshold.
    AboveThreshold,
    /// Best distance is under the threshold but above the strict ceiling.
    AboveStrictCeiling,
    /// Best and second-best candidates are too close to tell apart.
    Ambiguous { margin: f32 },
}

impl MatchReason {
    /// Short machine-friendly label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::EmptyGallery => "empty_gallery",
            Self::AboveThreshold => "above_threshold",
            Self::AboveStrictCeiling => "above_strict_ceiling",
            Self::Ambiguous { .. } => "ambiguous",
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambiguous { margin } => write!(f, "ambiguous (margin {margin:.4})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Outcome of one [`crate::Matcher::identify`] call.
#[derive(Debug, Clone)]
pub struct Decision {
    /// True only when the best candidate passed every rule.
    pub matched: bool,

    /// The accepted identity. `None` unless `matched`.
    pub identity: Option<IdentityRecord>,

    /// Best candidate distance. `None` only when no active record exists.
    pub distance: Option<f32>,

    /// Second-best distance, when at least two active records exist.
    pub second_distance: Option<f32>,

    /// Diagnostic reason. Does not change `matched`.
    pub reason: MatchReason,
}

impl Decision {
    /// Decision for a gallery with no active records.
    pub fn empty() -> Self {
        Self {
            matched: false,
            identity: None,
            distance: None,
            second_distance: None,
            reason: MatchReason::EmptyGallery,
        }
    }

    /// Id of the accepted identity, if any.
    pub fn identity_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|r| r.id.as_str())
    }
}
