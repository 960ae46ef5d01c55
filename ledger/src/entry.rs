use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Display name recorded for attempts that matched nobody.
pub const UNKNOWN_NAME: &str = "Unknown";

/// One recognition attempt. Immutable once appended.
///
/// Serialized as one JSON object per line:
/// `{"ts":1736900000,"user_id":"...","name":"Alice","matched":true,"distance":0.21}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unix seconds at decision time. Not guaranteed monotonic across entries.
    #[serde(rename = "ts")]
    pub timestamp: i64,

    /// Matched identity. Present only when `matched`.
    #[serde(rename = "user_id", default)]
    pub identity_id: Option<String>,

    /// Identity display name captured at match time.
    pub name: String,

    /// Matcher outcome.
    pub matched: bool,

    /// Best candidate distance. Absent only when the gallery was empty.
    #[serde(default)]
    pub distance: Option<f32>,

    /// Diagnostic reason for the outcome (e.g. "ambiguous").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LedgerEntry {
    /// Entry for an accepted match.
    pub fn matched(
        timestamp: i64,
        identity_id: impl Into<String>,
        name: impl Into<String>,
        distance: f32,
    ) -> Self {
        Self {
            timestamp,
            identity_id: Some(identity_id.into()),
            name: name.into(),
            matched: true,
            distance: Some(distance),
            reason: None,
        }
    }

    /// Entry for a rejected attempt.
    pub fn unmatched(timestamp: i64, distance: Option<f32>) -> Self {
        Self {
            timestamp,
            identity_id: None,
            name: UNKNOWN_NAME.to_string(),
            matched: false,
            distance,
            reason: None,
        }
    }

    /// Attach a diagnostic reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Check the field invariants.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.matched {
            match self.identity_id.as_deref() {
                Some(id) if !id.is_empty() => {}
                _ => {
                    return Err(LedgerError::InvalidEntry(
                        "matched entry without user_id".into(),
                    ));
                }
            }
            if self.distance.is_none() {
                return Err(LedgerError::InvalidEntry(
                    "matched entry without distance".into(),
                ));
            }
        } else if self.identity_id.is_some() {
            return Err(LedgerError::InvalidEntry(
                "unmatched entry with user_id".into(),
            ));
        }
        if self.distance.is_some_and(|d| !d.is_finite()) {
            return Err(LedgerError::InvalidEntry("non-finite distance".into()));
        }
        Ok(())
    }

    /// Parse one ledger line.
    ///
    /// Unmatched lines written by older tools carry placeholder ids such as
    /// "unknown"; those are dropped so every unmatched entry has no id.
    pub fn parse_line(line: &str) -> LedgerResult<Self> {
        let mut entry: LedgerEntry =
            serde_json::from_str(line).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        if !entry.matched {
            entry.identity_id = None;
        }
        entry.validate()?;
        Ok(entry)
    }

    /// Encode as one ledger line, including the trailing newline.
    pub fn to_line(&self) -> LedgerResult<String> {
        let mut line =
            serde_json::to_string(self).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        line.push('\n');
        Ok(line)
    }
}
