use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use facelog_gallery::{GalleryStore, IdentityRecord};
use facelog_ledger::{Ledger, LedgerEntry, ScanFilter};
use facelog_matcher::{Decision, Matcher, MatcherConfig};
use facelog_session::{fixed_offset_hours, reconstruct, DateWindow, WorkSession};
use serde::Serialize;
use tracing::{debug, info};

use crate::embed::FaceEmbedder;
use crate::error::RecognizeError;

/// Configuration for [`Recognizer`].
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    pub matcher: MatcherConfig,
    /// Local UTC offset used to bucket events into calendar dates.
    pub tz_offset_hours: i32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            tz_offset_hours: 7,
        }
    }
}

/// Point-in-time counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_identities: usize,
    pub active_identities: usize,
    pub ledger_entries: usize,
    pub threshold: f32,
}

/// Runs recognition requests against a gallery and records them in a ledger.
///
/// Thread-safe: share one instance behind an `Arc`.
pub struct Recognizer {
    matcher: Matcher,
    gallery: Arc<dyn GalleryStore>,
    ledger: Arc<dyn Ledger>,
    embedder: Option<Arc<dyn FaceEmbedder>>,
    tz: FixedOffset,
    clock: fn() -> i64,
}

fn unix_now() -> i64 {
    Utc::now().timestamp()
}

impl Recognizer {
    /// Create a recognizer. The gallery must use the matcher's dimensionality.
    pub fn new(
        cfg: RecognizerConfig,
        gallery: Arc<dyn GalleryStore>,
        ledger: Arc<dyn Ledger>,
    ) -> Result<Self, RecognizeError> {
        let matcher = Matcher::new(cfg.matcher)?;
        if gallery.dim() != matcher.config().dim {
            return Err(RecognizeError::Config(format!(
                "gallery dim {} does not match matcher dim {}",
                gallery.dim(),
                matcher.config().dim
            )));
        }
        let tz = fixed_offset_hours(cfg.tz_offset_hours)?;
        Ok(Self {
            matcher,
            gallery,
            ledger,
            embedder: None,
            tz,
            clock: unix_now,
        })
    }

    /// Attach the feature-extraction collaborator.
    pub fn with_embedder(mut self, embedder: Arc<dyn FaceEmbedder>) -> Result<Self, RecognizeError> {
        let dim = self.matcher.config().dim;
        if embedder.dimension() != dim {
            return Err(RecognizeError::Config(format!(
                "embedder dim {} does not match matcher dim {dim}",
                embedder.dimension()
            )));
        }
        self.embedder = Some(embedder);
        Ok(self)
    }

    /// Replace the clock used to timestamp ledger entries.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn tz(&self) -> FixedOffset {
        self.tz
    }

    /// Match a query embedding and record the attempt.
    ///
    /// Malformed queries fail before the matcher runs and are not recorded.
    /// If the ledger append fails, the request fails.
    pub fn recognize_vector(&self, query: &[f32]) -> Result<Decision, RecognizeError> {
        self.matcher.check_query(query)?;

        let gallery = self.gallery.snapshot()?;
        let decision = self.matcher.identify(query, &gallery)?;
        let entry = ledger_entry((self.clock)(), &decision);
        self.ledger.append(&entry)?;

        match &decision.identity {
            Some(identity) => info!(
                "recognizer: matched {} ({}) distance={:.4}",
                identity.name,
                identity.id,
                decision.distance.unwrap_or_default()
            ),
            None => info!(
                "recognizer: no match ({}) distance={:?}",
                decision.reason, decision.distance
            ),
        }
        Ok(decision)
    }

    /// Extract an embedding from an image, then [`Recognizer::recognize_vector`].
    pub fn recognize_image(&self, image: &[u8]) -> Result<Decision, RecognizeError> {
        let embedder = self.embedder.as_ref().ok_or(RecognizeError::NoEmbedder)?;
        let query = embedder.extract(image)?;
        self.recognize_vector(&query)
    }

    /// Enroll a new identity from an embedding.
    pub fn enroll_vector(
        &self,
        name: &str,
        position: &str,
        embedding: Vec<f32>,
    ) -> Result<IdentityRecord, RecognizeError> {
        self.enroll(IdentityRecord::new(name.trim(), position.trim(), embedding))
    }

    /// Enroll a new identity from a face image.
    pub fn enroll_image(
        &self,
        name: &str,
        position: &str,
        image: &[u8],
    ) -> Result<IdentityRecord, RecognizeError> {
        let embedder = self.embedder.as_ref().ok_or(RecognizeError::NoEmbedder)?;
        let embedding = embedder.extract(image)?;
        let record = IdentityRecord::new(name.trim(), position.trim(), embedding)
            .with_model(embedder.model_name());
        self.enroll(record)
    }

    fn enroll(&self, record: IdentityRecord) -> Result<IdentityRecord, RecognizeError> {
        self.matcher.check_query(&record.embedding)?;
        self.gallery.upsert(record.clone())?;
        info!("recognizer: enrolled {} ({})", record.name, record.id);
        Ok(record)
    }

    /// Enable or disable matching for an identity.
    pub fn set_active(&self, id: &str, active: bool) -> Result<(), RecognizeError> {
        self.gallery.set_active(id, active)?;
        info!("recognizer: identity {id} active={active}");
        Ok(())
    }

    /// Reconstruct work sessions for a date window from the ledger.
    pub fn work_sessions(&self, window: &DateWindow) -> Result<Vec<WorkSession>, RecognizeError> {
        let (since, until) = window.unix_bounds(&self.tz)?;
        let entries = self
            .ledger
            .scan(&ScanFilter::matched_between(since, until))?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "recognizer: {} matched entries between {} and {}",
            entries.len(),
            window.start(),
            window.end()
        );
        Ok(reconstruct(entries, window, &self.tz))
    }

    /// Return the most recent ledger entries, oldest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<LedgerEntry>, RecognizeError> {
        Ok(self.ledger.tail(limit)?)
    }

    /// Gather gallery and ledger counters.
    pub fn stats(&self) -> Result<Stats, RecognizeError> {
        let gallery = self.gallery.snapshot()?;
        Ok(Stats {
            total_identities: gallery.len(),
            active_identities: gallery.iter().filter(|r| r.active).count(),
            ledger_entries: self.ledger.count()?,
            threshold: self.matcher.config().threshold,
        })
    }
}

/// Build the audit record for a decision.
fn ledger_entry(ts: i64, decision: &Decision) -> LedgerEntry {
    match (&decision.identity, decision.distance) {
        (Some(identity), Some(distance)) if decision.matched => {
            LedgerEntry::matched(ts, identity.id.clone(), identity.name.clone(), distance)
        }
        _ => LedgerEntry::unmatched(ts, decision.distance).with_reason(decision.reason.as_str()),
    }
}
