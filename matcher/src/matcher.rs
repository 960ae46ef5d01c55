use facelog_gallery::IdentityRecord;
use tracing::{debug, warn};

use crate::config::MatcherConfig;
use crate::cosine::cosine_distance;
use crate::decision::{Decision, MatchReason};
use crate::error::MatchError;

/// Matches a query embedding against a gallery snapshot.
///
/// Holds only its configuration, so one instance can serve any number of
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct Matcher {
    cfg: MatcherConfig,
}

impl Matcher {
    /// Create a matcher after validating the configuration.
    pub fn new(cfg: MatcherConfig) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Return the active configuration.
    pub fn config(&self) -> &MatcherConfig {
        &self.cfg
    }

    /// Reject a query with the wrong dimensionality or non-finite values.
    pub fn check_query(&self, query: &[f32]) -> Result<(), MatchError> {
        if query.len() != self.cfg.dim {
            return Err(MatchError::DimensionMismatch {
                expected: self.cfg.dim,
                got: query.len(),
            });
        }
        if let Some(idx) = query.iter().position(|v| !v.is_finite()) {
            return Err(MatchError::NonFinite(idx));
        }
        Ok(())
    }

    /// Find the best active record for `query` and apply the acceptance policy.
    ///
    /// Inactive records and records of the wrong dimensionality are skipped.
    /// Ties keep the record seen first.
    pub fn identify(
        &self,
        query: &[f32],
        gallery: &[IdentityRecord],
    ) -> Result<Decision, MatchError> {
        self.check_query(query)?;

        let mut best: Option<(&IdentityRecord, f32)> = None;
        let mut second: Option<f32> = None;

        for record in gallery.iter().filter(|r| r.active) {
            if record.embedding.len() != self.cfg.dim {
                warn!(
                    "matcher: skipping identity {}: embedding has {} dims, want {}",
                    record.id,
                    record.embedding.len(),
                    self.cfg.dim
                );
                continue;
            }
            let d = cosine_distance(query, &record.embedding);
            match best {
                Some((_, best_d)) if d >= best_d => {
                    if second.is_none_or(|s| d < s) {
                        second = Some(d);
                    }
                }
                _ => {
                    if let Some((_, prev)) = best {
                        second = Some(prev);
                    }
                    best = Some((record, d));
                }
            }
        }

        let Some((candidate, best_d)) = best else {
            debug!("matcher: no active identities");
            return Ok(Decision::empty());
        };

        let reason = self.judge(best_d, second);
        debug!(
            "matcher: best={} distance={:.4} second={:?} -> {}",
            candidate.name, best_d, second, reason
        );

        let matched = reason == MatchReason::Accepted;
        Ok(Decision {
            matched,
            identity: matched.then(|| candidate.clone()),
            distance: Some(best_d),
            second_distance: second,
            reason,
        })
    }

    fn judge(&self, best: f32, second: Option<f32>) -> MatchReason {
        if best > self.cfg.threshold {
            return MatchReason::AboveThreshold;
        }
        if best > self.cfg.strict_ceiling {
            return MatchReason::AboveStrictCeiling;
        }
        if let Some(second) = second {
            let margin = second - best;
            if margin <= self.cfg.min_margin {
                return MatchReason::Ambiguous { margin };
            }
        }
        MatchReason::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(dim: usize) -> MatcherConfig {
        MatcherConfig {
            dim,
            threshold: 0.45,
            strict_ceiling: 0.40,
            min_margin: 0.05,
        }
    }

    fn record(name: &str, embedding: Vec<f32>) -> IdentityRecord {
        IdentityRecord::new(name, "", embedding)
    }

    /// Unit vector in the xy-plane at cosine distance `d` from `[1, 0]`.
    fn at_distance(d: f32) -> Vec<f32> {
        let cos = 1.0 - d;
        vec![cos, (1.0 - cos * cos).sqrt()]
    }

    #[test]
    fn test_exact_match_is_accepted() {
        let m = Matcher::new(cfg(3)).unwrap();
        let q = vec![0.2, 0.5, 0.8];
        let gallery = vec![record("Alice", q.clone())];

        let d = m.identify(&q, &gallery).unwrap();
        assert!(d.matched);
        assert_eq!(d.identity_id(), Some(gallery[0].id.as_str()));
        assert!(d.distance.unwrap().abs() < 1e-6);
        assert!(d.second_distance.is_none());
        assert_eq!(d.reason, MatchReason::Accepted);
    }

    #[test]
    fn test_close_second_is_ambiguous() {
        let m = Matcher::new(cfg(2)).unwrap();
        let gallery = vec![
            record("Alice", at_distance(0.10)),
            record("Bob", at_distance(0.12)),
        ];

        let d = m.identify(&[1.0, 0.0], &gallery).unwrap();
        assert!(!d.matched);
        assert!(d.identity.is_none());
        assert!((d.distance.unwrap() - 0.10).abs() < 1e-4);
        assert!((d.second_distance.unwrap() - 0.12).abs() < 1e-4);
        assert!(matches!(d.reason, MatchReason::Ambiguous { .. }));
    }

    #[test]
    fn test_clear_winner_is_accepted() {
        let m = Matcher::new(cfg(2)).unwrap();
        let gallery = vec![
            record("Bob", at_distance(0.30)),
            record("Alice", at_distance(0.10)),
        ];

        let d = m.identify(&[1.0, 0.0], &gallery).unwrap();
        assert!(d.matched);
        assert_eq!(d.identity.unwrap().name, "Alice");
        assert!((d.second_distance.unwrap() - 0.30).abs() < 1e-4);
    }

    #[test]
    fn test_between_ceiling_and_threshold_is_rejected() {
        let m = Matcher::new(cfg(2)).unwrap();
        let gallery = vec![record("Alice", at_distance(0.42))];

        let d = m.identify(&[1.0, 0.0], &gallery).unwrap();
        assert!(!d.matched);
        assert_eq!(d.reason, MatchReason::AboveStrictCeiling);
        assert!(d.distance.is_some());
    }

    #[test]
    fn test_above_threshold_keeps_distance() {
        let m = Matcher::new(cfg(2)).unwrap();
        let gallery = vec![record("Alice", at_distance(0.9))];

        let d = m.identify(&[1.0, 0.0], &gallery).unwrap();
        assert!(!d.matched);
        assert_eq!(d.reason, MatchReason::AboveThreshold);
        assert!((d.distance.unwrap() - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_empty_and_inactive_gallery() {
        let m = Matcher::new(cfg(2)).unwrap();
        let d = m.identify(&[1.0, 0.0], &[]).unwrap();
        assert!(!d.matched);
        assert!(d.distance.is_none());
        assert_eq!(d.reason, MatchReason::EmptyGallery);

        let mut r = record("Alice", vec![1.0, 0.0]);
        r.active = false;
        let d = m.identify(&[1.0, 0.0], &[r]).unwrap();
        assert!(!d.matched);
        assert!(d.identity.is_none());
        assert!(d.distance.is_none());
    }

    #[test]
    fn test_inactive_record_does_not_count_as_second() {
        let m = Matcher::new(cfg(2)).unwrap();
        let mut twin = record("Twin", at_distance(0.11));
        twin.active = false;
        let gallery = vec![record("Alice", at_distance(0.10)), twin];

        let d = m.identify(&[1.0, 0.0], &gallery).unwrap();
        assert!(d.matched);
        assert!(d.second_distance.is_none());
    }

    #[test]
    fn test_mismatched_records_are_skipped() {
        let m = Matcher::new(cfg(2)).unwrap();
        let gallery = vec![
            record("Legacy", vec![1.0, 0.0, 0.0]),
            record("Alice", vec![1.0, 0.0]),
        ];
        let d = m.identify(&[1.0, 0.0], &gallery).unwrap();
        assert!(d.matched);
        assert_eq!(d.identity.unwrap().name, "Alice");
    }

    #[test]
    fn test_bad_query_is_an_error() {
        let m = Matcher::new(cfg(2)).unwrap();
        assert!(matches!(
            m.identify(&[1.0, 0.0, 0.0], &[]),
            Err(MatchError::DimensionMismatch { expected: 2, got: 3 })
        ));
        assert!(matches!(
            m.identify(&[1.0, f32::INFINITY], &[]),
            Err(MatchError::NonFinite(1))
        ));
    }

    #[test]
    fn test_scaling_does_not_change_rank() {
        let m = Matcher::new(MatcherConfig {
            dim: 3,
            threshold: 2.0,
            strict_ceiling: 2.0,
            min_margin: 0.0,
        })
        .unwrap();
        let q = [0.9, 0.1, 0.2];
        let near = vec![0.8, 0.2, 0.2];
        let far = vec![0.1, 0.9, 0.3];
        let scaled: Vec<f32> = near.iter().map(|x| x * 250.0).collect();

        let a = m
            .identify(&q, &[record("near", near), record("far", far.clone())])
            .unwrap();
        let b = m
            .identify(&q, &[record("far", far), record("near", scaled)])
            .unwrap();
        assert_eq!(a.identity.unwrap().name, "near");
        assert_eq!(b.identity.unwrap().name, "near");
    }

    #[test]
    fn test_second_best_tracks_later_candidates() {
        let m = Matcher::new(cfg(2)).unwrap();
        let gallery = vec![
            record("A", at_distance(0.05)),
            record("B", at_distance(0.80)),
            record("C", at_distance(0.30)),
        ];
        let d = m.identify(&[1.0, 0.0], &gallery).unwrap();
        assert!(d.matched);
        assert!((d.second_distance.unwrap() - 0.30).abs() < 1e-4);
    }

    #[test]
    fn test_margin_equal_to_minimum_is_ambiguous() {
        let m = Matcher::new(MatcherConfig {
            min_margin: 0.0,
            ..cfg(2)
        })
        .unwrap();
        let gallery = vec![
            record("Alice", at_distance(0.10)),
            record("Alicia", at_distance(0.10)),
        ];

        let d = m.identify(&[1.0, 0.0], &gallery).unwrap();
        assert!(!d.matched);
        assert!(d.identity.is_none());
        assert_eq!(d.distance, d.second_distance);
        assert_eq!(d.reason, MatchReason::Ambiguous { margin: 0.0 });
    }
}
