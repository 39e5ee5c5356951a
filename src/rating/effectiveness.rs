//! Running effectiveness score for personal coping strategies

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{require_id, validate_effectiveness_value, AggregateScore};
use crate::error::ValidationError;

/// Stored per subject: the running mean and how many values fed it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
struct Running {
    mean: f64,
    count: u64,
}

/// Tracks a weighted mean of 0-1 effectiveness scores without keeping history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectivenessTracker {
    scores: HashMap<String, Running>,
}

impl EffectivenessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primes a subject with the `success_rate` and `times_used` already held
    /// by the store of record. Replaces whatever the tracker had.
    pub fn seed(
        &mut self,
        subject_id: &str,
        success_rate: f64,
        times_used: u64,
    ) -> Result<(), ValidationError> {
        require_id(subject_id, "subject_id")?;
        let mean = validate_effectiveness_value(success_rate)?;
        self.scores.insert(
            subject_id.to_string(),
            Running {
                mean,
                count: times_used,
            },
        );
        Ok(())
    }

    /// Folds one effectiveness rating into the running mean
    pub fn submit_effectiveness_rating(
        &mut self,
        subject_id: &str,
        value: f64,
    ) -> Result<AggregateScore, ValidationError> {
        require_id(subject_id, "subject_id")?;
        let value = validate_effectiveness_value(value)?;

        let running = self.scores.entry(subject_id.to_string()).or_default();
        let count = running
            .count
            .checked_add(1)
            .ok_or_else(|| ValidationError::CountExhausted(subject_id.to_string()))?;
        let old_count = running.count as f64;
        running.mean = (running.mean * old_count + value) / (old_count + 1.0);
        running.count = count;

        debug!(
            subject_id,
            value,
            success_rate = running.mean,
            times_used = running.count,
            "effectiveness rating recorded"
        );
        Ok(AggregateScore {
            subject_id: subject_id.to_string(),
            mean: running.mean,
            count: running.count,
        })
    }

    /// Re-checks every stored success rate, for state loaded from outside
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (subject_id, running) in &self.scores {
            require_id(subject_id, "subject_id")?;
            validate_effectiveness_value(running.mean)?;
        }
        Ok(())
    }

    /// Current aggregate for a subject
    pub fn score(&self, subject_id: &str) -> Option<AggregateScore> {
        self.scores.get(subject_id).map(|running| AggregateScore {
            subject_id: subject_id.to_string(),
            mean: running.mean,
            count: running.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_two_ratings_from_unused_strategy() {
        let mut tracker = EffectivenessTracker::new();

        let first = tracker.submit_effectiveness_rating("coping_1", 0.8).unwrap();
        assert!((first.mean - 0.8).abs() < TOLERANCE);
        assert_eq!(first.count, 1);

        let second = tracker.submit_effectiveness_rating("coping_1", 0.6).unwrap();
        assert!((second.mean - 0.7).abs() < TOLERANCE);
        assert_eq!(second.count, 2);
    }

    #[test]
    fn test_incremental_mean_equals_exact_mean() {
        let mut tracker = EffectivenessTracker::new();
        let values = [0.1, 0.9, 0.35, 1.0, 0.0, 0.77, 0.5, 0.123, 0.999, 0.42];
        let mut sum = 0.0;
        for (i, v) in values.iter().enumerate() {
            sum += v;
            let score = tracker.submit_effectiveness_rating("s", *v).unwrap();
            let exact = sum / (i + 1) as f64;
            assert!(
                (score.mean - exact).abs() < TOLERANCE,
                "after {} values: {} vs {}",
                i + 1,
                score.mean,
                exact
            );
            assert_eq!(score.count, (i + 1) as u64);
        }
    }

    #[test]
    fn test_invalid_value_leaves_score_unchanged() {
        let mut tracker = EffectivenessTracker::new();
        tracker.submit_effectiveness_rating("s", 0.5).unwrap();

        assert!(tracker.submit_effectiveness_rating("s", 1.2).is_err());
        assert!(tracker.submit_effectiveness_rating("s", -0.1).is_err());
        assert!(tracker.submit_effectiveness_rating("s", f64::NAN).is_err());
        assert!(tracker.submit_effectiveness_rating("", 0.5).is_err());

        let score = tracker.score("s").unwrap();
        assert_eq!(score.mean, 0.5);
        assert_eq!(score.count, 1);
    }

    #[test]
    fn test_seeded_subject_continues_from_stored_values() {
        let mut tracker = EffectivenessTracker::new();
        tracker.seed("s", 0.5, 3).unwrap();

        let score = tracker.submit_effectiveness_rating("s", 1.0).unwrap();
        assert!((score.mean - 0.625).abs() < TOLERANCE);
        assert_eq!(score.count, 4);
    }

    #[test]
    fn test_exhausted_count_is_rejected_without_change() {
        let mut tracker = EffectivenessTracker::new();
        tracker.seed("s", 0.5, u64::MAX).unwrap();

        assert_eq!(
            tracker.submit_effectiveness_rating("s", 1.0),
            Err(ValidationError::CountExhausted("s".to_string()))
        );

        let score = tracker.score("s").unwrap();
        assert_eq!(score.mean, 0.5);
        assert_eq!(score.count, u64::MAX);
    }

    #[test]
    fn test_seed_validates_bounds() {
        let mut tracker = EffectivenessTracker::new();
        assert_eq!(
            tracker.seed("s", 2.0, 1),
            Err(ValidationError::EffectivenessOutOfRange(2.0))
        );
        assert!(tracker.score("s").is_none());
    }
}
