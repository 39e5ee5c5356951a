//! Community strategy ratings with a full audit log

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{require_id, validate_community_value, AggregateScore, RatingRecord};
use crate::error::ValidationError;

/// Rating log for community-shared strategies.
///
/// Every accepted rating is kept, so the aggregate can be recomputed from the
/// log at any time and individual feedback can be displayed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommunityRatings {
    logs: HashMap<String, Vec<RatingRecord>>,
}

impl CommunityRatings {
    /// Creates an empty rating log
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a 1-5 rating and returns the updated aggregate
    pub fn submit_community_rating(
        &mut self,
        subject_id: &str,
        rater_id: &str,
        value: i64,
    ) -> Result<AggregateScore, ValidationError> {
        self.submit_community_rating_with_feedback(subject_id, rater_id, value, None)
    }

    /// Records a 1-5 rating with optional free-text feedback.
    ///
    /// Blank feedback is stored as `None`. On a validation error nothing is
    /// recorded.
    pub fn submit_community_rating_with_feedback(
        &mut self,
        subject_id: &str,
        rater_id: &str,
        value: i64,
        feedback: Option<&str>,
    ) -> Result<AggregateScore, ValidationError> {
        require_id(subject_id, "subject_id")?;
        require_id(rater_id, "rater_id")?;
        let value = validate_community_value(value)?;

        let feedback = feedback
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        let records = self.logs.entry(subject_id.to_string()).or_default();
        records.push(RatingRecord {
            subject_id: subject_id.to_string(),
            rater_id: rater_id.to_string(),
            value,
            feedback,
            created_at: Utc::now(),
        });

        let score = aggregate(subject_id, records);
        debug!(
            subject_id,
            rater_id,
            value,
            mean = score.mean,
            count = score.count,
            "community rating recorded"
        );
        Ok(score)
    }

    /// Current aggregate for a subject, recomputed from its log
    pub fn score(&self, subject_id: &str) -> Option<AggregateScore> {
        let records = self.logs.get(subject_id)?;
        if records.is_empty() {
            return None;
        }
        Some(aggregate(subject_id, records))
    }

    /// Re-checks every logged rating, for logs loaded from outside
    pub fn validate(&self) -> Result<(), ValidationError> {
        for record in self.logs.values().flatten() {
            require_id(&record.subject_id, "subject_id")?;
            require_id(&record.rater_id, "rater_id")?;
            validate_community_value(record.value)?;
        }
        Ok(())
    }

    /// Submitted ratings for a subject, oldest first
    pub fn records(&self, subject_id: &str) -> &[RatingRecord] {
        self.logs.get(subject_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Recomputes the aggregate from a non-empty log
fn aggregate(subject_id: &str, records: &[RatingRecord]) -> AggregateScore {
    let sum: i64 = records.iter().map(|r| r.value).sum();
    let count = records.len() as u64;
    AggregateScore {
        subject_id: subject_id.to_string(),
        mean: rounded_mean(sum, count),
        count,
    }
}

/// Mean of `sum / count` rounded to one decimal place, halves rounded up.
///
/// Works in integer tenths so values like 4.25 round to 4.3 instead of
/// landing on whichever side binary floating point puts them.
fn rounded_mean(sum: i64, count: u64) -> f64 {
    let count = count as i64;
    // round(10 * sum / count) == floor((20 * sum + count) / (2 * count)) for sum >= 0
    let tenths = (20 * sum + count).div_euclid(2 * count);
    tenths as f64 / 10.0
}
