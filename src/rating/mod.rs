//! Rating aggregation for community and personal coping strategies
//!
//! Two update rules live here. Community strategies keep a full log of 1-5
//! ratings and report a rounded arithmetic mean. Personal coping strategies
//! only keep a running weighted mean of 0-1 effectiveness scores.

mod community;
mod effectiveness;

pub use community::CommunityRatings;
pub use effectiveness::EffectivenessTracker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest accepted community rating
pub const COMMUNITY_MIN: i64 = 1;
/// Highest accepted community rating
pub const COMMUNITY_MAX: i64 = 5;

/// A single submitted rating. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    /// The rated strategy
    pub subject_id: String,
    /// Who submitted the rating
    pub rater_id: String,
    /// Integer rating from 1 to 5
    pub value: i64,
    /// Optional free-text feedback shown alongside the rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// When the rating was submitted
    pub created_at: DateTime<Utc>,
}

/// Running aggregate for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub subject_id: String,
    pub mean: f64,
    pub count: u64,
}

/// Derived fields written back to a community strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityStats {
    pub rating: f64,
    pub rating_count: u64,
}

/// Derived fields written back to a personal coping strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopingStats {
    pub success_rate: f64,
    pub times_used: u64,
}

impl From<&AggregateScore> for CommunityStats {
    fn from(score: &AggregateScore) -> Self {
        Self {
            rating: score.mean,
            rating_count: score.count,
        }
    }
}

impl From<&AggregateScore> for CopingStats {
    fn from(score: &AggregateScore) -> Self {
        Self {
            success_rate: score.mean,
            times_used: score.count,
        }
    }
}

/// Rejects empty or whitespace-only identifiers
pub(crate) fn require_id(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier(field));
    }
    Ok(())
}

/// Checks a community rating is an integer from 1 to 5
pub fn validate_community_value(value: i64) -> Result<i64, ValidationError> {
    if (COMMUNITY_MIN..=COMMUNITY_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::CommunityOutOfRange(value))
    }
}

/// Checks an effectiveness rating is a finite real from 0 to 1
pub fn validate_effectiveness_value(value: f64) -> Result<f64, ValidationError> {
    // NaN fails the range check as well
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::EffectivenessOutOfRange(value))
    }
}

/// Parses raw text into a community rating.
///
/// Fractional input such as "4.5" is not a valid community rating and is
/// reported as `NotANumber` rather than rounded.
pub fn parse_community_value(raw: &str) -> Result<i64, ValidationError> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::NotANumber(raw.to_string()))?;
    validate_community_value(value)
}

/// Parses raw text into an effectiveness rating
pub fn parse_effectiveness_value(raw: &str) -> Result<f64, ValidationError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber(raw.to_string()))?;
    validate_effectiveness_value(value)
}
