//! Survey attempts recorded by the screening flow.

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RiskTier;

/// Demographic attributes captured alongside a survey attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Demographics {
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Age in years.
    pub age: Option<u16>,
    /// Audience tag describing the user (compared with course audience tags).
    pub audience: Option<String>,
}

/// A single completed (or abandoned) survey attempt.
///
/// Users may have many attempts; the current one is the most recently
/// completed.
///
/// # Examples
/// ```
/// use compass_core::{RiskTier, SurveyRecord};
///
/// let survey = SurveyRecord::new("user-1", RiskTier::High, 27)
///     .with_category("crafft");
/// assert_eq!(survey.survey_category.as_deref(), Some("crafft"));
/// assert!(survey.completed_at.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurveyRecord {
    /// Identifier of the user who took the survey.
    pub user_id: String,
    /// Tier assigned to the attempt.
    pub risk_tier: RiskTier,
    /// Category of the survey instrument, used to narrow peer cohorts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub survey_category: Option<String>,
    /// Sum of the answer scores.
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_score: i32,
    /// Completion time, absent for attempts that were never finished.
    #[cfg_attr(feature = "serde", serde(default))]
    pub completed_at: Option<DateTime<Utc>>,
    /// Demographic attributes of the user at the time of the attempt.
    #[cfg_attr(feature = "serde", serde(default))]
    pub demographics: Demographics,
}

impl SurveyRecord {
    /// Construct an uncategorised, incomplete attempt.
    pub fn new(user_id: impl Into<String>, risk_tier: RiskTier, total_score: i32) -> Self {
        Self {
            user_id: user_id.into(),
            risk_tier,
            survey_category: None,
            total_score,
            completed_at: None,
            demographics: Demographics::default(),
        }
    }

    /// Set the survey category while returning `self` for chaining.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.survey_category = Some(category.into());
        self
    }

    /// Set the completion timestamp while returning `self` for chaining.
    #[must_use]
    pub fn completed(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    /// Set the demographic attributes while returning `self` for chaining.
    #[must_use]
    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn builder_sets_fields() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let survey = SurveyRecord::new("u1", RiskTier::Low, 3)
            .with_category("assist")
            .completed(at);
        assert_eq!(survey.user_id, "u1");
        assert_eq!(survey.survey_category.as_deref(), Some("assist"));
        assert_eq!(survey.completed_at, Some(at));
        assert_eq!(survey.total_score, 3);
    }
}
