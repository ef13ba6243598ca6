//! In-memory data source built from owned record collections.
//!
//! With the `serde` feature the snapshot can be decoded from JSON:
//!
//! ```json
//! {
//!   "surveys": [{"user_id": "u1", "risk_tier": "LOW", "completed_at": "2024-05-01T09:00:00Z"}],
//!   "courses": [{"id": "c1", "title": "Staying Safe", "description": "prevention"}],
//!   "consultants": [],
//!   "interactions": [],
//!   "risk_rules": []
//! }
//! ```

#[cfg(feature = "serde")]
use std::io::Read;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{DataSource, DataSourceError};
use crate::{ConsultantRecord, CourseRecord, InteractionRecord, RiskRule, SurveyRecord};

/// Data source serving clones of owned collections.
///
/// # Examples
/// ```
/// use compass_core::{CourseRecord, DataSource, SnapshotSource};
///
/// let source = SnapshotSource::default()
///     .with_courses(vec![CourseRecord::new("c1", "Intro", "prevention")]);
/// assert_eq!(source.courses().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SnapshotSource {
    surveys: Vec<SurveyRecord>,
    courses: Vec<CourseRecord>,
    consultants: Vec<ConsultantRecord>,
    interactions: Vec<InteractionRecord>,
    risk_rules: Vec<RiskRule>,
}

impl SnapshotSource {
    /// Replace the survey collection.
    #[must_use]
    pub fn with_surveys(mut self, surveys: Vec<SurveyRecord>) -> Self {
        self.surveys = surveys;
        self
    }

    /// Replace the course catalog.
    #[must_use]
    pub fn with_courses(mut self, courses: Vec<CourseRecord>) -> Self {
        self.courses = courses;
        self
    }

    /// Replace the consultant roster.
    #[must_use]
    pub fn with_consultants(mut self, consultants: Vec<ConsultantRecord>) -> Self {
        self.consultants = consultants;
        self
    }

    /// Replace the interaction history.
    #[must_use]
    pub fn with_interactions(mut self, interactions: Vec<InteractionRecord>) -> Self {
        self.interactions = interactions;
        self
    }

    /// Replace the risk rule table.
    #[must_use]
    pub fn with_risk_rules(mut self, risk_rules: Vec<RiskRule>) -> Self {
        self.risk_rules = risk_rules;
        self
    }

    /// Decode a snapshot from a JSON string.
    ///
    /// # Errors
    /// Returns the decoder error for malformed JSON or invalid records, such
    /// as ratings outside `0.0..=1.0`.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Decode a snapshot from a JSON reader.
    ///
    /// # Errors
    /// Returns the decoder error for I/O failures, malformed JSON or invalid
    /// records.
    #[cfg(feature = "serde")]
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

impl DataSource for SnapshotSource {
    fn surveys(&self) -> Result<Vec<SurveyRecord>, DataSourceError> {
        Ok(self.surveys.clone())
    }

    fn courses(&self) -> Result<Vec<CourseRecord>, DataSourceError> {
        Ok(self.courses.clone())
    }

    fn consultants(&self) -> Result<Vec<ConsultantRecord>, DataSourceError> {
        Ok(self.consultants.clone())
    }

    fn interactions(&self) -> Result<Vec<InteractionRecord>, DataSourceError> {
        Ok(self.interactions.clone())
    }

    fn risk_rules(&self) -> Result<Vec<RiskRule>, DataSourceError> {
        Ok(self.risk_rules.clone())
    }
}
