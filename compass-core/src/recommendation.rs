//! Recommendation requests, ranked output and the [`Recommender`] trait.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DataSourceError, RiskProfile, RiskTier};

/// Default number of courses returned per request.
pub const DEFAULT_COURSE_LIMIT: usize = 10;
/// Default number of consultants returned per request.
pub const DEFAULT_CONSULTANT_LIMIT: usize = 3;

/// Which scoring signal produced a recommended item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RecommendationSource {
    /// Only text similarity contributed.
    ContentBased,
    /// Only peer behaviour contributed.
    Collaborative,
    /// Both signals contributed a non-zero score.
    Both,
}

impl RecommendationSource {
    /// Return the source as a snake-case `&str`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContentBased => "content_based",
            Self::Collaborative => "collaborative",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly the peer cohort matched the target user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CohortKind {
    /// Same risk tier and survey category.
    TierAndCategory,
    /// Same risk tier only.
    TierOnly,
}

/// Peer evidence behind a collaborative candidate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollaborativeEvidence {
    /// Peer whose history surfaced the item.
    pub peer_id: String,
    /// Cosine similarity between the target and the peer.
    pub similarity: f32,
    /// Cohort the peer was drawn from.
    pub cohort: CohortKind,
    /// Tier shared by the cohort.
    pub tier: RiskTier,
}

/// Per-item scores shared by every recommendation kind.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemScores {
    /// Boosted content similarity.
    pub content_score: f32,
    /// Peer similarity that surfaced the item.
    pub collaborative_score: f32,
    /// Weighted blend of the two scores.
    pub hybrid_score: f32,
    /// Signal attribution.
    pub source: RecommendationSource,
}

/// A recommended course with its scores.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CourseRecommendation {
    /// Course identifier.
    pub course_id: String,
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Intended audience tag.
    pub target_audience: Option<String>,
    /// Category name.
    pub category: Option<String>,
    /// Number of enrollments.
    pub enrollment_count: u32,
    /// Score block.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub scores: ItemScores,
    /// Peer evidence when the collaborative engine contributed.
    pub evidence: Option<CollaborativeEvidence>,
    /// Human readable justification.
    pub reason: String,
}

/// A recommended consultant with their scores.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsultantRecommendation {
    /// Consultant identifier.
    pub consultant_id: String,
    /// Display name.
    pub full_name: String,
    /// Comma-delimited specialization tags.
    pub specialization: Option<String>,
    /// Years of experience.
    pub experience_years: Option<u32>,
    /// Number of appointments held.
    pub total_appointments: u32,
    /// Score block.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub scores: ItemScores,
    /// Peer evidence when the collaborative engine contributed.
    pub evidence: Option<CollaborativeEvidence>,
    /// Human readable justification.
    pub reason: String,
}

/// A recommendation of either kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum RecommendationItem {
    /// A course.
    Course(CourseRecommendation),
    /// A consultant.
    Consultant(ConsultantRecommendation),
}

impl RecommendationItem {
    /// Identifier of the underlying item.
    pub fn item_id(&self) -> &str {
        match self {
            Self::Course(course) => &course.course_id,
            Self::Consultant(consultant) => &consultant.consultant_id,
        }
    }

    /// Display name of the underlying item.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Course(course) => &course.title,
            Self::Consultant(consultant) => &consultant.full_name,
        }
    }

    /// Score block of the underlying item.
    pub const fn scores(&self) -> &ItemScores {
        match self {
            Self::Course(course) => &course.scores,
            Self::Consultant(consultant) => &consultant.scores,
        }
    }

    /// Peer evidence of the underlying item.
    pub const fn evidence(&self) -> Option<&CollaborativeEvidence> {
        match self {
            Self::Course(course) => course.evidence.as_ref(),
            Self::Consultant(consultant) => consultant.evidence.as_ref(),
        }
    }
}

/// Candidate counts for one item kind across the pipeline stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StageCounts {
    /// Items returned by the content engine.
    pub content_hits: usize,
    /// Items returned by the collaborative engine.
    pub collaborative_hits: usize,
    /// Unique items after merging.
    pub merged: usize,
    /// Items returned to the caller.
    pub returned: usize,
}

/// Diagnostic counts per item kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecommendationSummary {
    /// Course pipeline counts.
    pub courses: StageCounts,
    /// Consultant pipeline counts.
    pub consultants: StageCounts,
}

/// Outcome classification of a recommendation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RecommendationStatus {
    /// Every signal contributed and the user's profile is known.
    Success,
    /// The response is valid but some signal was missing.
    Partial,
    /// The data source failed.
    Error,
}

/// Parameters for a recommendation request.
///
/// # Examples
/// ```
/// use compass_core::RecommendationRequest;
///
/// let request = RecommendationRequest::from_top_k("user-1", 5, 3);
/// assert_eq!(request.course_limit, 5);
/// assert_eq!(request.consultant_limit, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecommendationRequest {
    /// Target user.
    pub user_id: String,
    /// Maximum number of courses to return.
    pub course_limit: usize,
    /// Maximum number of consultants to return.
    pub consultant_limit: usize,
}

impl RecommendationRequest {
    /// Request with the default limits.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            course_limit: DEFAULT_COURSE_LIMIT,
            consultant_limit: DEFAULT_CONSULTANT_LIMIT,
        }
    }

    /// Request `top_k` courses and at most `consultant_cap` consultants.
    pub fn from_top_k(user_id: impl Into<String>, top_k: usize, consultant_cap: usize) -> Self {
        Self {
            user_id: user_id.into(),
            course_limit: top_k,
            consultant_limit: top_k.min(consultant_cap),
        }
    }

    /// Set the course limit while returning `self` for chaining.
    #[must_use]
    pub const fn with_course_limit(mut self, limit: usize) -> Self {
        self.course_limit = limit;
        self
    }

    /// Set the consultant limit while returning `self` for chaining.
    #[must_use]
    pub const fn with_consultant_limit(mut self, limit: usize) -> Self {
        self.consultant_limit = limit;
        self
    }
}

/// Ranked recommendations for one user.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecommendationResponse {
    /// Target user.
    pub user_id: String,
    /// Ranked courses.
    pub courses: Vec<CourseRecommendation>,
    /// Ranked consultants.
    pub consultants: Vec<ConsultantRecommendation>,
    /// Risk profile the ranking was computed for.
    pub risk_profile: RiskProfile,
    /// Diagnostic counts.
    pub summary: RecommendationSummary,
    /// Outcome classification.
    pub status: RecommendationStatus,
    /// Explanation of a partial or failed outcome.
    pub message: Option<String>,
}

impl RecommendationResponse {
    /// Empty response describing a failed request.
    pub fn failed(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            courses: Vec::new(),
            consultants: Vec::new(),
            risk_profile: RiskProfile::unknown(),
            summary: RecommendationSummary::default(),
            status: RecommendationStatus::Error,
            message: Some(message.into()),
        }
    }

    /// Courses followed by consultants as tagged items.
    pub fn items(&self) -> impl Iterator<Item = RecommendationItem> + '_ {
        self.courses
            .iter()
            .cloned()
            .map(RecommendationItem::Course)
            .chain(
                self.consultants
                    .iter()
                    .cloned()
                    .map(RecommendationItem::Consultant),
            )
    }
}

/// Errors returned by [`Recommender::try_recommend`].
#[derive(Debug, Error)]
pub enum RecommendError {
    /// Reading the snapshot from the data source failed.
    #[error("failed to load recommendation data: {source}")]
    DataSource {
        /// Underlying data source failure.
        #[source]
        source: DataSourceError,
    },
}

/// Produce ranked course and consultant recommendations.
///
/// Recommenders must be `Send + Sync` to serve concurrent requests.
pub trait Recommender: Send + Sync {
    /// Recommend items for `request`, surfacing data source failures.
    ///
    /// # Errors
    /// Returns [`RecommendError::DataSource`] when the snapshot cannot be
    /// read.
    fn try_recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, RecommendError>;

    /// Recommend items for `request`, converting failures into an
    /// [`RecommendationStatus::Error`] response.
    fn recommend(&self, request: &RecommendationRequest) -> RecommendationResponse {
        self.try_recommend(request)
            .unwrap_or_else(|err| RecommendationResponse::failed(&request.user_id, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Collection;
    use rstest::rstest;

    struct Broken;

    impl Recommender for Broken {
        fn try_recommend(
            &self,
            _request: &RecommendationRequest,
        ) -> Result<RecommendationResponse, RecommendError> {
            Err(RecommendError::DataSource {
                source: DataSourceError::read(Collection::Courses, std::fmt::Error),
            })
        }
    }

    #[rstest]
    #[case(10, 3, 10, 3)]
    #[case(2, 3, 2, 2)]
    #[case(0, 3, 0, 0)]
    fn top_k_caps_consultants(
        #[case] top_k: usize,
        #[case] cap: usize,
        #[case] courses: usize,
        #[case] consultants: usize,
    ) {
        let request = RecommendationRequest::from_top_k("u", top_k, cap);
        assert_eq!(request.course_limit, courses);
        assert_eq!(request.consultant_limit, consultants);
    }

    #[rstest]
    fn recommend_converts_failures() {
        let response = Broken.recommend(&RecommendationRequest::new("u1"));
        assert_eq!(response.status, RecommendationStatus::Error);
        assert!(response.courses.is_empty());
        assert!(response.consultants.is_empty());
        let message = response.message.expect("error message");
        assert!(message.contains("courses"));
    }

    #[rstest]
    fn failed_response_has_unknown_profile() {
        let response = RecommendationResponse::failed("u1", "boom");
        assert!(!response.risk_profile.is_known());
        assert_eq!(response.items().count(), 0);
    }
}
