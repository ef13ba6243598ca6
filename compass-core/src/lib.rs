//! Core domain types for the Compass recommendation engine.
//!
//! This crate holds the records the engine reads (surveys, catalog items and
//! interactions), the risk tier vocabulary, the recommendation output types
//! and the two seams the rest of the workspace plugs into: [`DataSource`]
//! for reading data and [`Recommender`] for producing rankings.
//!
//! Records validate on construction where a value has a hard range, so
//! downstream scoring code can rely on the invariants.

pub mod catalog;
pub mod interaction;
pub mod profile;
pub mod recommendation;
pub mod risk;
pub mod rules;
pub mod store;
pub mod survey;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use catalog::{ConsultantRecord, CourseRecord, CourseStatus, ItemKind, UNIVERSAL_AUDIENCES};
pub use interaction::{
    AppointmentStatus, BOOKED_APPOINTMENT_RATING, COMPLETED_APPOINTMENT_RATING, InteractionError,
    InteractionRecord,
};
pub use profile::{RiskProfile, RiskProfileTable, TierProfile};
pub use recommendation::{
    CohortKind, CollaborativeEvidence, ConsultantRecommendation, CourseRecommendation,
    DEFAULT_CONSULTANT_LIMIT, DEFAULT_COURSE_LIMIT, ItemScores, RecommendError,
    RecommendationItem, RecommendationRequest, RecommendationResponse, RecommendationSource,
    RecommendationStatus, RecommendationSummary, Recommender, StageCounts,
};
pub use risk::RiskTier;
pub use rules::{RiskRule, classify_score, rules_for};
#[cfg(feature = "store-sqlite")]
pub use store::{SCHEMA_SQL, SqliteSource, SqliteSourceError};
pub use store::{Collection, DataSource, DataSourceError, Dataset, SnapshotSource};
pub use survey::{Demographics, SurveyRecord};
