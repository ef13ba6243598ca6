//! Facade crate for the Compass recommendation engine.
//!
//! This crate re-exports the core domain types and exposes the hybrid
//! recommender and the SQLite data source behind feature flags.

#![forbid(unsafe_code)]

pub use compass_core::{
    Collection, ConsultantRecommendation, ConsultantRecord, CourseRecommendation, CourseRecord,
    DataSource, DataSourceError, InteractionRecord, RecommendError, RecommendationRequest,
    RecommendationResponse, RecommendationStatus, Recommender, RiskProfile, RiskRule, RiskTier,
    SnapshotSource, SurveyRecord, classify_score,
};

#[cfg(feature = "store-sqlite")]
pub use compass_core::{SqliteSource, SqliteSourceError};

#[cfg(feature = "engine")]
pub use compass_scorer::{
    ConfigError, Explanation, HybridRecommender, HybridWeights, Mode, RecommenderConfig, explain,
};
