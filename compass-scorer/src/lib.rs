//! Risk-aware recommendation engine for Compass.
//!
//! The crate turns survey results, the course and consultant catalog and
//! interaction history into ranked, explainable recommendations:
//! - **Risk profile resolution** picks each user's current survey and falls
//!   back to a MEDIUM profile for users without history.
//! - **Content similarity** fits a TF-IDF space over the catalog per request
//!   and ranks items against the tier's keyword profile, with boosts for
//!   audience, specialization and experience.
//! - **Collaborative filtering** ranks items endorsed by the most similar
//!   peers in the user's tier and survey category cohort.
//! - **Hybrid merging** blends both signals with validated weights and
//!   attributes every item to the signal that produced it.
//!
//! [`HybridRecommender`] implements the
//! [`Recommender`](compass_core::Recommender) trait over any
//! [`DataSource`](compass_core::DataSource).
//!
//! # Examples
//!
//! ```
//! use compass_core::{RecommendationRequest, Recommender, test_support::sample_source};
//! use compass_scorer::{HybridRecommender, explain};
//!
//! let engine = HybridRecommender::new(sample_source());
//! let response = engine.recommend(&RecommendationRequest::new("u-high-1"));
//! let explanation = explain(&response);
//! assert_eq!(explanation.course_explanations.len(), response.courses.len());
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod collaborative;
mod content;
mod engine;
mod error;
mod explain;
mod hybrid;
mod resolver;
mod stats;
mod text;

pub use collaborative::{CohortConfig, CollaborativeEngine};
pub use compass_core::RecommendError;
pub use content::{ContentBoosts, ContentEngine};
pub use engine::{HybridRecommender, Mode, RecommenderConfig};
pub use error::ConfigError;
pub use explain::{Explanation, ItemExplanation, explain, reason};
pub use hybrid::{Candidate, HybridWeights, MergedItem, merge};
pub use resolver::{current_survey, resolve, resolve_all};
pub use stats::{InteractionStats, RiskSummary, UserInteractionStats};
pub use text::{MAX_VOCABULARY, SparseVector, TfIdf, is_stop_word, tokenize};

#[cfg(test)]
mod tests;
