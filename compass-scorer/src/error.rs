//! Error types raised while configuring the recommendation engine.
#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors raised when engine configuration fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Hybrid weights were not finite, negative, or did not sum to one.
    #[error(
        "hybrid weights must be finite, non-negative and sum to 1.0 \
         (content {content}, collaborative {collaborative})"
    )]
    InvalidWeights {
        /// Weight applied to content scores.
        content: f32,
        /// Weight applied to collaborative scores.
        collaborative: f32,
    },
    /// A cohort or boost threshold was not a finite, non-negative value.
    #[error("{name} must be a finite, non-negative value (got {value})")]
    InvalidThreshold {
        /// Name of the offending setting.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// The candidate multiplier was zero.
    #[error("diversity factor must be at least 1 (got {value})")]
    InvalidDiversityFactor {
        /// Rejected value.
        value: usize,
    },
}
