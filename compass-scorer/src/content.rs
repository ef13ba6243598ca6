//! Content similarity between a risk tier and the catalog.
//!
//! Each call fits a fresh [`TfIdf`] space over the catalog documents,
//! projects the tier's keyword pseudo-document into it and ranks items by
//! cosine similarity. Deterministic boosts then reward audience matches,
//! matching specializations and experienced consultants.

use compass_core::{ConsultantRecord, CourseRecord, RiskProfileTable, RiskTier};

use crate::{Candidate, ConfigError, TfIdf};

/// Multiplicative boosts applied after cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentBoosts {
    /// Applied when a course targets the user's audience or everyone.
    pub audience: f32,
    /// Applied when a consultant's specialization matches the tier.
    pub specialization: f32,
    /// Applied to consultants with at least `experience_years` of practice.
    pub experience: f32,
    /// Experience threshold for [`ContentBoosts::experience`].
    pub experience_years: u32,
}

impl ContentBoosts {
    /// Validate the boosts and return a copy.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidThreshold`] naming the first boost that
    /// is not a finite, non-negative multiplier.
    pub fn validate(self) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("audience boost", self.audience),
            ("specialization boost", self.specialization),
            ("experience boost", self.experience),
        ] {
            if !value.is_finite() || value < 0.0_f32 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        Ok(self)
    }
}

impl Default for ContentBoosts {
    fn default() -> Self {
        Self {
            audience: 1.2_f32,
            specialization: 1.2_f32,
            experience: 1.12_f32,
            experience_years: 5,
        }
    }
}

/// Ranks catalog items against a tier's keyword profile.
#[derive(Debug, Clone, Copy)]
pub struct ContentEngine<'a> {
    table: &'a RiskProfileTable,
    boosts: ContentBoosts,
}

impl<'a> ContentEngine<'a> {
    /// Build an engine over `table` with the given boosts.
    #[must_use]
    pub const fn new(table: &'a RiskProfileTable, boosts: ContentBoosts) -> Self {
        Self { table, boosts }
    }

    /// Rank `courses` for a user in `tier` with an optional audience tag.
    ///
    /// Items without any shared term score zero and keep catalog order.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "boosts multiply the similarity score"
    )]
    pub fn rank_courses(
        &self,
        tier: RiskTier,
        audience: Option<&str>,
        courses: &[CourseRecord],
        top_k: usize,
    ) -> Vec<Candidate> {
        let documents: Vec<String> = courses.iter().map(CourseRecord::document).collect();
        let query = self.table.get(tier).course_document();
        let scored = similarities(&documents, &query)
            .zip(courses)
            .map(|(similarity, course)| {
                let boost = if course.audience_matches(audience) {
                    self.boosts.audience
                } else {
                    1.0_f32
                };
                Candidate::new(course.id.clone(), similarity * boost)
            })
            .collect();
        top(scored, top_k)
    }

    /// Rank `consultants` for a user in `tier`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "boosts multiply the similarity score"
    )]
    pub fn rank_consultants(
        &self,
        tier: RiskTier,
        consultants: &[ConsultantRecord],
        top_k: usize,
    ) -> Vec<Candidate> {
        let profile = self.table.get(tier);
        let documents: Vec<String> = consultants
            .iter()
            .map(ConsultantRecord::document)
            .collect();
        let query = profile.consultant_document();
        let scored = similarities(&documents, &query)
            .zip(consultants)
            .map(|(similarity, consultant)| {
                let mut score = similarity;
                if profile.matches_specialization(&consultant.specialization_tags()) {
                    score *= self.boosts.specialization;
                }
                if consultant
                    .experience_years
                    .is_some_and(|years| years >= self.boosts.experience_years)
                {
                    score *= self.boosts.experience;
                }
                Candidate::new(consultant.id.clone(), score)
            })
            .collect();
        top(scored, top_k)
    }
}

fn similarities<'d>(documents: &'d [String], query: &str) -> impl Iterator<Item = f32> + 'd {
    let space = TfIdf::fit(documents);
    let target = space.transform(query);
    documents
        .iter()
        .map(move |document| space.transform(document).cosine(&target))
}

fn top(mut candidates: Vec<Candidate>, top_k: usize) -> Vec<Candidate> {
    candidates.sort_by(|lhs, rhs| rhs.score.total_cmp(&lhs.score));
    candidates.truncate(top_k);
    candidates
}
