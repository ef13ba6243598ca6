//! The hybrid recommender tying the resolver and both engines together.
//!
//! A request reads one [`Dataset`] from the data source, resolves the
//! user's profile, runs the content and collaborative engines over the same
//! snapshot and merges their candidates per item kind. Nothing is cached
//! between requests, so one recommender may serve many threads.

use std::collections::{BTreeSet, HashMap};

use compass_core::{
    CollaborativeEvidence, ConsultantRecommendation, ConsultantRecord, CourseRecommendation,
    CourseRecord, DataSource, Dataset, ItemKind, RecommendError, RecommendationRequest,
    RecommendationResponse, RecommendationStatus, RecommendationSummary, Recommender,
    RiskProfile, RiskProfileTable, RiskTier, classify_score,
};
use log::{debug, info, warn};

use crate::{
    Candidate, CohortConfig, CollaborativeEngine, ConfigError, ContentBoosts, ContentEngine,
    HybridWeights, InteractionStats, MergedItem, RiskSummary, UserInteractionStats,
    current_survey, merge, reason, resolve, resolve_all,
};

/// Which signals a request combines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Blend content and collaborative scores with the configured weights.
    #[default]
    Hybrid,
    /// Content similarity only.
    ContentOnly,
    /// Peer behaviour only.
    CollaborativeOnly,
}

impl Mode {
    const fn uses_content(self) -> bool {
        matches!(self, Self::Hybrid | Self::ContentOnly)
    }

    const fn uses_collaborative(self) -> bool {
        matches!(self, Self::Hybrid | Self::CollaborativeOnly)
    }
}

/// Tunable settings for [`HybridRecommender`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    /// Blend weights for the hybrid score.
    pub weights: HybridWeights,
    /// Cohort and endorsement thresholds.
    pub cohort: CohortConfig,
    /// Content boosts.
    pub boosts: ContentBoosts,
    /// Engines return `diversity_factor × limit` candidates before merging.
    pub diversity_factor: usize,
    /// Upper bound on consultants for [`HybridRecommender::get_recommendations`].
    pub consultant_limit: usize,
    /// Tier keyword table.
    pub profiles: RiskProfileTable,
}

impl RecommenderConfig {
    /// Validate every nested setting and return the configuration.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] raised by the weights, cohort
    /// thresholds, boosts or diversity factor.
    pub fn validate(self) -> Result<Self, ConfigError> {
        self.weights.validate()?;
        self.cohort.validate()?;
        self.boosts.validate()?;
        if self.diversity_factor == 0 {
            return Err(ConfigError::InvalidDiversityFactor {
                value: self.diversity_factor,
            });
        }
        Ok(self)
    }
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            weights: HybridWeights::default(),
            cohort: CohortConfig::default(),
            boosts: ContentBoosts::default(),
            diversity_factor: 2,
            consultant_limit: compass_core::DEFAULT_CONSULTANT_LIMIT,
            profiles: RiskProfileTable::default(),
        }
    }
}

/// Recommends courses and consultants from a [`DataSource`].
///
/// # Examples
/// ```
/// use compass_core::{RecommendationStatus, test_support::sample_source};
/// use compass_scorer::HybridRecommender;
///
/// let engine = HybridRecommender::new(sample_source());
/// let response = engine.get_recommendations("u-low-1", 5);
/// assert_eq!(response.status, RecommendationStatus::Success);
/// assert!(!response.courses.is_empty());
/// ```
#[derive(Debug)]
pub struct HybridRecommender<S> {
    source: S,
    config: RecommenderConfig,
}

impl<S: DataSource> HybridRecommender<S> {
    /// Build a recommender with the default configuration.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: RecommenderConfig::default(),
        }
    }

    /// Build a recommender with a validated configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn with_config(source: S, config: RecommenderConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            source,
            config: config.validate()?,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// The underlying data source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Recommend `top_k` courses and up to the configured consultant limit.
    ///
    /// Never fails: data source errors produce an
    /// [`RecommendationStatus::Error`] response.
    #[must_use]
    pub fn get_recommendations(&self, user_id: &str, top_k: usize) -> RecommendationResponse {
        let request =
            RecommendationRequest::from_top_k(user_id, top_k, self.config.consultant_limit);
        self.recommend(&request)
    }

    /// Rank by content similarity only.
    ///
    /// # Errors
    /// Returns [`RecommendError::DataSource`] when the snapshot cannot be read.
    pub fn content_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, RecommendError> {
        self.recommend_with(request, Mode::ContentOnly)
    }

    /// Rank by peer behaviour only.
    ///
    /// # Errors
    /// Returns [`RecommendError::DataSource`] when the snapshot cannot be read.
    pub fn collaborative_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, RecommendError> {
        self.recommend_with(request, Mode::CollaborativeOnly)
    }

    /// Rank items for `request` using the signals selected by `mode`.
    ///
    /// # Errors
    /// Returns [`RecommendError::DataSource`] when the snapshot cannot be read.
    pub fn recommend_with(
        &self,
        request: &RecommendationRequest,
        mode: Mode,
    ) -> Result<RecommendationResponse, RecommendError> {
        let dataset = self.load()?;
        let user_id = request.user_id.as_str();
        let profiles = resolve_all(&dataset.surveys);
        let profile = profiles
            .get(user_id)
            .cloned()
            .unwrap_or_else(RiskProfile::unknown);
        if !profile.is_known() {
            warn!("user {user_id} has no survey history; using MEDIUM risk profile");
        }
        let tier = profile.effective_tier();
        let audience = current_survey(user_id, &dataset.surveys)
            .and_then(|survey| survey.demographics.audience.as_deref());
        let weights = match mode {
            Mode::Hybrid => self.config.weights,
            Mode::ContentOnly => HybridWeights::CONTENT_ONLY,
            Mode::CollaborativeOnly => HybridWeights::COLLABORATIVE_ONLY,
        };

        let consultants: Vec<ConsultantRecord> = dataset
            .consultants
            .iter()
            .filter(|consultant| consultant.is_available)
            .cloned()
            .collect();
        let content = ContentEngine::new(&self.config.profiles, self.config.boosts);
        let collaborative =
            CollaborativeEngine::new(self.config.cohort, &profiles, &dataset.interactions);

        let course_pool = self.pool(request.course_limit);
        let course_ids: BTreeSet<&str> = dataset.courses.iter().map(|c| c.id.as_str()).collect();
        let (courses, course_counts) = merge(
            gated(mode.uses_content(), || {
                content.rank_courses(tier, audience, &dataset.courses, course_pool)
            }),
            gated(mode.uses_collaborative(), || {
                collaborative.rank(user_id, &profile, ItemKind::Course, &course_ids, course_pool)
            }),
            request.course_limit,
            weights,
        );

        let consultant_pool = self.pool(request.consultant_limit);
        let consultant_ids: BTreeSet<&str> = consultants.iter().map(|c| c.id.as_str()).collect();
        let (ranked_consultants, consultant_counts) = merge(
            gated(mode.uses_content(), || {
                content.rank_consultants(tier, &consultants, consultant_pool)
            }),
            gated(mode.uses_collaborative(), || {
                collaborative.rank(
                    user_id,
                    &profile,
                    ItemKind::Consultant,
                    &consultant_ids,
                    consultant_pool,
                )
            }),
            request.consultant_limit,
            weights,
        );

        let summary = RecommendationSummary {
            courses: course_counts,
            consultants: consultant_counts,
        };
        debug!("pipeline counts for {user_id}: {summary:?}");
        let missing = missing_signals(&profile, &summary, mode);
        let (status, message) = if missing.is_empty() {
            (RecommendationStatus::Success, None)
        } else {
            (RecommendationStatus::Partial, Some(missing.join("; ")))
        };

        let response = RecommendationResponse {
            user_id: user_id.to_owned(),
            courses: course_recommendations(courses, &dataset.courses, tier),
            consultants: consultant_recommendations(ranked_consultants, &consultants, tier),
            risk_profile: profile,
            summary,
            status,
            message,
        };
        info!(
            "recommended {} courses and {} consultants to {user_id} ({:?})",
            response.courses.len(),
            response.consultants.len(),
            response.status
        );
        Ok(response)
    }

    /// Resolve the current risk profile of `user_id`.
    ///
    /// # Errors
    /// Returns [`RecommendError::DataSource`] when surveys cannot be read.
    pub fn risk_profile(&self, user_id: &str) -> Result<RiskProfile, RecommendError> {
        let surveys = self.source.surveys().map_err(wrap)?;
        Ok(resolve(user_id, &surveys))
    }

    /// Summarise the current tiers of every surveyed user.
    ///
    /// # Errors
    /// Returns [`RecommendError::DataSource`] when surveys cannot be read.
    pub fn risk_summary(&self) -> Result<RiskSummary, RecommendError> {
        let surveys = self.source.surveys().map_err(wrap)?;
        Ok(RiskSummary::from_profiles(&resolve_all(&surveys)))
    }

    /// Summarise the whole interaction history.
    ///
    /// # Errors
    /// Returns [`RecommendError::DataSource`] when interactions cannot be read.
    pub fn interaction_stats(&self) -> Result<InteractionStats, RecommendError> {
        let interactions = self.source.interactions().map_err(wrap)?;
        Ok(InteractionStats::from_records(&interactions))
    }

    /// Summarise the interaction history of `user_id`.
    ///
    /// # Errors
    /// Returns [`RecommendError::DataSource`] when interactions cannot be read.
    pub fn user_interaction_stats(
        &self,
        user_id: &str,
    ) -> Result<Option<UserInteractionStats>, RecommendError> {
        let interactions = self.source.interactions().map_err(wrap)?;
        Ok(UserInteractionStats::for_user(user_id, &interactions))
    }

    /// Classify a survey score with the data source's risk rules.
    ///
    /// # Errors
    /// Returns [`RecommendError::DataSource`] when the rules cannot be read.
    pub fn classify(
        &self,
        survey_type_id: &str,
        score: i32,
    ) -> Result<Option<RiskTier>, RecommendError> {
        let rules = self.source.risk_rules().map_err(wrap)?;
        Ok(classify_score(&rules, survey_type_id, score))
    }

    fn load(&self) -> Result<Dataset, RecommendError> {
        Dataset::load(&self.source).map_err(|source| {
            warn!("recommendation data unavailable: {source}");
            wrap(source)
        })
    }

    const fn pool(&self, limit: usize) -> usize {
        limit.saturating_mul(self.config.diversity_factor)
    }
}

impl<S: DataSource> Recommender for HybridRecommender<S> {
    fn try_recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, RecommendError> {
        self.recommend_with(request, Mode::Hybrid)
    }
}

const fn wrap(source: compass_core::DataSourceError) -> RecommendError {
    RecommendError::DataSource { source }
}

fn gated(enabled: bool, run: impl FnOnce() -> Vec<Candidate>) -> Vec<Candidate> {
    if enabled { run() } else { Vec::new() }
}

fn missing_signals(
    profile: &RiskProfile,
    summary: &RecommendationSummary,
    mode: Mode,
) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !profile.is_known() {
        missing.push("no survey history; using MEDIUM risk profile");
    }
    if mode.uses_content() {
        if summary.courses.content_hits == 0 {
            missing.push("no content-based course matches");
        }
        if summary.consultants.content_hits == 0 {
            missing.push("no content-based consultant matches");
        }
    }
    if mode.uses_collaborative() {
        if summary.courses.collaborative_hits == 0 {
            missing.push("no collaborative course matches");
        }
        if summary.consultants.collaborative_hits == 0 {
            missing.push("no collaborative consultant matches");
        }
    }
    missing
}

fn course_recommendations(
    merged: Vec<MergedItem>,
    catalog: &[CourseRecord],
    tier: RiskTier,
) -> Vec<CourseRecommendation> {
    let by_id: HashMap<&str, &CourseRecord> =
        catalog.iter().map(|course| (course.id.as_str(), course)).collect();
    merged
        .into_iter()
        .filter_map(|item| {
            let course = by_id.get(item.item_id.as_str())?;
            Some(CourseRecommendation {
                course_id: course.id.clone(),
                title: course.title.clone(),
                description: course.description.clone(),
                target_audience: course.target_audience.clone(),
                category: course.category.clone(),
                enrollment_count: course.enrollment_count,
                reason: reason(&item.scores, item.evidence.as_ref(), tier),
                scores: item.scores,
                evidence: item.evidence,
            })
        })
        .collect()
}

fn consultant_recommendations(
    merged: Vec<MergedItem>,
    roster: &[ConsultantRecord],
    tier: RiskTier,
) -> Vec<ConsultantRecommendation> {
    let by_id: HashMap<&str, &ConsultantRecord> = roster
        .iter()
        .map(|consultant| (consultant.id.as_str(), consultant))
        .collect();
    merged
        .into_iter()
        .filter_map(|item| {
            let consultant = by_id.get(item.item_id.as_str())?;
            let evidence: Option<CollaborativeEvidence> = item.evidence;
            Some(ConsultantRecommendation {
                consultant_id: consultant.id.clone(),
                full_name: consultant.full_name.clone(),
                specialization: consultant.specialization.clone(),
                experience_years: consultant.experience_years,
                total_appointments: consultant.total_appointments,
                reason: reason(&item.scores, evidence.as_ref(), tier),
                scores: item.scores,
                evidence,
            })
        })
        .collect()
}
