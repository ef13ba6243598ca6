//! Fixtures shared by unit and behaviour tests.
//!
//! [`sample_source`] builds a small but realistic platform: two LOW-risk
//! users in the `assist` category, two HIGH-risk users in the `crafft`
//! category and one MEDIUM-risk user without history.

use chrono::{DateTime, TimeZone, Utc};

use crate::{
    Collection, ConsultantRecord, CourseRecord, DataSource, DataSourceError, Demographics,
    InteractionRecord, ItemKind, RiskRule, RiskTier, SnapshotSource, SurveyRecord,
};

/// Midnight UTC on the given day of January 2024.
pub fn january(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A completed survey for `user_id` on the given January day.
pub fn survey(user_id: &str, tier: RiskTier, category: &str, day: u32) -> SurveyRecord {
    SurveyRecord::new(user_id, tier, 0)
        .with_category(category)
        .completed(january(day))
}

/// A course interaction with a pre-computed rating.
///
/// Out-of-range ratings are clamped.
pub fn course_rating(user_id: &str, course_id: &str, rating: f32) -> InteractionRecord {
    InteractionRecord::from_enrollment(user_id, course_id, Some(rating * 100.0))
}

/// A consultant interaction with a pre-computed rating.
///
/// Out-of-range ratings are clamped.
pub fn consultant_rating(user_id: &str, consultant_id: &str, rating: f32) -> InteractionRecord {
    InteractionRecord::clamped(user_id, consultant_id, ItemKind::Consultant, rating)
}

/// Course catalog used by [`sample_source`].
pub fn sample_courses() -> Vec<CourseRecord> {
    vec![
        CourseRecord::new(
            "c-prevention",
            "Staying Ahead",
            "prevention and awareness for young people",
        )
        .with_category("Prevention")
        .with_audience("ALL"),
        CourseRecord::new(
            "c-recovery",
            "Road to Recovery",
            "treatment options and recovery planning with intensive_support",
        )
        .with_category("Treatment")
        .with_audience("ADULT"),
        CourseRecord::new(
            "c-coping",
            "Coping Skills Workshop",
            "intervention techniques coping_skills and family_support",
        )
        .with_category("Intervention")
        .with_audience("STUDENT"),
        CourseRecord::new(
            "c-lifestyle",
            "Healthy Habits",
            "healthy_lifestyle routines and awareness",
        )
        .with_category("Prevention")
        .with_audience("STUDENT"),
    ]
}

/// Consultant roster used by [`sample_source`].
pub fn sample_consultants() -> Vec<ConsultantRecord> {
    let mut away = ConsultantRecord::new("k-away", "Dr. Away", "psychiatry").with_experience(20);
    away.is_available = false;
    vec![
        ConsultantRecord::new("k-general", "Dr. Mai", "general, prevention").with_experience(6),
        ConsultantRecord::new("k-psych", "Dr. Tran", "psychiatry, addiction_specialist")
            .with_experience(10),
        ConsultantRecord::new("k-family", "Dr. Le", "family_therapy, intervention")
            .with_experience(3),
        away,
    ]
}

/// Survey history used by [`sample_source`].
pub fn sample_surveys() -> Vec<SurveyRecord> {
    let student = Demographics {
        audience: Some("STUDENT".to_owned()),
        ..Demographics::default()
    };
    vec![
        survey("u-low-1", RiskTier::Low, "assist", 10).with_demographics(student.clone()),
        survey("u-low-1", RiskTier::High, "assist", 2),
        survey("u-low-2", RiskTier::Low, "assist", 8).with_demographics(student),
        survey("u-high-1", RiskTier::High, "crafft", 9),
        survey("u-high-2", RiskTier::High, "crafft", 7),
        survey("u-medium", RiskTier::Medium, "assist", 5),
    ]
}

/// Interaction history used by [`sample_source`].
pub fn sample_interactions() -> Vec<InteractionRecord> {
    vec![
        course_rating("u-low-1", "c-prevention", 0.8),
        consultant_rating("u-low-1", "k-general", 1.0),
        course_rating("u-low-2", "c-prevention", 0.6),
        course_rating("u-low-2", "c-lifestyle", 0.9),
        consultant_rating("u-low-2", "k-general", 0.5),
        consultant_rating("u-low-2", "k-family", 1.0),
        course_rating("u-high-1", "c-recovery", 1.0),
        consultant_rating("u-high-1", "k-psych", 1.0),
        course_rating("u-high-2", "c-recovery", 0.4),
        course_rating("u-high-2", "c-coping", 0.7),
        consultant_rating("u-high-2", "k-psych", 0.5),
    ]
}

/// Risk rules for the `assist` instrument.
pub fn sample_rules() -> Vec<RiskRule> {
    vec![
        RiskRule::new("assist", 0, 3, RiskTier::Low),
        RiskRule::new("assist", 4, 26, RiskTier::Medium),
        RiskRule::new("assist", 27, 39, RiskTier::High),
    ]
}

/// Snapshot combining every sample collection.
pub fn sample_source() -> SnapshotSource {
    SnapshotSource::default()
        .with_surveys(sample_surveys())
        .with_courses(sample_courses())
        .with_consultants(sample_consultants())
        .with_interactions(sample_interactions())
        .with_risk_rules(sample_rules())
}

/// Data source that fails when a chosen collection is read.
#[derive(Debug, Clone)]
pub struct FailingSource {
    failing: Collection,
    inner: SnapshotSource,
}

impl FailingSource {
    /// Serve [`sample_source`] but fail on `collection`.
    pub fn on(collection: Collection) -> Self {
        Self {
            failing: collection,
            inner: sample_source(),
        }
    }

    fn guard(&self, collection: Collection) -> Result<(), DataSourceError> {
        if collection == self.failing {
            return Err(DataSourceError::read(
                collection,
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            ));
        }
        Ok(())
    }
}

impl DataSource for FailingSource {
    fn surveys(&self) -> Result<Vec<SurveyRecord>, DataSourceError> {
        self.guard(Collection::Surveys)?;
        self.inner.surveys()
    }

    fn courses(&self) -> Result<Vec<CourseRecord>, DataSourceError> {
        self.guard(Collection::Courses)?;
        self.inner.courses()
    }

    fn consultants(&self) -> Result<Vec<ConsultantRecord>, DataSourceError> {
        self.guard(Collection::Consultants)?;
        self.inner.consultants()
    }

    fn interactions(&self) -> Result<Vec<InteractionRecord>, DataSourceError> {
        self.guard(Collection::Interactions)?;
        self.inner.interactions()
    }

    fn risk_rules(&self) -> Result<Vec<RiskRule>, DataSourceError> {
        self.guard(Collection::RiskRules)?;
        self.inner.risk_rules()
    }
}

/// Persist a snapshot into a fresh SQLite database using [`crate::SCHEMA_SQL`].
///
/// Consultant names are stored on a synthetic user row. Consultant
/// interactions become `COMPLETED` appointments when rated 1.0 and
/// `CONFIRMED` otherwise.
///
/// # Errors
/// Returns any SQLite error raised while creating tables or inserting rows,
/// and propagates read failures from `source` as
/// [`rusqlite::Error::ToSqlConversionFailure`].
#[cfg(feature = "store-sqlite")]
pub fn write_sqlite_dataset<S: DataSource>(
    path: &std::path::Path,
    source: &S,
) -> Result<(), rusqlite::Error> {
    use rusqlite::{Connection, params};
    use std::collections::BTreeSet;

    let read = |err: DataSourceError| rusqlite::Error::ToSqlConversionFailure(Box::new(err));
    let surveys = source.surveys().map_err(read)?;
    let courses = source.courses().map_err(read)?;
    let consultants = source.consultants().map_err(read)?;
    let interactions = source.interactions().map_err(read)?;
    let rules = source.risk_rules().map_err(read)?;

    let mut connection = Connection::open(path)?;
    connection.execute_batch(crate::SCHEMA_SQL)?;
    let tx = connection.transaction()?;

    let mut seen_users = BTreeSet::new();
    for (index, record) in surveys.iter().enumerate() {
        if seen_users.insert(record.user_id.clone()) {
            let people = &record.demographics;
            tx.execute(
                "INSERT INTO users (id, first_name, last_name, age, user_type)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.user_id,
                    people.first_name,
                    people.last_name,
                    people.age,
                    people.audience
                ],
            )?;
        }
        tx.execute(
            "INSERT INTO survey_attempts
                 (id, user_id, survey_category, total_score, risk_level, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                format!("survey-{index}"),
                record.user_id,
                record.survey_category,
                record.total_score,
                record.risk_tier.as_str(),
                record.completed_at
            ],
        )?;
    }

    for course in &courses {
        if let Some(category) = &course.category {
            tx.execute(
                "INSERT OR IGNORE INTO course_categories (id, name) VALUES (?1, ?1)",
                params![category],
            )?;
        }
        let status = match course.status {
            crate::CourseStatus::WaitingApprove => "WAITING_APPROVE",
            crate::CourseStatus::Approved => "APPROVED",
            crate::CourseStatus::Rejected => "REJECTED",
        };
        tx.execute(
            "INSERT INTO courses
                 (id, title, description, target_audience, category_id, status, duration_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                course.id,
                course.title,
                course.description,
                course.target_audience,
                course.category,
                status,
                course.duration_minutes
            ],
        )?;
    }

    for consultant in &consultants {
        let user_id = format!("consultant:{}", consultant.id);
        tx.execute(
            "INSERT INTO users (id, first_name) VALUES (?1, ?2)",
            params![user_id, consultant.full_name],
        )?;
        tx.execute(
            "INSERT INTO consultants
                 (id, user_id, specialization, experience_years, bio, is_available)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                consultant.id,
                user_id,
                consultant.specialization,
                consultant.experience_years,
                consultant.bio,
                consultant.is_available
            ],
        )?;
    }

    for (index, interaction) in interactions.iter().enumerate() {
        match interaction.kind() {
            ItemKind::Course => tx.execute(
                "INSERT INTO course_enrollments
                     (id, user_id, course_id, progress_percentage, enrollment_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    format!("enrollment-{index}"),
                    interaction.user_id(),
                    interaction.item_id(),
                    f64::from(interaction.rating()) * 100.0,
                    interaction.interacted_at()
                ],
            )?,
            ItemKind::Consultant => {
                let status = if interaction.rating() >= 1.0 {
                    "COMPLETED"
                } else {
                    "CONFIRMED"
                };
                tx.execute(
                    "INSERT INTO appointments
                         (id, user_id, consultant_id, status, booking_time)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        format!("appointment-{index}"),
                        interaction.user_id(),
                        interaction.item_id(),
                        status,
                        interaction.interacted_at()
                    ],
                )?
            }
        };
    }

    for (index, rule) in rules.iter().enumerate() {
        tx.execute(
            "INSERT INTO risk_assessment_rules
                 (id, survey_type_id, min_score, max_score, risk_level, description, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                format!("rule-{index}"),
                rule.survey_type_id,
                rule.min_score,
                rule.max_score,
                rule.risk_tier.as_str(),
                rule.description,
                rule.is_active
            ],
        )?;
    }

    tx.commit()
}
