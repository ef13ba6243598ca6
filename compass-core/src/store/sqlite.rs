//! SQLite-backed data source over the platform's relational schema.
//!
//! The source opens the database read-only and maps rows onto domain
//! records. Soft-deleted users and appointments are skipped, consultants
//! flagged unavailable are excluded, and cancelled appointments contribute
//! no interaction. [`SCHEMA_SQL`] documents the expected tables.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

use super::{Collection, DataSource, DataSourceError};
use crate::{
    AppointmentStatus, ConsultantRecord, CourseRecord, Demographics,
    InteractionRecord, RiskRule, RiskTier, SurveyRecord,
};

/// Tables read by [`SqliteSource`].
pub const SCHEMA_SQL: &str = "
CREATE TABLE users (
    id TEXT PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    age INTEGER,
    user_type TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE survey_attempts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    survey_category TEXT,
    total_score INTEGER NOT NULL DEFAULT 0,
    risk_level TEXT NOT NULL,
    completed_at TEXT
);
CREATE TABLE course_categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE courses (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    target_audience TEXT,
    category_id TEXT REFERENCES course_categories(id),
    status TEXT NOT NULL DEFAULT 'WAITING_APPROVE',
    duration_minutes INTEGER,
    created_at TEXT
);
CREATE TABLE course_enrollments (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    course_id TEXT NOT NULL REFERENCES courses(id),
    progress_percentage REAL,
    enrollment_date TEXT
);
CREATE TABLE consultants (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    specialization TEXT,
    experience_years INTEGER,
    bio TEXT,
    is_available INTEGER NOT NULL DEFAULT 1,
    created_at TEXT
);
CREATE TABLE appointments (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    consultant_id TEXT NOT NULL REFERENCES consultants(id),
    status TEXT NOT NULL DEFAULT 'PENDING',
    booking_time TEXT,
    is_deleted INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE risk_assessment_rules (
    id TEXT PRIMARY KEY,
    survey_type_id TEXT NOT NULL,
    min_score INTEGER NOT NULL,
    max_score INTEGER NOT NULL,
    risk_level TEXT NOT NULL,
    description TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_deleted INTEGER NOT NULL DEFAULT 0
);
";

const SURVEYS_QUERY: &str = "
SELECT sa.user_id, sa.risk_level, sa.survey_category, sa.total_score, sa.completed_at,
       u.first_name, u.last_name, u.age, u.user_type
FROM survey_attempts sa
JOIN users u ON u.id = sa.user_id
WHERE u.is_deleted = 0
ORDER BY sa.completed_at IS NULL, sa.completed_at DESC, sa.rowid";

const COURSES_QUERY: &str = "
SELECT c.id, c.title, c.description, c.target_audience, cc.name, c.status,
       c.duration_minutes,
       (SELECT COUNT(*) FROM course_enrollments e WHERE e.course_id = c.id)
FROM courses c
LEFT JOIN course_categories cc ON cc.id = c.category_id
ORDER BY c.created_at DESC, c.rowid";

const CONSULTANTS_QUERY: &str = "
SELECT c.id,
       TRIM(COALESCE(u.first_name, '') || ' ' || COALESCE(u.last_name, '')),
       c.specialization, c.experience_years, c.is_available, c.bio,
       (SELECT COUNT(*) FROM appointments a
        WHERE a.consultant_id = c.id AND a.is_deleted = 0)
FROM consultants c
JOIN users u ON u.id = c.user_id
WHERE c.is_available = 1 AND u.is_deleted = 0
ORDER BY c.created_at DESC, c.rowid";

const ENROLLMENTS_QUERY: &str = "
SELECT user_id, course_id, progress_percentage, enrollment_date
FROM course_enrollments
ORDER BY rowid";

const APPOINTMENTS_QUERY: &str = "
SELECT user_id, consultant_id, status, booking_time
FROM appointments
WHERE is_deleted = 0
ORDER BY rowid";

const RULES_QUERY: &str = "
SELECT survey_type_id, min_score, max_score, risk_level, description, is_active
FROM risk_assessment_rules
WHERE is_deleted = 0
ORDER BY survey_type_id, min_score, rowid";

/// Error raised when opening or decoding the SQLite database.
#[derive(Debug, Error)]
pub enum SqliteSourceError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A text column held a value outside its enumeration.
    #[error("column {column} holds unexpected value '{value}': {reason}")]
    InvalidValue {
        /// Column being decoded.
        column: &'static str,
        /// Raw stored value.
        value: String,
        /// Parser message.
        reason: String,
    },
    /// Another thread panicked while holding the connection.
    #[error("SQLite connection lock was poisoned")]
    Poisoned,
    /// Generic SQLite error when reading rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Read-only data source backed by a SQLite database.
pub struct SqliteSource {
    path: PathBuf,
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteSource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteSource {
    /// Open the database at `path` in read-only mode.
    ///
    /// # Errors
    /// Returns [`SqliteSourceError::OpenDatabase`] when the file cannot be
    /// opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqliteSourceError> {
        let path = path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqliteSourceError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            connection: Mutex::new(connection),
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, SqliteSourceError> {
        self.connection
            .lock()
            .map_err(|_| SqliteSourceError::Poisoned)
    }

    fn read<T, F>(&self, collection: Collection, load: F) -> Result<Vec<T>, DataSourceError>
    where
        F: FnOnce(&Connection) -> Result<Vec<T>, SqliteSourceError>,
    {
        let rows = self
            .connection()
            .and_then(|connection| load(&*connection))
            .map_err(|source| DataSourceError::read(collection, source))?;
        debug!("loaded {} {collection} from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

impl DataSource for SqliteSource {
    fn surveys(&self) -> Result<Vec<SurveyRecord>, DataSourceError> {
        self.read(Collection::Surveys, |connection| {
            query_rows(connection, SURVEYS_QUERY, survey_from_row)
        })
    }

    fn courses(&self) -> Result<Vec<CourseRecord>, DataSourceError> {
        self.read(Collection::Courses, |connection| {
            query_rows(connection, COURSES_QUERY, course_from_row)
        })
    }

    fn consultants(&self) -> Result<Vec<ConsultantRecord>, DataSourceError> {
        self.read(Collection::Consultants, |connection| {
            query_rows(connection, CONSULTANTS_QUERY, consultant_from_row)
        })
    }

    fn interactions(&self) -> Result<Vec<InteractionRecord>, DataSourceError> {
        self.read(Collection::Interactions, |connection| {
            let mut records = query_rows(connection, ENROLLMENTS_QUERY, enrollment_from_row)?;
            let appointments = query_rows(connection, APPOINTMENTS_QUERY, appointment_from_row)?;
            records.extend(appointments.into_iter().flatten());
            Ok(records)
        })
    }

    fn risk_rules(&self) -> Result<Vec<RiskRule>, DataSourceError> {
        self.read(Collection::RiskRules, |connection| {
            query_rows(connection, RULES_QUERY, rule_from_row)
        })
    }
}

fn query_rows<T, F>(
    connection: &Connection,
    query: &str,
    mut decode: F,
) -> Result<Vec<T>, SqliteSourceError>
where
    F: FnMut(&Row<'_>) -> Result<T, SqliteSourceError>,
{
    let mut statement = connection.prepare(query)?;
    let mut rows = statement.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(decode(row)?);
    }
    Ok(records)
}

fn parse_column<T>(column: &'static str, value: String) -> Result<T, SqliteSourceError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|reason| SqliteSourceError::InvalidValue {
            column,
            value,
            reason,
        })
}

fn survey_from_row(row: &Row<'_>) -> Result<SurveyRecord, SqliteSourceError> {
    let tier: RiskTier = parse_column("survey_attempts.risk_level", row.get(1)?)?;
    let completed_at: Option<DateTime<Utc>> = row.get(4)?;
    let mut survey = SurveyRecord::new(row.get::<_, String>(0)?, tier, row.get(3)?);
    survey.survey_category = row.get(2)?;
    survey.completed_at = completed_at;
    survey.demographics = Demographics {
        first_name: row.get(5)?,
        last_name: row.get(6)?,
        age: row.get(7)?,
        audience: row.get(8)?,
    };
    Ok(survey)
}

fn course_from_row(row: &Row<'_>) -> Result<CourseRecord, SqliteSourceError> {
    let description: Option<String> = row.get(2)?;
    let mut course = CourseRecord::new(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        description.unwrap_or_default(),
    );
    course.target_audience = row.get(3)?;
    course.category = row.get(4)?;
    course.status = parse_column("courses.status", row.get(5)?)?;
    course.duration_minutes = row.get(6)?;
    course.enrollment_count = row.get(7)?;
    Ok(course)
}

fn consultant_from_row(row: &Row<'_>) -> Result<ConsultantRecord, SqliteSourceError> {
    Ok(ConsultantRecord {
        id: row.get(0)?,
        full_name: row.get(1)?,
        specialization: row.get(2)?,
        experience_years: row.get(3)?,
        is_available: row.get(4)?,
        bio: row.get(5)?,
        total_appointments: row.get(6)?,
    })
}

fn enrollment_from_row(row: &Row<'_>) -> Result<InteractionRecord, SqliteSourceError> {
    let progress: Option<f64> = row.get(2)?;
    let enrolled_at: Option<DateTime<Utc>> = row.get(3)?;
    let record = InteractionRecord::from_enrollment(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        // Percentages lie in 0..=100.
        progress.map(|value| value as f32),
    );
    Ok(match enrolled_at {
        Some(when) => record.at(when),
        None => record,
    })
}

fn appointment_from_row(row: &Row<'_>) -> Result<Option<InteractionRecord>, SqliteSourceError> {
    let status: AppointmentStatus = parse_column("appointments.status", row.get(2)?)?;
    let booked_at: Option<DateTime<Utc>> = row.get(3)?;
    let record = InteractionRecord::from_appointment(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        status,
    );
    Ok(record.map(|interaction| match booked_at {
        Some(when) => interaction.at(when),
        None => interaction,
    }))
}

fn rule_from_row(row: &Row<'_>) -> Result<RiskRule, SqliteSourceError> {
    let tier: RiskTier = parse_column("risk_assessment_rules.risk_level", row.get(3)?)?;
    let mut rule = RiskRule::new(row.get::<_, String>(0)?, row.get(1)?, row.get(2)?, tier);
    rule.description = row.get(4)?;
    rule.is_active = row.get(5)?;
    Ok(rule)
}
