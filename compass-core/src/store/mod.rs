//! Read-only data access for the recommendation engine.
//!
//! A [`DataSource`] supplies the record collections the engine scores
//! against. Each call returns an owned snapshot; implementations must not
//! mutate shared state while serving reads. [`Dataset::load`] reads every
//! collection once so a single request works against a consistent view.

use std::fmt;

use thiserror::Error;

use crate::{ConsultantRecord, CourseRecord, InteractionRecord, RiskRule, SurveyRecord};

mod snapshot;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use snapshot::SnapshotSource;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SCHEMA_SQL, SqliteSource, SqliteSourceError};

/// Record collection exposed by a [`DataSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Survey attempts.
    Surveys,
    /// Course catalog.
    Courses,
    /// Consultant roster.
    Consultants,
    /// User-item interaction history.
    Interactions,
    /// Risk-assessment score bands.
    RiskRules,
}

impl Collection {
    /// Return the collection name as a `&str`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Surveys => "surveys",
            Self::Courses => "courses",
            Self::Consultants => "consultants",
            Self::Interactions => "interactions",
            Self::RiskRules => "risk rules",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while reading from a [`DataSource`].
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// The backend failed while reading a collection.
    #[error("failed to read {collection}: {source}")]
    Read {
        /// Collection being read.
        collection: Collection,
        /// Backend failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The backend could not be reached at all.
    #[error("data source unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

impl DataSourceError {
    /// Wrap a backend error with the collection being read.
    pub fn read<E>(collection: Collection, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Read {
            collection,
            source: Box::new(source),
        }
    }

    /// Collection that failed, if the error is tied to one.
    pub const fn collection(&self) -> Option<Collection> {
        match self {
            Self::Read { collection, .. } => Some(*collection),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Read-only supplier of survey, catalog and interaction records.
///
/// Implementations must be side-effect free and `Send + Sync` so a single
/// engine can serve concurrent requests.
///
/// # Examples
/// ```
/// use compass_core::{
///     ConsultantRecord, CourseRecord, DataSource, DataSourceError, InteractionRecord,
///     SurveyRecord,
/// };
///
/// struct Empty;
///
/// impl DataSource for Empty {
///     fn surveys(&self) -> Result<Vec<SurveyRecord>, DataSourceError> { Ok(Vec::new()) }
///     fn courses(&self) -> Result<Vec<CourseRecord>, DataSourceError> { Ok(Vec::new()) }
///     fn consultants(&self) -> Result<Vec<ConsultantRecord>, DataSourceError> { Ok(Vec::new()) }
///     fn interactions(&self) -> Result<Vec<InteractionRecord>, DataSourceError> { Ok(Vec::new()) }
/// }
///
/// assert!(Empty.risk_rules().unwrap().is_empty());
/// ```
pub trait DataSource: Send + Sync {
    /// All survey attempts, most recently completed first where the backend
    /// can order them.
    fn surveys(&self) -> Result<Vec<SurveyRecord>, DataSourceError>;

    /// The course catalog.
    fn courses(&self) -> Result<Vec<CourseRecord>, DataSourceError>;

    /// Consultants open for recommendation.
    fn consultants(&self) -> Result<Vec<ConsultantRecord>, DataSourceError>;

    /// Course and consultant interactions.
    fn interactions(&self) -> Result<Vec<InteractionRecord>, DataSourceError>;

    /// Active and inactive risk-assessment rules. Defaults to none.
    fn risk_rules(&self) -> Result<Vec<RiskRule>, DataSourceError> {
        Ok(Vec::new())
    }
}

impl<T: DataSource + ?Sized> DataSource for &T {
    fn surveys(&self) -> Result<Vec<SurveyRecord>, DataSourceError> {
        (**self).surveys()
    }

    fn courses(&self) -> Result<Vec<CourseRecord>, DataSourceError> {
        (**self).courses()
    }

    fn consultants(&self) -> Result<Vec<ConsultantRecord>, DataSourceError> {
        (**self).consultants()
    }

    fn interactions(&self) -> Result<Vec<InteractionRecord>, DataSourceError> {
        (**self).interactions()
    }

    fn risk_rules(&self) -> Result<Vec<RiskRule>, DataSourceError> {
        (**self).risk_rules()
    }
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn surveys(&self) -> Result<Vec<SurveyRecord>, DataSourceError> {
        (**self).surveys()
    }

    fn courses(&self) -> Result<Vec<CourseRecord>, DataSourceError> {
        (**self).courses()
    }

    fn consultants(&self) -> Result<Vec<ConsultantRecord>, DataSourceError> {
        (**self).consultants()
    }

    fn interactions(&self) -> Result<Vec<InteractionRecord>, DataSourceError> {
        (**self).interactions()
    }

    fn risk_rules(&self) -> Result<Vec<RiskRule>, DataSourceError> {
        (**self).risk_rules()
    }
}

/// One consistent read of every collection a request needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Survey attempts.
    pub surveys: Vec<SurveyRecord>,
    /// Course catalog.
    pub courses: Vec<CourseRecord>,
    /// Consultant roster.
    pub consultants: Vec<ConsultantRecord>,
    /// Interaction history.
    pub interactions: Vec<InteractionRecord>,
}

impl Dataset {
    /// Read surveys, catalog and interactions from `source`.
    ///
    /// # Errors
    /// Propagates the first [`DataSourceError`] raised by the source.
    pub fn load<S: DataSource + ?Sized>(source: &S) -> Result<Self, DataSourceError> {
        Ok(Self {
            surveys: source.surveys()?,
            courses: source.courses()?,
            consultants: source.consultants()?,
            interactions: source.interactions()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingSource, sample_source};
    use rstest::rstest;

    #[rstest]
    fn dataset_reads_every_collection() {
        let source = sample_source();
        let dataset = Dataset::load(&source).expect("sample source is infallible");
        assert!(!dataset.surveys.is_empty());
        assert!(!dataset.courses.is_empty());
        assert!(!dataset.consultants.is_empty());
        assert!(!dataset.interactions.is_empty());
    }

    #[rstest]
    #[case(Collection::Surveys)]
    #[case(Collection::Interactions)]
    fn dataset_reports_failing_collection(#[case] collection: Collection) {
        let source = FailingSource::on(collection);
        let error = Dataset::load(&source).expect_err("failing source");
        assert_eq!(error.collection(), Some(collection));
        assert!(error.to_string().contains(collection.as_str()));
    }
}
