//! Catalog records: courses and consultants that can be recommended.
//!
//! Both record types expose a `document()` used by the content engine and a
//! stable `id`. Records are immutable snapshots owned by the data source.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Audience tags that match every user.
pub const UNIVERSAL_AUDIENCES: [&str; 2] = ["ALL", "GENERAL"];

/// Kind of recommendable item.
///
/// # Examples
/// ```
/// use compass_core::ItemKind;
///
/// assert_eq!(ItemKind::Course.as_str(), "course");
/// assert_eq!("consultant".parse::<ItemKind>(), Ok(ItemKind::Consultant));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ItemKind {
    /// An educational course.
    Course,
    /// A human consultant.
    Consultant,
}

impl ItemKind {
    /// Return the kind as a lowercase `&str`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Consultant => "consultant",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "course" => Ok(Self::Course),
            "consultant" => Ok(Self::Consultant),
            _ => Err(format!("unknown item kind '{s}'")),
        }
    }
}

/// Moderation state of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CourseStatus {
    /// Submitted and awaiting review.
    #[default]
    WaitingApprove,
    /// Published.
    Approved,
    /// Rejected by a reviewer.
    Rejected,
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WAITING_APPROVE" => Ok(Self::WaitingApprove),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(format!("unknown course status '{s}'")),
        }
    }
}

/// An educational course in the catalog.
///
/// # Examples
/// ```
/// use compass_core::CourseRecord;
///
/// let course = CourseRecord::new("c1", "Staying Safe", "prevention awareness")
///     .with_audience("ALL");
/// assert!(course.audience_matches(None));
/// assert!(course.document().contains("prevention"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CourseRecord {
    /// Unique identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Free-text description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Intended audience tag (for example `ALL` or `BEGINNERS`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_audience: Option<String>,
    /// Category name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: Option<String>,
    /// Number of enrollments.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enrollment_count: u32,
    /// Moderation state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: CourseStatus,
    /// Expected duration in minutes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_minutes: Option<u32>,
}

impl CourseRecord {
    /// Construct a course with a title and description.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            target_audience: None,
            category: None,
            enrollment_count: 0,
            status: CourseStatus::default(),
            duration_minutes: None,
        }
    }

    /// Set the audience tag while returning `self` for chaining.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = Some(audience.into());
        self
    }

    /// Set the category name while returning `self` for chaining.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Text fed to the content engine: description, category, audience tag.
    pub fn document(&self) -> String {
        join_fields([
            Some(self.description.as_str()),
            self.category.as_deref(),
            self.target_audience.as_deref(),
        ])
    }

    /// Whether the course targets `user_audience` or everyone.
    ///
    /// Comparison ignores ASCII case.
    pub fn audience_matches(&self, user_audience: Option<&str>) -> bool {
        let Some(target) = self.target_audience.as_deref() else {
            return false;
        };
        if UNIVERSAL_AUDIENCES
            .iter()
            .any(|universal| target.eq_ignore_ascii_case(universal))
        {
            return true;
        }
        user_audience.is_some_and(|audience| target.eq_ignore_ascii_case(audience))
    }
}

/// A consultant available for appointments.
///
/// # Examples
/// ```
/// use compass_core::ConsultantRecord;
///
/// let consultant = ConsultantRecord::new("k1", "Dr. Lan", "Family_Therapy, psychiatry");
/// assert_eq!(consultant.specialization_tags(), vec!["family_therapy", "psychiatry"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsultantRecord {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub full_name: String,
    /// Comma-delimited specialization tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub specialization: Option<String>,
    /// Years of professional experience.
    #[cfg_attr(feature = "serde", serde(default))]
    pub experience_years: Option<u32>,
    /// Whether the consultant currently accepts bookings.
    #[cfg_attr(feature = "serde", serde(default = "default_available"))]
    pub is_available: bool,
    /// Number of non-deleted appointments.
    #[cfg_attr(feature = "serde", serde(default))]
    pub total_appointments: u32,
    /// Free-text biography.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bio: Option<String>,
}

#[cfg(feature = "serde")]
const fn default_available() -> bool {
    true
}

impl ConsultantRecord {
    /// Construct an available consultant.
    pub fn new(
        id: impl Into<String>,
        full_name: impl Into<String>,
        specialization: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            specialization: Some(specialization.into()),
            experience_years: None,
            is_available: true,
            total_appointments: 0,
            bio: None,
        }
    }

    /// Set years of experience while returning `self` for chaining.
    #[must_use]
    pub const fn with_experience(mut self, years: u32) -> Self {
        self.experience_years = Some(years);
        self
    }

    /// Lower-cased, trimmed specialization tags with empties removed.
    pub fn specialization_tags(&self) -> Vec<String> {
        self.specialization
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    /// Text fed to the content engine: specialization and biography.
    pub fn document(&self) -> String {
        join_fields([self.specialization.as_deref(), self.bio.as_deref()])
    }
}

fn join_fields<'a>(fields: impl IntoIterator<Item = Option<&'a str>>) -> String {
    fields
        .into_iter()
        .flatten()
        .filter(|field| !field.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("ALL"), None, true)]
    #[case(Some("general"), Some("STUDENT"), true)]
    #[case(Some("STUDENT"), Some("student"), true)]
    #[case(Some("PARENT"), Some("STUDENT"), false)]
    #[case(None, Some("STUDENT"), false)]
    fn audience_matching(
        #[case] target: Option<&str>,
        #[case] user: Option<&str>,
        #[case] expected: bool,
    ) {
        let mut course = CourseRecord::new("c", "t", "d");
        course.target_audience = target.map(str::to_owned);
        assert_eq!(course.audience_matches(user), expected);
    }

    #[test]
    fn course_document_skips_missing_fields() {
        let course = CourseRecord::new("c", "t", "coping skills").with_audience("ALL");
        assert_eq!(course.document(), "coping skills ALL");
    }

    #[test]
    fn consultant_tags_ignore_blank_segments() {
        let consultant = ConsultantRecord::new("k", "n", " psychiatry, ,General ");
        assert_eq!(consultant.specialization_tags(), vec!["psychiatry", "general"]);
    }

    #[test]
    fn item_kind_round_trips_through_display() {
        for kind in [ItemKind::Course, ItemKind::Consultant] {
            assert_eq!(kind.to_string().parse::<ItemKind>(), Ok(kind));
        }
    }
}
