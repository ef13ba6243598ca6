//! Historical user-item interactions used by collaborative filtering.
//!
//! Ratings always lie in `0.0..=1.0`. Course ratings come from enrollment
//! progress; consultant ratings come from appointment status.

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ItemKind;

/// Rating assigned to a completed appointment.
pub const COMPLETED_APPOINTMENT_RATING: f32 = 1.0;
/// Rating assigned to a pending or confirmed appointment.
pub const BOOKED_APPOINTMENT_RATING: f32 = 0.5;

/// Errors returned by [`InteractionRecord::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InteractionError {
    /// The rating was NaN, infinite, or outside `0.0..=1.0`.
    #[error("interaction rating {rating} must be a finite value between 0.0 and 1.0")]
    InvalidRating {
        /// Rejected value.
        rating: f32,
    },
}

/// Booking state of an appointment with a consultant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum AppointmentStatus {
    /// Requested but not yet confirmed.
    Pending,
    /// Confirmed by the consultant.
    Confirmed,
    /// Cancelled by either party.
    Cancelled,
    /// Took place.
    Completed,
}

impl AppointmentStatus {
    /// Rating implied by the status, or `None` for cancelled appointments.
    ///
    /// # Examples
    /// ```
    /// use compass_core::AppointmentStatus;
    ///
    /// assert_eq!(AppointmentStatus::Completed.rating(), Some(1.0));
    /// assert_eq!(AppointmentStatus::Pending.rating(), Some(0.5));
    /// assert_eq!(AppointmentStatus::Cancelled.rating(), None);
    /// ```
    pub const fn rating(self) -> Option<f32> {
        match self {
            Self::Completed => Some(COMPLETED_APPOINTMENT_RATING),
            Self::Pending | Self::Confirmed => Some(BOOKED_APPOINTMENT_RATING),
            Self::Cancelled => None,
        }
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(format!("unknown appointment status '{s}'")),
        }
    }
}

/// A user's engagement with a course or consultant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawInteraction"))]
pub struct InteractionRecord {
    user_id: String,
    item_id: String,
    kind: ItemKind,
    rating: f32,
    interacted_at: Option<DateTime<Utc>>,
}

impl InteractionRecord {
    /// Validate and construct an interaction.
    ///
    /// # Errors
    /// Returns [`InteractionError::InvalidRating`] when `rating` is not a
    /// finite value in `0.0..=1.0`.
    pub fn new(
        user_id: impl Into<String>,
        item_id: impl Into<String>,
        kind: ItemKind,
        rating: f32,
    ) -> Result<Self, InteractionError> {
        if !rating.is_finite() || !(0.0..=1.0).contains(&rating) {
            return Err(InteractionError::InvalidRating { rating });
        }
        Ok(Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            kind,
            rating,
            interacted_at: None,
        })
    }

    /// Construct an interaction, clamping the rating into `0.0..=1.0`.
    ///
    /// Non-finite ratings become zero.
    pub(crate) fn clamped(
        user_id: impl Into<String>,
        item_id: impl Into<String>,
        kind: ItemKind,
        rating: f32,
    ) -> Self {
        let rating = if rating.is_finite() {
            rating.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            kind,
            rating,
            interacted_at: None,
        }
    }

    /// Build a course interaction from an enrollment progress percentage.
    ///
    /// Progress is clamped into `0..=100`; missing or non-finite progress
    /// counts as zero.
    ///
    /// # Examples
    /// ```
    /// use compass_core::InteractionRecord;
    ///
    /// let record = InteractionRecord::from_enrollment("u1", "c1", Some(45.0));
    /// assert!((record.rating() - 0.45).abs() < 1e-6);
    /// ```
    pub fn from_enrollment(
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        progress_percentage: Option<f32>,
    ) -> Self {
        let progress = progress_percentage.unwrap_or(0.0);
        Self::clamped(user_id, course_id, ItemKind::Course, progress / 100.0)
    }

    /// Build a consultant interaction from an appointment status.
    ///
    /// Returns `None` for cancelled appointments, which carry no signal.
    pub fn from_appointment(
        user_id: impl Into<String>,
        consultant_id: impl Into<String>,
        status: AppointmentStatus,
    ) -> Option<Self> {
        let rating = status.rating()?;
        Some(Self {
            user_id: user_id.into(),
            item_id: consultant_id.into(),
            kind: ItemKind::Consultant,
            rating,
            interacted_at: None,
        })
    }

    /// Set the interaction timestamp while returning `self` for chaining.
    #[must_use]
    pub const fn at(mut self, when: DateTime<Utc>) -> Self {
        self.interacted_at = Some(when);
        self
    }

    /// Identifier of the interacting user.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Identifier of the course or consultant.
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Kind of the item.
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Rating in `0.0..=1.0`.
    pub const fn rating(&self) -> f32 {
        self.rating
    }

    /// When the interaction happened, if known.
    pub const fn interacted_at(&self) -> Option<DateTime<Utc>> {
        self.interacted_at
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawInteraction {
    user_id: String,
    item_id: String,
    kind: ItemKind,
    rating: f32,
    #[serde(default)]
    interacted_at: Option<DateTime<Utc>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawInteraction> for InteractionRecord {
    type Error = InteractionError;

    fn try_from(raw: RawInteraction) -> Result<Self, Self::Error> {
        let record = Self::new(raw.user_id, raw.item_id, raw.kind, raw.rating)?;
        Ok(match raw.interacted_at {
            Some(when) => record.at(when),
            None => record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    fn accepts_boundary_ratings(#[case] rating: f32) {
        assert!(InteractionRecord::new("u", "i", ItemKind::Course, rating).is_ok());
    }

    #[rstest]
    #[case(-0.01)]
    #[case(1.01)]
    #[case(f32::NAN)]
    #[case(f32::INFINITY)]
    fn rejects_invalid_ratings(#[case] rating: f32) {
        let result = InteractionRecord::new("u", "i", ItemKind::Consultant, rating);
        assert!(matches!(result, Err(InteractionError::InvalidRating { .. })));
    }

    #[rstest]
    #[case(None, 0.0)]
    #[case(Some(150.0), 1.0)]
    #[case(Some(-5.0), 0.0)]
    #[case(Some(40.0), 0.4)]
    fn enrollment_progress_maps_to_rating(#[case] progress: Option<f32>, #[case] expected: f32) {
        let record = InteractionRecord::from_enrollment("u", "c", progress);
        assert!((record.rating() - expected).abs() < 1e-6);
        assert_eq!(record.kind(), ItemKind::Course);
    }

    #[test]
    fn cancelled_appointments_are_dropped() {
        assert!(
            InteractionRecord::from_appointment("u", "k", AppointmentStatus::Cancelled).is_none()
        );
    }

    #[test]
    fn confirmed_appointments_rate_low() {
        let record = InteractionRecord::from_appointment("u", "k", AppointmentStatus::Confirmed)
            .expect("confirmed appointments carry signal");
        assert_eq!(record.rating(), BOOKED_APPOINTMENT_RATING);
        assert_eq!(record.kind(), ItemKind::Consultant);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialising_validates_rating() {
        let json = r#"{"user_id":"u","item_id":"c","kind":"course","rating":1.5}"#;
        let result: Result<InteractionRecord, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
