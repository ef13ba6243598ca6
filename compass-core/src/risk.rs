//! Risk tiers produced by scoring a screening survey.
//!
//! The enum offers compile-time safety for tier lookups in the risk profile
//! table and cohort selection.
//!
//! # Examples
//! ```
//! use compass_core::RiskTier;
//!
//! assert_eq!(RiskTier::High.as_str(), "HIGH");
//! assert_eq!("low".parse::<RiskTier>(), Ok(RiskTier::Low));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Screening outcome bucket for a survey attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum RiskTier {
    /// Low risk: prevention and awareness content.
    #[cfg_attr(feature = "serde", serde(alias = "low"))]
    Low,
    /// Medium risk: intervention and coping skills. Used when a user's tier
    /// is unknown.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "medium"))]
    Medium,
    /// High risk: treatment and recovery support.
    #[cfg_attr(feature = "serde", serde(alias = "high"))]
    High,
}

impl RiskTier {
    /// All tiers in ascending order of severity.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Return the tier as an upper-case `&str`.
    ///
    /// # Examples
    /// ```
    /// use compass_core::RiskTier;
    ///
    /// assert_eq!(RiskTier::Medium.as_str(), "MEDIUM");
    /// ```
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(format!("unknown risk tier '{s}'")),
        }
    }
}
