//! Precision profiles.
//!
//! A profile bundles the three knobs that tune location delivery:
//!
//! - **distance filter** - minimum movement in meters before the provider
//!   reports a new fix
//! - **desired accuracy** - accuracy class requested from the provider
//! - **horizontal accuracy** - the session rejects fixes whose uncertainty
//!   radius is not below this threshold
//!
//! The built-in [`PrecisionProfile`] variants cover common needs. Anything
//! implementing [`LocationProfile`] can be installed on a session, and
//! [`PrecisionSettings`] is the plain-data form used for custom profiles.

use std::fmt;
use std::str::FromStr;

/// Accuracy class requested from the location provider.
///
/// Providers treat this as a hint; the session's own threshold is what
/// actually gates fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DesiredAccuracy {
    /// Highest possible accuracy with additional sensor data (navigation).
    BestForNavigation,
    /// Highest accuracy the hardware offers.
    Best,
    /// Within ten meters.
    NearestTenMeters,
    /// Within a hundred meters.
    HundredMeters,
    /// Within a kilometer.
    Kilometer,
    /// Within three kilometers.
    ThreeKilometers,
}

impl DesiredAccuracy {
    /// Nominal accuracy in meters, or `None` for the "best available" classes.
    pub fn meters(&self) -> Option<f64> {
        match self {
            Self::BestForNavigation | Self::Best => None,
            Self::NearestTenMeters => Some(10.0),
            Self::HundredMeters => Some(100.0),
            Self::Kilometer => Some(1_000.0),
            Self::ThreeKilometers => Some(3_000.0),
        }
    }

    /// Config-file name of this class.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BestForNavigation => "best_for_navigation",
            Self::Best => "best",
            Self::NearestTenMeters => "nearest_ten_meters",
            Self::HundredMeters => "hundred_meters",
            Self::Kilometer => "kilometer",
            Self::ThreeKilometers => "three_kilometers",
        }
    }
}

impl fmt::Display for DesiredAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DesiredAccuracy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best_for_navigation" => Ok(Self::BestForNavigation),
            "best" => Ok(Self::Best),
            "nearest_ten_meters" => Ok(Self::NearestTenMeters),
            "hundred_meters" => Ok(Self::HundredMeters),
            "kilometer" => Ok(Self::Kilometer),
            "three_kilometers" => Ok(Self::ThreeKilometers),
            other => Err(format!("unknown accuracy class '{}'", other)),
        }
    }
}

/// Interface for precision profiles.
///
/// Implement this to define custom precision behaviour.
pub trait LocationProfile: fmt::Debug + Send + Sync {
    /// Minimum movement in meters before the provider reports a new fix.
    fn distance_filter(&self) -> f64;

    /// Accuracy class requested from the provider.
    fn desired_accuracy(&self) -> DesiredAccuracy;

    /// Fixes are accepted only when their uncertainty radius is below this (meters).
    fn horizontal_accuracy(&self) -> f64;
}

/// Built-in precision profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrecisionProfile {
    /// Suitable for most uses.
    #[default]
    Default,
    /// Coarse positioning, tolerant of poor fixes.
    Low,
    /// Neighbourhood-level positioning.
    Medium,
    /// Best location available, strict on accuracy.
    High,
}

impl PrecisionProfile {
    /// All built-in profiles.
    pub const ALL: [PrecisionProfile; 4] = [Self::Default, Self::Low, Self::Medium, Self::High];

    /// Config-file name of this profile.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl LocationProfile for PrecisionProfile {
    fn distance_filter(&self) -> f64 {
        match self {
            Self::Default => 50.0,
            Self::Low => 500.0,
            Self::Medium => 100.0,
            Self::High => 10.0,
        }
    }

    fn desired_accuracy(&self) -> DesiredAccuracy {
        match self {
            Self::Default => DesiredAccuracy::NearestTenMeters,
            Self::Low => DesiredAccuracy::Kilometer,
            Self::Medium => DesiredAccuracy::HundredMeters,
            Self::High => DesiredAccuracy::BestForNavigation,
        }
    }

    fn horizontal_accuracy(&self) -> f64 {
        match self {
            Self::Default => 500.0,
            Self::Low => 2_000.0,
            Self::Medium => 1_000.0,
            Self::High => 200.0,
        }
    }
}

impl fmt::Display for PrecisionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrecisionProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!(
                "unknown profile '{}' (expected default, low, medium or high)",
                other
            )),
        }
    }
}

/// Resolved precision triple.
///
/// This is what a session stores: installing any [`LocationProfile`] copies its
/// three values here, so they always change together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecisionSettings {
    pub distance_filter: f64,
    pub desired_accuracy: DesiredAccuracy,
    pub horizontal_accuracy: f64,
}

impl PrecisionSettings {
    /// Snapshot the values of a profile.
    pub fn from_profile<L: LocationProfile + ?Sized>(profile: &L) -> Self {
        Self {
            distance_filter: profile.distance_filter(),
            desired_accuracy: profile.desired_accuracy(),
            horizontal_accuracy: profile.horizontal_accuracy(),
        }
    }
}

impl Default for PrecisionSettings {
    fn default() -> Self {
        Self::from_profile(&PrecisionProfile::Default)
    }
}

impl From<PrecisionProfile> for PrecisionSettings {
    fn from(profile: PrecisionProfile) -> Self {
        Self::from_profile(&profile)
    }
}

impl LocationProfile for PrecisionSettings {
    fn distance_filter(&self) -> f64 {
        self.distance_filter
    }

    fn desired_accuracy(&self) -> DesiredAccuracy {
        self.desired_accuracy
    }

    fn horizontal_accuracy(&self) -> f64 {
        self.horizontal_accuracy
    }
}
