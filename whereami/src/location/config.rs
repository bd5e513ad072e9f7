//! Session configuration.

use std::time::Duration;

use super::authorization::AuthorizationMode;
use super::filter::FixFilter;
use super::profile::{LocationProfile, PrecisionProfile, PrecisionSettings};
use super::provider::ProviderSettings;

/// Default maximum fix age (40 seconds).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(40);

/// Whether updates stop after the first accepted fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Stop after the first fix that passes the filter.
    #[default]
    OneShot,
    /// Keep delivering passing fixes until stopped.
    Continuous,
}

impl UpdateMode {
    /// Map the legacy `continuous` boolean to a mode.
    pub fn from_continuous(continuous: bool) -> Self {
        if continuous {
            Self::Continuous
        } else {
            Self::OneShot
        }
    }

    #[inline]
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::Continuous)
    }
}

/// Session configuration.
///
/// All fields can change while the session runs; they take effect on the next
/// update cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Resolved precision profile.
    pub precision: PrecisionSettings,

    /// Fixes at least this old are dropped.
    pub max_age: Duration,

    /// Mode used when updates are started without an explicit mode.
    pub update_mode: UpdateMode,

    /// Which authorization to request.
    pub authorization_mode: AuthorizationMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            precision: PrecisionSettings::from(PrecisionProfile::Default),
            max_age: DEFAULT_MAX_AGE,
            update_mode: UpdateMode::OneShot,
            authorization_mode: AuthorizationMode::WhenInUse,
        }
    }
}

impl SessionConfig {
    /// Use a precision profile.
    pub fn with_profile<L: LocationProfile + ?Sized>(mut self, profile: &L) -> Self {
        self.precision = PrecisionSettings::from_profile(profile);
        self
    }

    /// Use a maximum fix age.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Use an authorization mode.
    pub fn with_authorization_mode(mut self, mode: AuthorizationMode) -> Self {
        self.authorization_mode = mode;
        self
    }

    /// Use an update mode.
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// The filter derived from the current thresholds.
    pub fn filter(&self) -> FixFilter {
        FixFilter::new(self.max_age, self.precision.horizontal_accuracy)
    }

    /// The provider tuning derived from the current profile.
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            distance_filter: self.precision.distance_filter,
            desired_accuracy: self.precision.desired_accuracy,
        }
    }
}
