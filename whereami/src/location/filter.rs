//! Freshness and accuracy filter applied to every incoming fix.
//!
//! A fix is surfaced only if all three hold:
//!
//! 1. its age is strictly below the maximum age
//! 2. its coordinate is within valid range
//! 3. its horizontal accuracy is strictly below the threshold
//!
//! Rejected fixes are not errors; the session drops them and keeps waiting.

use std::time::{Duration, Instant};

use thiserror::Error;

use super::fix::LocationFix;

/// Why a fix was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FixRejection {
    /// The fix is older than the maximum age.
    #[error("fix is stale (age {age:?}, max {max_age:?})")]
    Stale { age: Duration, max_age: Duration },

    /// Latitude or longitude is out of range.
    #[error("fix coordinate is invalid")]
    InvalidCoordinate,

    /// The uncertainty radius is not below the threshold.
    #[error("fix is inaccurate ({accuracy}m, threshold {threshold}m)")]
    Inaccurate { accuracy: f64, threshold: f64 },
}

/// Freshness/accuracy gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixFilter {
    /// Fixes at least this old are dropped.
    pub max_age: Duration,

    /// Fixes whose accuracy is not below this radius (meters) are dropped.
    pub horizontal_accuracy: f64,
}

impl FixFilter {
    /// Create a filter.
    pub fn new(max_age: Duration, horizontal_accuracy: f64) -> Self {
        Self {
            max_age,
            horizontal_accuracy,
        }
    }

    /// Check a fix against the filter at a reference instant.
    pub fn evaluate(&self, fix: &LocationFix, now: Instant) -> Result<(), FixRejection> {
        let age = fix.age_at(now);
        if age >= self.max_age {
            return Err(FixRejection::Stale {
                age,
                max_age: self.max_age,
            });
        }

        if !fix.coordinate.is_valid() {
            return Err(FixRejection::InvalidCoordinate);
        }

        if fix.horizontal_accuracy.is_nan() || fix.horizontal_accuracy >= self.horizontal_accuracy {
            return Err(FixRejection::Inaccurate {
                accuracy: fix.horizontal_accuracy,
                threshold: self.horizontal_accuracy,
            });
        }

        Ok(())
    }

    /// Check a fix against the filter now.
    pub fn accepts(&self, fix: &LocationFix) -> bool {
        self.evaluate(fix, Instant::now()).is_ok()
    }
}
