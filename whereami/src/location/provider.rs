//! Location provider interface.
//!
//! The provider is the platform binding (a mobile OS service, a browser API,
//! a GPS daemon). The session talks to it through [`LocationProvider`] and the
//! provider pushes results back as [`ProviderEvent`]s on a channel.
//!
//! ```text
//! LocationSession ──request_authorization / start / stop──▶ LocationProvider
//!        ▲                                                       │
//!        └──────────── mpsc::Receiver<ProviderEvent> ◀───────────┘
//! ```

use std::sync::Arc;

use super::authorization::{AuthorizationMode, AuthorizationStatus};
use super::error::ProviderError;
use super::fix::LocationFix;
use super::profile::DesiredAccuracy;

/// Tuning pushed to the provider whenever the precision profile changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderSettings {
    /// Minimum movement in meters between reported fixes.
    pub distance_filter: f64,

    /// Accuracy class requested from the provider.
    pub desired_accuracy: DesiredAccuracy,
}

/// Notification pushed by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// The authorization status changed.
    AuthorizationChanged(AuthorizationStatus),

    /// One or more fixes were measured.
    FixesReceived(Vec<LocationFix>),

    /// The provider failed to produce a fix.
    Error(ProviderError),
}

/// Platform location service binding.
///
/// All methods are non-blocking: requests return immediately and outcomes
/// arrive later as [`ProviderEvent`]s. Implementations must not call back into
/// the session synchronously from these methods.
pub trait LocationProvider: Send + Sync {
    /// Current authorization status.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Whether location services are globally enabled.
    fn is_service_enabled(&self) -> bool;

    /// Prompt for authorization in the given mode.
    fn request_authorization(&self, mode: AuthorizationMode);

    /// Begin continuous updates.
    fn start_updating(&self);

    /// Request a single fix.
    fn request_single_fix(&self);

    /// Stop any pending or continuous updates.
    fn stop_updating(&self);

    /// Allow or forbid delivery while the application is in the background.
    fn set_allows_background_updates(&self, allowed: bool);

    /// Apply distance filter and desired accuracy.
    fn apply_settings(&self, settings: ProviderSettings);
}

// Allow Arc<P> to be used as provider
impl<P: LocationProvider + ?Sized> LocationProvider for Arc<P> {
    fn authorization_status(&self) -> AuthorizationStatus {
        (**self).authorization_status()
    }

    fn is_service_enabled(&self) -> bool {
        (**self).is_service_enabled()
    }

    fn request_authorization(&self, mode: AuthorizationMode) {
        (**self).request_authorization(mode)
    }

    fn start_updating(&self) {
        (**self).start_updating()
    }

    fn request_single_fix(&self) {
        (**self).request_single_fix()
    }

    fn stop_updating(&self) {
        (**self).stop_updating()
    }

    fn set_allows_background_updates(&self, allowed: bool) {
        (**self).set_allows_background_updates(allowed)
    }

    fn apply_settings(&self, settings: ProviderSettings) {
        (**self).apply_settings(settings)
    }
}
