//! Location Session - the single owner of a provider connection.
//!
//! The session holds one slot per concern:
//!
//! - **authorization waiters** - callers blocked on a pending prompt. Every
//!   waiter registered before the terminal status arrives receives it.
//! - **location subscriber** - at most one; a new `start_updates` replaces
//!   (and closes) the previous one.
//! - **in-flight geocode** - at most one; a new lookup cancels the previous.
//!
//! Provider events are fed in through [`LocationSession::handle_event`], either
//! directly or by [`LocationSession::attach`]ing the provider's event channel.
//!
//! # Request cycle
//!
//! ```text
//! Idle → AwaitingAuthorization ─┬─▶ Unauthorized
//!                               └─▶ AwaitingFix ─┬─▶ FixAccepted (loops if continuous)
//!                                                └─▶ ProviderError
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let (events_tx, events_rx) = mpsc::channel(16);
//! let provider = GpsdProvider::spawn(GpsdConfig::default(), events_tx);
//! let geocoder = NominatimGeocoder::with_defaults()?;
//!
//! let session = LocationSession::new(provider, geocoder);
//! session.attach(events_rx);
//!
//! match session.locate().await {
//!     LocationResponse::Updated(fix) => println!("{}", fix.coordinate),
//!     LocationResponse::Failed(e) => eprintln!("{}", e),
//!     LocationResponse::Unauthorized => eprintln!("location refused"),
//! }
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::authorization::AuthorizationMode;
use super::config::{SessionConfig, UpdateMode};
use super::error::ProviderError;
use super::filter::FixFilter;
use super::fix::LocationFix;
use super::profile::{LocationProfile, PrecisionSettings};
use super::provider::{LocationProvider, ProviderEvent};
use super::response::{LocationResponse, PlaceError, PlaceResponse};
use crate::geocoder::{GeocodeError, ReverseGeocoder};

/// Lazy sequence of location responses.
///
/// One-shot sequences end after the first accepted fix or provider error.
/// Continuous sequences end when updates are stopped or replaced.
#[derive(Debug)]
pub struct LocationUpdates {
    rx: mpsc::UnboundedReceiver<LocationResponse>,
}

impl LocationUpdates {
    /// Wait for the next response; `None` once the sequence has ended.
    pub async fn next(&mut self) -> Option<LocationResponse> {
        self.rx.recv().await
    }

    /// Take a response if one is already queued.
    pub fn try_next(&mut self) -> Option<LocationResponse> {
        self.rx.try_recv().ok()
    }
}

impl Stream for LocationUpdates {
    type Item = LocationResponse;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

struct LocationSubscriber {
    mode: UpdateMode,
    tx: mpsc::UnboundedSender<LocationResponse>,
}

struct InFlightGeocode {
    id: u64,
    token: CancellationToken,
}

/// Mutable session state.
struct SessionState {
    config: SessionConfig,
    authorization_waiters: Vec<oneshot::Sender<bool>>,
    subscriber: Option<LocationSubscriber>,
    geocode: Option<InFlightGeocode>,
    next_geocode_id: u64,
}

struct SessionInner<P, G> {
    provider: P,
    geocoder: G,
    state: Mutex<SessionState>,
}

/// Location session manager.
///
/// Cloning is cheap and yields a handle to the same session.
pub struct LocationSession<P, G> {
    inner: Arc<SessionInner<P, G>>,
}

impl<P, G> Clone for LocationSession<P, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: LocationProvider, G: ReverseGeocoder> LocationSession<P, G> {
    /// Create a session with default configuration.
    pub fn new(provider: P, geocoder: G) -> Self {
        Self::with_config(provider, geocoder, SessionConfig::default())
    }

    /// Create a session with custom configuration.
    ///
    /// The provider is tuned to the configured profile immediately.
    pub fn with_config(provider: P, geocoder: G, config: SessionConfig) -> Self {
        provider.apply_settings(config.provider_settings());

        Self {
            inner: Arc::new(SessionInner {
                provider,
                geocoder,
                state: Mutex::new(SessionState {
                    config,
                    authorization_waiters: Vec::new(),
                    subscriber: None,
                    geocode: None,
                    next_geocode_id: 0,
                }),
            }),
        }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    /// The wrapped geocoder.
    pub fn geocoder(&self) -> &G {
        &self.inner.geocoder
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> SessionConfig {
        self.inner.state.lock().config.clone()
    }

    /// The filter currently applied to incoming fixes.
    pub fn filter(&self) -> FixFilter {
        self.inner.state.lock().config.filter()
    }

    /// Install a precision profile.
    ///
    /// The distance filter, desired accuracy and accuracy threshold change
    /// together, and the provider is reconfigured immediately.
    pub fn set_profile<L: LocationProfile + ?Sized>(&self, profile: &L) {
        let precision = PrecisionSettings::from_profile(profile);
        let settings = {
            let mut state = self.inner.state.lock();
            state.config.precision = precision;
            state.config.provider_settings()
        };

        self.inner.provider.apply_settings(settings);
        info!(
            distance_filter = precision.distance_filter,
            desired_accuracy = %precision.desired_accuracy,
            horizontal_accuracy = precision.horizontal_accuracy,
            "Precision profile changed"
        );
    }

    /// Change the maximum fix age.
    pub fn set_max_age(&self, max_age: Duration) {
        self.inner.state.lock().config.max_age = max_age;
        debug!(max_age_secs = max_age.as_secs_f64(), "Maximum fix age changed");
    }

    /// Change the mode used by [`start_configured_updates`](Self::start_configured_updates).
    pub fn set_update_mode(&self, mode: UpdateMode) {
        self.inner.state.lock().config.update_mode = mode;
        debug!(?mode, "Update mode changed");
    }

    /// Change which authorization is requested (and whether background delivery is allowed).
    pub fn set_authorization_mode(&self, mode: AuthorizationMode) {
        self.inner.state.lock().config.authorization_mode = mode;
        debug!(mode = %mode, "Authorization mode changed");
    }

    /// True once the user has been prompted at least once.
    pub fn has_permission_been_requested(&self) -> bool {
        self.inner.provider.authorization_status().is_determined()
    }

    /// True if access is granted and location services are enabled.
    pub fn is_authorized(&self) -> bool {
        self.inner.provider.authorization_status().is_authorized()
            && self.inner.provider.is_service_enabled()
    }

    /// Request location authorization.
    ///
    /// Resolves immediately with [`is_authorized`](Self::is_authorized) if the
    /// user was already prompted. Otherwise prompts once and resolves when the
    /// provider reports a terminal status. Concurrent callers share the prompt
    /// and all receive the same result.
    pub async fn request_authorization(&self) -> bool {
        if self.has_permission_been_requested() {
            return self.is_authorized();
        }

        let (tx, rx) = oneshot::channel();
        let prompt_mode = {
            let mut state = self.inner.state.lock();
            state.authorization_waiters.push(tx);
            if state.authorization_waiters.len() == 1 {
                Some(state.config.authorization_mode)
            } else {
                None
            }
        };

        // A terminal status may have been handled between the check and the
        // registration, leaving nobody to answer this waiter.
        if self.has_permission_been_requested() {
            let authorized = self.is_authorized();
            let waiters = std::mem::take(&mut self.inner.state.lock().authorization_waiters);
            for waiter in waiters {
                let _ = waiter.send(authorized);
            }
            return rx.await.unwrap_or(authorized);
        }

        match prompt_mode {
            Some(mode) => {
                info!(mode = %mode, "Requesting location authorization");
                self.inner.provider.request_authorization(mode);
            }
            None => debug!("Authorization prompt already pending, waiting for its result"),
        }

        // Sender dropped means the session went away before an answer
        rx.await.unwrap_or(false)
    }

    /// Start location updates.
    ///
    /// Replaces any previous subscriber, whose sequence ends. In one-shot mode a
    /// single fix is requested and updates stop after the first accepted fix.
    pub fn start_updates(&self, mode: UpdateMode) -> LocationUpdates {
        let (tx, rx) = mpsc::unbounded_channel();

        let allows_background = {
            let mut state = self.inner.state.lock();
            if state
                .subscriber
                .replace(LocationSubscriber { mode, tx })
                .is_some()
            {
                debug!("Replacing pending location subscriber");
            }
            state.config.authorization_mode.allows_background()
        };

        let provider = &self.inner.provider;
        provider.set_allows_background_updates(allows_background);
        match mode {
            UpdateMode::OneShot => provider.request_single_fix(),
            UpdateMode::Continuous => provider.start_updating(),
        }

        debug!(?mode, allows_background, "Location updates started");
        LocationUpdates { rx }
    }

    /// Start location updates in the configured [`UpdateMode`].
    ///
    /// Authorization is not requested; pair with
    /// [`request_authorization`](Self::request_authorization) or use
    /// [`locate`](Self::locate) for a single fix.
    pub fn start_configured_updates(&self) -> LocationUpdates {
        let mode = self.inner.state.lock().config.update_mode;
        self.start_updates(mode)
    }

    /// Stop location updates and release the subscriber.
    pub fn stop_updates(&self) {
        self.inner.provider.stop_updating();
        if self.inner.state.lock().subscriber.take().is_some() {
            debug!("Location updates stopped");
        }
    }

    /// Get the current location once.
    ///
    /// Requests authorization if needed, then waits for the first fix that
    /// passes the filter. There is no timeout; the provider decides when to
    /// give up.
    pub async fn locate(&self) -> LocationResponse {
        if !self.request_authorization().await {
            info!("Location unauthorized");
            return LocationResponse::Unauthorized;
        }

        let mut updates = self.start_updates(UpdateMode::OneShot);
        updates
            .next()
            .await
            .unwrap_or(LocationResponse::Failed(ProviderError::Cancelled))
    }

    /// Describe the current place.
    ///
    /// Locates once, then reverse-geocodes the fix. A lookup still in flight
    /// from an earlier call is cancelled first.
    pub async fn describe_place(&self) -> PlaceResponse {
        let fix = match self.locate().await {
            LocationResponse::Updated(fix) => fix,
            LocationResponse::Failed(error) => {
                return PlaceResponse::Failure(PlaceError::Location(error))
            }
            LocationResponse::Unauthorized => return PlaceResponse::Unauthorized,
        };

        let (id, token) = self.begin_geocode();

        let result = tokio::select! {
            _ = token.cancelled() => Err(GeocodeError::Cancelled),
            result = self.inner.geocoder.reverse_geocode(fix.coordinate) => result,
        };

        self.finish_geocode(id);

        match result {
            Ok(placemarks) => match placemarks.into_iter().next() {
                Some(placemark) => {
                    info!(place = %placemark, "Place found");
                    PlaceResponse::Found(placemark)
                }
                None => {
                    info!(coordinate = %fix.coordinate, "No place found");
                    PlaceResponse::NotFound
                }
            },
            Err(error) => {
                warn!(error = %error, "Reverse geocoding failed");
                PlaceResponse::Failure(PlaceError::Geocode(error))
            }
        }
    }

    /// Cancel the in-flight place lookup, if any.
    pub fn cancel_place_lookup(&self) {
        if let Some(previous) = self.inner.state.lock().geocode.take() {
            debug!(geocode_id = previous.id, "Cancelling in-flight geocode");
            previous.token.cancel();
        }
    }

    fn begin_geocode(&self) -> (u64, CancellationToken) {
        let mut state = self.inner.state.lock();
        let id = state.next_geocode_id;
        state.next_geocode_id += 1;

        let token = CancellationToken::new();
        let current = InFlightGeocode {
            id,
            token: token.clone(),
        };
        if let Some(previous) = state.geocode.replace(current) {
            debug!(geocode_id = previous.id, "Cancelling in-flight geocode");
            previous.token.cancel();
        }

        (id, token)
    }

    fn finish_geocode(&self, id: u64) {
        let mut state = self.inner.state.lock();
        if state.geocode.as_ref().is_some_and(|g| g.id == id) {
            state.geocode = None;
        }
    }

    /// Process one provider notification.
    pub fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AuthorizationChanged(status) => {
                if !status.is_determined() {
                    trace!("Ignoring non-terminal authorization status");
                    return;
                }

                let authorized = status.is_authorized() && self.inner.provider.is_service_enabled();
                let waiters = std::mem::take(&mut self.inner.state.lock().authorization_waiters);

                info!(
                    status = %status,
                    authorized,
                    waiters = waiters.len(),
                    "Authorization status changed"
                );
                for waiter in waiters {
                    let _ = waiter.send(authorized);
                }
            }
            ProviderEvent::FixesReceived(fixes) => self.handle_fixes(fixes),
            ProviderEvent::Error(error) => self.handle_error(error),
        }
    }

    fn handle_fixes(&self, fixes: Vec<LocationFix>) {
        // Only the most recent fix of a batch is considered
        let Some(fix) = fixes.into_iter().max_by_key(|f| f.timestamp) else {
            return;
        };

        let stop_provider = {
            let mut state = self.inner.state.lock();
            let filter = state.config.filter();

            let Some(subscriber) = state.subscriber.as_ref() else {
                trace!("Fix received with no subscriber, ignoring");
                return;
            };

            if let Err(reason) = filter.evaluate(&fix, Instant::now()) {
                trace!(
                    lat = fix.latitude(),
                    lon = fix.longitude(),
                    accuracy = fix.horizontal_accuracy,
                    reason = %reason,
                    "Fix dropped"
                );
                return;
            }

            debug!(
                lat = format!("{:.5}", fix.latitude()),
                lon = format!("{:.5}", fix.longitude()),
                accuracy = fix.horizontal_accuracy,
                "Fix accepted"
            );

            let mode = subscriber.mode;
            let delivered = subscriber.tx.send(LocationResponse::Updated(fix)).is_ok();

            if !delivered {
                debug!("Location subscriber gone, stopping updates");
            }

            if !delivered || mode == UpdateMode::OneShot {
                state.subscriber = None;
                true
            } else {
                false
            }
        };

        if stop_provider {
            self.inner.provider.stop_updating();
        }
    }

    fn handle_error(&self, error: ProviderError) {
        warn!(error = %error, "Location provider error");

        let stop_provider = {
            let mut state = self.inner.state.lock();
            let Some(subscriber) = state.subscriber.as_ref() else {
                debug!("Provider error with no subscriber, ignoring");
                return;
            };

            let mode = subscriber.mode;
            let delivered = subscriber.tx.send(LocationResponse::Failed(error)).is_ok();

            if !delivered {
                debug!("Location subscriber gone, stopping updates");
            }

            if !delivered || mode == UpdateMode::OneShot {
                state.subscriber = None;
                true
            } else {
                false
            }
        };

        if stop_provider {
            self.inner.provider.stop_updating();
        }
    }
}

impl<P, G> LocationSession<P, G>
where
    P: LocationProvider + 'static,
    G: ReverseGeocoder + 'static,
{
    /// Pump a provider event channel into this session.
    ///
    /// Spawns a task that runs until the channel closes.
    pub fn attach(&self, mut events: mpsc::Receiver<ProviderEvent>) -> JoinHandle<()> {
        let session = self.clone();

        tokio::spawn(async move {
            debug!("Provider event pump started");
            let mut handled: u64 = 0;

            while let Some(event) = events.recv().await {
                handled += 1;
                session.handle_event(event);
            }

            debug!(handled, "Provider event pump stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::geocoder::Placemark;
    use crate::location::{AuthorizationStatus, PrecisionProfile, ProviderSettings};

    /// Minimal provider that only tracks status and stop calls.
    #[derive(Default)]
    struct StubProvider {
        status: Mutex<AuthorizationStatus>,
        stops: Mutex<u32>,
        settings: Mutex<Option<ProviderSettings>>,
    }

    impl LocationProvider for StubProvider {
        fn authorization_status(&self) -> AuthorizationStatus {
            *self.status.lock()
        }
        fn is_service_enabled(&self) -> bool {
            true
        }
        fn request_authorization(&self, _mode: AuthorizationMode) {}
        fn start_updating(&self) {}
        fn request_single_fix(&self) {}
        fn stop_updating(&self) {
            *self.stops.lock() += 1;
        }
        fn set_allows_background_updates(&self, _allowed: bool) {}
        fn apply_settings(&self, settings: ProviderSettings) {
            *self.settings.lock() = Some(settings);
        }
    }

    struct NoGeocoder;

    impl ReverseGeocoder for NoGeocoder {
        async fn reverse_geocode(
            &self,
            _coordinate: Coordinate,
        ) -> Result<Vec<Placemark>, GeocodeError> {
            Ok(Vec::new())
        }
    }

    fn session() -> LocationSession<StubProvider, NoGeocoder> {
        LocationSession::new(StubProvider::default(), NoGeocoder)
    }

    fn good_fix() -> LocationFix {
        LocationFix::new(Coordinate::new(43.6, 1.4), 50.0)
    }

    #[test]
    fn test_new_session_tunes_provider() {
        let session = session();
        let settings = (*session.provider().settings.lock()).expect("settings applied");
        assert_eq!(settings.distance_filter, 50.0);
    }

    #[test]
    fn test_one_shot_delivers_once_and_stops() {
        let session = session();
        let mut updates = session.start_updates(UpdateMode::OneShot);

        session.handle_event(ProviderEvent::FixesReceived(vec![good_fix()]));
        session.handle_event(ProviderEvent::FixesReceived(vec![good_fix()]));

        assert!(matches!(updates.try_next(), Some(LocationResponse::Updated(_))));
        assert!(updates.try_next().is_none());
        assert_eq!(*session.provider().stops.lock(), 1);
    }

    #[test]
    fn test_fix_without_subscriber_is_ignored() {
        let session = session();
        session.handle_event(ProviderEvent::FixesReceived(vec![good_fix()]));
        assert_eq!(*session.provider().stops.lock(), 0);
    }

    #[test]
    fn test_newest_fix_of_batch_is_used() {
        let session = session();
        let mut updates = session.start_updates(UpdateMode::OneShot);

        let older = LocationFix::with_age(Coordinate::new(1.0, 1.0), 10.0, Duration::from_secs(5));
        let newer = LocationFix::new(Coordinate::new(2.0, 2.0), 10.0);
        session.handle_event(ProviderEvent::FixesReceived(vec![newer, older]));

        let response = updates.try_next().expect("fix delivered");
        assert_eq!(response.fix().map(|f| f.latitude()), Some(2.0));
    }

    #[test]
    fn test_set_profile_updates_filter() {
        let session = session();
        session.set_profile(&PrecisionProfile::Low);

        assert_eq!(session.filter().horizontal_accuracy, 2_000.0);
        let settings = (*session.provider().settings.lock()).expect("settings applied");
        assert_eq!(settings.distance_filter, 500.0);
    }

    #[test]
    fn test_dropped_receiver_stops_continuous_updates() {
        let session = session();
        let updates = session.start_updates(UpdateMode::Continuous);
        drop(updates);

        session.handle_event(ProviderEvent::FixesReceived(vec![good_fix()]));
        assert_eq!(*session.provider().stops.lock(), 1);
    }

    #[test]
    fn test_dropped_receiver_stops_continuous_updates_on_error() {
        let session = session();
        let updates = session.start_updates(UpdateMode::Continuous);
        drop(updates);

        session.handle_event(ProviderEvent::Error(ProviderError::LocationUnknown));
        assert_eq!(*session.provider().stops.lock(), 1);

        // The subscriber is gone, later errors are ignored
        session.handle_event(ProviderEvent::Error(ProviderError::LocationUnknown));
        assert_eq!(*session.provider().stops.lock(), 1);
    }

    #[test]
    fn test_configured_update_mode() {
        let session = session();

        // An explicit mode does not change the configured one
        let _updates = session.start_updates(UpdateMode::Continuous);
        assert_eq!(session.config().update_mode, UpdateMode::OneShot);

        session.set_update_mode(UpdateMode::Continuous);
        let mut updates = session.start_configured_updates();
        session.handle_event(ProviderEvent::FixesReceived(vec![good_fix()]));
        session.handle_event(ProviderEvent::FixesReceived(vec![good_fix()]));

        assert!(updates.try_next().is_some());
        assert!(updates.try_next().is_some());
        assert_eq!(*session.provider().stops.lock(), 0);
    }

    /// Reports `Undetermined` on the first read only, as if the terminal
    /// status was handled right after the session checked it.
    #[derive(Default)]
    struct LateStatusProvider {
        reads: std::sync::atomic::AtomicUsize,
        prompts: Mutex<u32>,
    }

    impl LocationProvider for LateStatusProvider {
        fn authorization_status(&self) -> AuthorizationStatus {
            let reads = self
                .reads
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if reads == 0 {
                AuthorizationStatus::Undetermined
            } else {
                AuthorizationStatus::AuthorizedWhenInUse
            }
        }
        fn is_service_enabled(&self) -> bool {
            true
        }
        fn request_authorization(&self, _mode: AuthorizationMode) {
            *self.prompts.lock() += 1;
        }
        fn start_updating(&self) {}
        fn request_single_fix(&self) {}
        fn stop_updating(&self) {}
        fn set_allows_background_updates(&self, _allowed: bool) {}
        fn apply_settings(&self, _settings: ProviderSettings) {}
    }

    #[tokio::test]
    async fn test_status_settled_during_registration_resolves_waiter() {
        let session = LocationSession::new(LateStatusProvider::default(), NoGeocoder);

        let authorized = tokio::time::timeout(
            Duration::from_secs(5),
            session.request_authorization(),
        )
        .await
        .expect("waiter resolved");

        assert!(authorized);
        assert_eq!(*session.provider().prompts.lock(), 0);
        assert!(session.inner.state.lock().authorization_waiters.is_empty());
    }

    #[tokio::test]
    async fn test_already_determined_resolves_immediately() {
        let session = session();
        *session.provider().status.lock() = AuthorizationStatus::Denied;

        assert!(!session.request_authorization().await);
    }
}
