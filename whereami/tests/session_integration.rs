//! Integration tests for the location session.
//!
//! These tests drive a `LocationSession` through a scripted provider and
//! geocoder and verify the complete request cycles:
//! - Authorization (immediate, pending, shared prompt)
//! - One-shot and continuous updates through the freshness/accuracy filter
//! - Place description, including cancellation of in-flight lookups
//! - Event intake through an attached provider channel
//!
//! Run with: `cargo test --test session_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use whereami::coord::Coordinate;
use whereami::geocoder::{GeocodeError, Placemark, ReverseGeocoder};
use whereami::location::{
    AuthorizationMode, AuthorizationStatus, DesiredAccuracy, LocationFix, LocationProfile,
    LocationProvider, LocationResponse, LocationSession, PlaceError, PlaceResponse,
    PrecisionProfile, ProviderError, ProviderEvent, ProviderSettings, SessionConfig, UpdateMode,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Call recorded by the scripted provider.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Call {
    RequestAuthorization(AuthorizationMode),
    StartUpdating,
    RequestSingleFix,
    StopUpdating,
    AllowBackground(bool),
    ApplySettings(ProviderSettings),
}

/// Provider whose status is set by the test and which records every call.
struct ScriptedProvider {
    status: Mutex<AuthorizationStatus>,
    service_enabled: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedProvider {
    fn new(status: AuthorizationStatus) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(status),
            service_enabled: Mutex::new(true),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn set_status(&self, status: AuthorizationStatus) {
        *self.status.lock() = status;
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn count(&self, call: Call) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    fn authorization_requests(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::RequestAuthorization(_)))
            .count()
    }

    fn last_settings(&self) -> Option<ProviderSettings> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            Call::ApplySettings(settings) => Some(*settings),
            _ => None,
        })
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl LocationProvider for ScriptedProvider {
    fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.lock()
    }

    fn is_service_enabled(&self) -> bool {
        *self.service_enabled.lock()
    }

    fn request_authorization(&self, mode: AuthorizationMode) {
        self.record(Call::RequestAuthorization(mode));
    }

    fn start_updating(&self) {
        self.record(Call::StartUpdating);
    }

    fn request_single_fix(&self) {
        self.record(Call::RequestSingleFix);
    }

    fn stop_updating(&self) {
        self.record(Call::StopUpdating);
    }

    fn set_allows_background_updates(&self, allowed: bool) {
        self.record(Call::AllowBackground(allowed));
    }

    fn apply_settings(&self, settings: ProviderSettings) {
        self.record(Call::ApplySettings(settings));
    }
}

/// Geocoder returning canned places; the first `hang_calls` lookups never finish.
struct ScriptedGeocoder {
    places: Vec<Placemark>,
    hang_calls: usize,
    calls: AtomicUsize,
}

impl ScriptedGeocoder {
    fn new(places: Vec<Placemark>) -> Arc<Self> {
        Self::hanging(places, 0)
    }

    fn hanging(places: Vec<Placemark>, hang_calls: usize) -> Arc<Self> {
        Arc::new(Self {
            places,
            hang_calls,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReverseGeocoder for ScriptedGeocoder {
    async fn reverse_geocode(
        &self,
        _coordinate: Coordinate,
    ) -> Result<Vec<Placemark>, GeocodeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.hang_calls {
            std::future::pending::<()>().await;
        }
        Ok(self.places.clone())
    }
}

type Session = LocationSession<Arc<ScriptedProvider>, Arc<ScriptedGeocoder>>;

fn session_with(
    status: AuthorizationStatus,
    geocoder: Arc<ScriptedGeocoder>,
    config: SessionConfig,
) -> (Session, Arc<ScriptedProvider>) {
    let provider = ScriptedProvider::new(status);
    let session = LocationSession::with_config(Arc::clone(&provider), geocoder, config);
    (session, provider)
}

fn authorized_session() -> (Session, Arc<ScriptedProvider>) {
    session_with(
        AuthorizationStatus::AuthorizedWhenInUse,
        ScriptedGeocoder::new(Vec::new()),
        SessionConfig::default(),
    )
}

/// Toulouse city center.
const TOULOUSE: Coordinate = Coordinate::new(43.6047, 1.4442);

fn fix(accuracy: f64, age_secs: u64) -> LocationFix {
    LocationFix::with_age(TOULOUSE, accuracy, Duration::from_secs(age_secs))
}

fn capitole() -> Placemark {
    Placemark {
        name: Some("Capitole".to_string()),
        locality: Some("Toulouse".to_string()),
        country: Some("France".to_string()),
        iso_country_code: Some("FR".to_string()),
        ..Placemark::new(TOULOUSE)
    }
}

/// Yield until the provider has seen `call` at least `times` times.
async fn wait_for_call(provider: &ScriptedProvider, call: Call, times: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while provider.count(call) < times {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("provider call within timeout");
}

/// Yield until the geocoder has been called at least `times` times.
async fn wait_for_geocode(geocoder: &ScriptedGeocoder, times: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while geocoder.calls() < times {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("geocoder call within timeout");
}

// ============================================================================
// Fix filter
// ============================================================================

#[tokio::test]
async fn test_fifteen_second_five_hundred_meter_scenario() {
    let config = SessionConfig::default().with_max_age(Duration::from_secs(15));
    let (session, _provider) = session_with(
        AuthorizationStatus::AuthorizedWhenInUse,
        ScriptedGeocoder::new(Vec::new()),
        config,
    );
    assert_eq!(session.filter().horizontal_accuracy, 500.0);

    let mut updates = session.start_updates(UpdateMode::Continuous);

    let fresh_accurate = fix(100.0, 5);
    session.handle_event(ProviderEvent::FixesReceived(vec![fresh_accurate.clone()]));
    assert_eq!(updates.try_next(), Some(LocationResponse::Updated(fresh_accurate)));

    // Too old
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(100.0, 20)]));
    assert!(updates.try_next().is_none());

    // Too inaccurate
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(600.0, 5)]));
    assert!(updates.try_next().is_none());
}

#[tokio::test]
async fn test_filter_rejects_invalid_coordinates_and_boundaries() {
    let (session, _provider) = authorized_session();
    let mut updates = session.start_updates(UpdateMode::Continuous);

    let invalid = LocationFix::new(Coordinate::new(91.0, 0.0), 10.0);
    session.handle_event(ProviderEvent::FixesReceived(vec![invalid]));

    // Accuracy equal to the threshold is not below it
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(500.0, 0)]));

    let nan = LocationFix::new(TOULOUSE, f64::NAN);
    session.handle_event(ProviderEvent::FixesReceived(vec![nan]));

    assert!(updates.try_next().is_none());
}

// ============================================================================
// Update modes
// ============================================================================

#[tokio::test]
async fn test_one_shot_stops_after_first_accepted_fix() {
    let (session, provider) = authorized_session();
    let mut updates = session.start_updates(UpdateMode::OneShot);
    assert!(provider.calls().contains(&Call::RequestSingleFix));

    // Rejected fixes do not end the one-shot request
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(5_000.0, 0)]));
    assert_eq!(provider.count(Call::StopUpdating), 0);

    session.handle_event(ProviderEvent::FixesReceived(vec![fix(20.0, 0)]));
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(10.0, 0)]));

    assert!(matches!(updates.next().await, Some(LocationResponse::Updated(f)) if f.horizontal_accuracy == 20.0));
    assert_eq!(updates.next().await, None);
    assert_eq!(provider.count(Call::StopUpdating), 1);
}

#[tokio::test]
async fn test_continuous_forwards_every_passing_fix() {
    let (session, provider) = authorized_session();
    let mut updates = session.start_updates(UpdateMode::Continuous);
    assert!(provider.calls().contains(&Call::StartUpdating));

    for accuracy in [30.0, 40.0, 50.0] {
        session.handle_event(ProviderEvent::FixesReceived(vec![fix(accuracy, 0)]));
    }

    for expected in [30.0, 40.0, 50.0] {
        let response = updates.try_next().expect("fix forwarded");
        assert_eq!(response.fix().map(|f| f.horizontal_accuracy), Some(expected));
    }
    assert_eq!(provider.count(Call::StopUpdating), 0);

    session.stop_updates();
    assert_eq!(provider.count(Call::StopUpdating), 1);
    assert_eq!(updates.next().await, None);
}

#[tokio::test]
async fn test_new_request_replaces_previous_subscriber() {
    let (session, _provider) = authorized_session();
    let mut first = session.start_updates(UpdateMode::Continuous);
    let mut second = session.start_updates(UpdateMode::OneShot);

    session.handle_event(ProviderEvent::FixesReceived(vec![fix(10.0, 0)]));

    assert_eq!(first.next().await, None);
    assert!(matches!(second.next().await, Some(LocationResponse::Updated(_))));
}

#[tokio::test]
async fn test_provider_error_is_terminal_in_one_shot() {
    let (session, provider) = authorized_session();
    let mut updates = session.start_updates(UpdateMode::OneShot);

    session.handle_event(ProviderEvent::Error(ProviderError::LocationUnknown));

    assert_eq!(
        updates.next().await,
        Some(LocationResponse::Failed(ProviderError::LocationUnknown))
    );
    assert_eq!(updates.next().await, None);
    assert_eq!(provider.count(Call::StopUpdating), 1);
}

#[tokio::test]
async fn test_provider_error_keeps_continuous_subscription() {
    let (session, provider) = authorized_session();
    let mut updates = session.start_updates(UpdateMode::Continuous);

    session.handle_event(ProviderEvent::Error(ProviderError::LocationUnknown));
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(10.0, 0)]));

    assert_eq!(
        updates.try_next(),
        Some(LocationResponse::Failed(ProviderError::LocationUnknown))
    );
    assert!(matches!(updates.try_next(), Some(LocationResponse::Updated(_))));
    assert_eq!(provider.count(Call::StopUpdating), 0);
}

#[tokio::test]
async fn test_configured_update_mode_selects_provider_request() {
    let config = SessionConfig::default().with_update_mode(UpdateMode::Continuous);
    let (session, provider) = session_with(
        AuthorizationStatus::AuthorizedWhenInUse,
        ScriptedGeocoder::new(Vec::new()),
        config,
    );

    let mut updates = session.start_configured_updates();
    assert_eq!(provider.count(Call::StartUpdating), 1);
    assert_eq!(provider.count(Call::RequestSingleFix), 0);

    session.handle_event(ProviderEvent::FixesReceived(vec![fix(10.0, 0)]));
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(20.0, 0)]));
    assert!(updates.try_next().is_some());
    assert!(updates.try_next().is_some());
    assert_eq!(provider.count(Call::StopUpdating), 0);

    // An explicit one-shot request leaves the configured mode alone
    let _single = session.start_updates(UpdateMode::OneShot);
    assert_eq!(session.config().update_mode, UpdateMode::Continuous);

    session.set_update_mode(UpdateMode::OneShot);
    let _updates = session.start_configured_updates();
    assert_eq!(provider.count(Call::RequestSingleFix), 2);
}

#[tokio::test]
async fn test_background_updates_follow_authorization_mode() {
    let config = SessionConfig::default().with_authorization_mode(AuthorizationMode::Always);
    let (session, provider) = session_with(
        AuthorizationStatus::AuthorizedAlways,
        ScriptedGeocoder::new(Vec::new()),
        config,
    );

    let _updates = session.start_updates(UpdateMode::Continuous);
    assert!(provider.calls().contains(&Call::AllowBackground(true)));

    session.set_authorization_mode(AuthorizationMode::WhenInUse);
    let _updates = session.start_updates(UpdateMode::Continuous);
    assert!(provider.calls().contains(&Call::AllowBackground(false)));
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn test_determined_status_resolves_without_prompting() {
    let (session, provider) = authorized_session();
    assert!(session.has_permission_been_requested());
    assert!(session.request_authorization().await);

    provider.set_status(AuthorizationStatus::Denied);
    assert!(!session.request_authorization().await);

    assert_eq!(provider.authorization_requests(), 0);
}

#[tokio::test]
async fn test_authorized_but_service_disabled_is_not_authorized() {
    let (session, provider) = authorized_session();
    *provider.service_enabled.lock() = false;

    assert!(!session.is_authorized());
    assert!(!session.request_authorization().await);
}

#[tokio::test]
async fn test_undetermined_waits_for_terminal_status() {
    let (session, provider) = session_with(
        AuthorizationStatus::Undetermined,
        ScriptedGeocoder::new(Vec::new()),
        SessionConfig::default(),
    );
    assert!(!session.has_permission_been_requested());

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.request_authorization().await }
    });

    wait_for_call(
        &provider,
        Call::RequestAuthorization(AuthorizationMode::WhenInUse),
        1,
    )
    .await;

    // A non-terminal status does not resolve the request
    session.handle_event(ProviderEvent::AuthorizationChanged(
        AuthorizationStatus::Undetermined,
    ));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!pending.is_finished());

    provider.set_status(AuthorizationStatus::AuthorizedWhenInUse);
    session.handle_event(ProviderEvent::AuthorizationChanged(
        AuthorizationStatus::AuthorizedWhenInUse,
    ));

    assert!(pending.await.unwrap());
}

#[tokio::test]
async fn test_concurrent_requests_share_one_prompt() {
    let (session, provider) = session_with(
        AuthorizationStatus::Undetermined,
        ScriptedGeocoder::new(Vec::new()),
        SessionConfig::default(),
    );

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.request_authorization().await }
    });
    let second = tokio::spawn({
        let session = session.clone();
        async move { session.request_authorization().await }
    });

    // Let both requests register before answering
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(provider.authorization_requests(), 1);

    provider.set_status(AuthorizationStatus::Denied);
    session.handle_event(ProviderEvent::AuthorizationChanged(AuthorizationStatus::Denied));

    assert!(!first.await.unwrap());
    assert!(!second.await.unwrap());
}

// ============================================================================
// locate / describe_place
// ============================================================================

#[tokio::test]
async fn test_locate_unauthorized_never_starts_updates() {
    let (session, provider) = session_with(
        AuthorizationStatus::Restricted,
        ScriptedGeocoder::new(Vec::new()),
        SessionConfig::default(),
    );

    assert_eq!(session.locate().await, LocationResponse::Unauthorized);
    assert_eq!(provider.count(Call::RequestSingleFix), 0);
    assert_eq!(provider.count(Call::StartUpdating), 0);
}

#[tokio::test]
async fn test_locate_returns_first_accepted_fix() {
    let (session, provider) = authorized_session();

    let located = tokio::spawn({
        let session = session.clone();
        async move { session.locate().await }
    });
    wait_for_call(&provider, Call::RequestSingleFix, 1).await;

    session.handle_event(ProviderEvent::FixesReceived(vec![fix(25.0, 1)]));

    let response = located.await.unwrap();
    assert_eq!(response.fix().map(|f| f.coordinate), Some(TOULOUSE));
}

#[tokio::test]
async fn test_describe_place_unauthorized_never_geocodes() {
    let geocoder = ScriptedGeocoder::new(vec![capitole()]);
    let (session, _provider) = session_with(
        AuthorizationStatus::Denied,
        Arc::clone(&geocoder),
        SessionConfig::default(),
    );

    assert_eq!(session.describe_place().await, PlaceResponse::Unauthorized);
    assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn test_describe_place_found_and_not_found() {
    for (places, expected) in [
        (vec![capitole()], PlaceResponse::Found(capitole())),
        (Vec::new(), PlaceResponse::NotFound),
    ] {
        let geocoder = ScriptedGeocoder::new(places);
        let (session, provider) = session_with(
            AuthorizationStatus::AuthorizedWhenInUse,
            Arc::clone(&geocoder),
            SessionConfig::default(),
        );

        let described = tokio::spawn({
            let session = session.clone();
            async move { session.describe_place().await }
        });
        wait_for_call(&provider, Call::RequestSingleFix, 1).await;
        session.handle_event(ProviderEvent::FixesReceived(vec![fix(25.0, 0)]));

        assert_eq!(described.await.unwrap(), expected);
        assert_eq!(geocoder.calls(), 1);
    }
}

#[tokio::test]
async fn test_describe_place_surfaces_location_failure() {
    let geocoder = ScriptedGeocoder::new(vec![capitole()]);
    let (session, provider) = session_with(
        AuthorizationStatus::AuthorizedWhenInUse,
        Arc::clone(&geocoder),
        SessionConfig::default(),
    );

    let described = tokio::spawn({
        let session = session.clone();
        async move { session.describe_place().await }
    });
    wait_for_call(&provider, Call::RequestSingleFix, 1).await;
    session.handle_event(ProviderEvent::Error(ProviderError::Denied));

    assert_eq!(
        described.await.unwrap(),
        PlaceResponse::Failure(PlaceError::Location(ProviderError::Denied))
    );
    assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn test_new_lookup_cancels_in_flight_geocode() {
    // The first lookup hangs; the second answers
    let geocoder = ScriptedGeocoder::hanging(vec![capitole()], 1);
    let (session, provider) = session_with(
        AuthorizationStatus::AuthorizedWhenInUse,
        Arc::clone(&geocoder),
        SessionConfig::default(),
    );

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.describe_place().await }
    });
    wait_for_call(&provider, Call::RequestSingleFix, 1).await;
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(25.0, 0)]));
    wait_for_geocode(&geocoder, 1).await;

    let second = tokio::spawn({
        let session = session.clone();
        async move { session.describe_place().await }
    });
    wait_for_call(&provider, Call::RequestSingleFix, 2).await;
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(25.0, 0)]));

    assert_eq!(
        first.await.unwrap(),
        PlaceResponse::Failure(PlaceError::Geocode(GeocodeError::Cancelled))
    );
    assert_eq!(second.await.unwrap(), PlaceResponse::Found(capitole()));
}

#[tokio::test]
async fn test_cancel_place_lookup() {
    let geocoder = ScriptedGeocoder::hanging(vec![capitole()], 1);
    let (session, provider) = session_with(
        AuthorizationStatus::AuthorizedWhenInUse,
        Arc::clone(&geocoder),
        SessionConfig::default(),
    );

    let described = tokio::spawn({
        let session = session.clone();
        async move { session.describe_place().await }
    });
    wait_for_call(&provider, Call::RequestSingleFix, 1).await;
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(25.0, 0)]));
    wait_for_geocode(&geocoder, 1).await;

    session.cancel_place_lookup();

    assert_eq!(
        described.await.unwrap(),
        PlaceResponse::Failure(PlaceError::Geocode(GeocodeError::Cancelled))
    );
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_profile_change_updates_all_thresholds() {
    let (session, provider) = authorized_session();

    let initial = provider.last_settings().expect("settings applied at construction");
    assert_eq!(initial.distance_filter, 50.0);
    assert_eq!(initial.desired_accuracy, DesiredAccuracy::NearestTenMeters);

    session.set_profile(&PrecisionProfile::High);

    let settings = provider.last_settings().unwrap();
    assert_eq!(settings.distance_filter, 10.0);
    assert_eq!(settings.desired_accuracy, DesiredAccuracy::BestForNavigation);
    assert_eq!(session.filter().horizontal_accuracy, 200.0);
    assert_eq!(session.config().precision.horizontal_accuracy, 200.0);

    // A 300m fix now fails the stricter threshold
    let mut updates = session.start_updates(UpdateMode::Continuous);
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(300.0, 0)]));
    assert!(updates.try_next().is_none());
}

#[derive(Debug)]
struct SurveyProfile;

impl LocationProfile for SurveyProfile {
    fn distance_filter(&self) -> f64 {
        1.0
    }

    fn desired_accuracy(&self) -> DesiredAccuracy {
        DesiredAccuracy::Best
    }

    fn horizontal_accuracy(&self) -> f64 {
        5.0
    }
}

#[tokio::test]
async fn test_custom_profile() {
    let (session, provider) = authorized_session();
    session.set_profile(&SurveyProfile);

    assert_eq!(session.filter().horizontal_accuracy, 5.0);
    assert_eq!(provider.last_settings().unwrap().distance_filter, 1.0);
}

#[tokio::test]
async fn test_max_age_change_applies_to_next_fix() {
    let (session, _provider) = authorized_session();
    let mut updates = session.start_updates(UpdateMode::Continuous);

    session.handle_event(ProviderEvent::FixesReceived(vec![fix(10.0, 30)]));
    assert!(updates.try_next().is_some());

    session.set_max_age(Duration::from_secs(10));
    session.handle_event(ProviderEvent::FixesReceived(vec![fix(10.0, 30)]));
    assert!(updates.try_next().is_none());
}

// ============================================================================
// Provider event channel
// ============================================================================

#[tokio::test]
async fn test_attached_channel_drives_full_cycle() {
    let geocoder = ScriptedGeocoder::new(vec![capitole()]);
    let (session, provider) = session_with(
        AuthorizationStatus::Undetermined,
        Arc::clone(&geocoder),
        SessionConfig::default(),
    );

    let (events_tx, events_rx) = mpsc::channel(16);
    let pump = session.attach(events_rx);

    let described = tokio::spawn({
        let session = session.clone();
        async move { session.describe_place().await }
    });

    wait_for_call(
        &provider,
        Call::RequestAuthorization(AuthorizationMode::WhenInUse),
        1,
    )
    .await;
    provider.set_status(AuthorizationStatus::AuthorizedWhenInUse);
    events_tx
        .send(ProviderEvent::AuthorizationChanged(
            AuthorizationStatus::AuthorizedWhenInUse,
        ))
        .await
        .unwrap();

    wait_for_call(&provider, Call::RequestSingleFix, 1).await;
    events_tx
        .send(ProviderEvent::FixesReceived(vec![fix(25.0, 0)]))
        .await
        .unwrap();

    assert_eq!(described.await.unwrap(), PlaceResponse::Found(capitole()));

    drop(events_tx);
    tokio::time::timeout(Duration::from_secs(5), pump)
        .await
        .expect("pump stops when channel closes")
        .unwrap();
}
