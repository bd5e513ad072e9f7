//! gpsd location provider.
//!
//! Implements [`LocationProvider`] on top of a gpsd TCP connection. Requests
//! from the session are forwarded as commands to a background task that owns
//! the socket; results flow back as [`ProviderEvent`]s.
//!
//! gpsd has no notion of permission. Authorization is modelled as "can we
//! reach the daemon": `request_authorization` connects, and the VERSION banner
//! grants the requested mode. An unreachable daemon answers `Restricted` and
//! disables the service.
//!
//! Reachability is not permanent, so neither answer is. A failed connect and a
//! lost connection both leave the status `Undetermined`; the next
//! authorization request connects again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use super::config::GpsdConfig;
use super::error::GpsdError;
use super::protocol::{parse_report, Report, WATCH_DISABLE, WATCH_ENABLE};
use crate::coord::Coordinate;
use crate::location::{
    AuthorizationMode, AuthorizationStatus, DesiredAccuracy, LocationFix, LocationProvider,
    ProviderError, ProviderEvent, ProviderSettings,
};

/// Request forwarded to the connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Authorize(AuthorizationMode),
    Watch { single: bool },
    Stop,
}

/// State readable synchronously by the session.
#[derive(Debug)]
struct Shared {
    status: Mutex<AuthorizationStatus>,
    service_enabled: AtomicBool,
    allows_background: AtomicBool,
    settings: Mutex<ProviderSettings>,
}

/// gpsd-backed location provider.
///
/// # Example
///
/// ```ignore
/// let (events_tx, events_rx) = mpsc::channel(16);
/// let provider = GpsdProvider::spawn(GpsdConfig::default(), events_tx);
/// let session = LocationSession::new(provider, geocoder);
/// session.attach(events_rx);
/// ```
#[derive(Debug, Clone)]
pub struct GpsdProvider {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<Command>,
}

impl GpsdProvider {
    /// Create the provider and spawn its connection task.
    ///
    /// Must be called from within a tokio runtime. The task ends when every
    /// provider handle is dropped or the event receiver is closed.
    pub fn spawn(config: GpsdConfig, events: mpsc::Sender<ProviderEvent>) -> Self {
        let shared = Arc::new(Shared {
            status: Mutex::new(AuthorizationStatus::Undetermined),
            service_enabled: AtomicBool::new(true),
            allows_background: AtomicBool::new(false),
            settings: Mutex::new(ProviderSettings {
                distance_filter: 0.0,
                desired_accuracy: DesiredAccuracy::Best,
            }),
        });
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let task = ConnectionTask {
            config,
            shared: Arc::clone(&shared),
            commands: commands_rx,
            events,
            connection: None,
            watch: None,
            last_delivered: None,
        };
        tokio::spawn(task.run());

        Self {
            shared,
            commands: commands_tx,
        }
    }

    /// Whether background delivery was last allowed.
    pub fn allows_background_updates(&self) -> bool {
        self.shared.allows_background.load(Ordering::Relaxed)
    }

    /// Settings last applied by the session.
    pub fn settings(&self) -> ProviderSettings {
        *self.shared.settings.lock()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!(?command, "gpsd connection task is gone, command dropped");
        }
    }
}

impl LocationProvider for GpsdProvider {
    fn authorization_status(&self) -> AuthorizationStatus {
        *self.shared.status.lock()
    }

    fn is_service_enabled(&self) -> bool {
        self.shared.service_enabled.load(Ordering::Relaxed)
    }

    fn request_authorization(&self, mode: AuthorizationMode) {
        self.send(Command::Authorize(mode));
    }

    fn start_updating(&self) {
        self.send(Command::Watch { single: false });
    }

    fn request_single_fix(&self) {
        self.send(Command::Watch { single: true });
    }

    fn stop_updating(&self) {
        self.send(Command::Stop);
    }

    fn set_allows_background_updates(&self, allowed: bool) {
        // A daemon connection is unaffected by foreground state; recorded only
        self.shared.allows_background.store(allowed, Ordering::Relaxed);
    }

    fn apply_settings(&self, settings: ProviderSettings) {
        debug!(
            distance_filter = settings.distance_filter,
            desired_accuracy = %settings.desired_accuracy,
            "gpsd provider settings applied"
        );
        *self.shared.settings.lock() = settings;
    }
}

/// Open daemon connection.
struct Connection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    release: String,
}

impl Connection {
    /// Connect and wait for the VERSION banner.
    async fn open(config: &GpsdConfig) -> Result<Self, GpsdError> {
        let address = config.address();
        tokio::time::timeout(config.connect_timeout, Self::handshake(&address))
            .await
            .map_err(|_| GpsdError::Timeout(address.clone()))?
    }

    async fn handshake(address: &str) -> Result<Self, GpsdError> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|source| GpsdError::ConnectError {
                address: address.to_string(),
                source,
            })?;
        let (reader, writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        loop {
            let line = lines.next_line().await?.ok_or(GpsdError::ConnectionClosed)?;
            if let Ok(Report::Version(version)) = parse_report(&line) {
                info!(
                    address = %address,
                    release = %version.release,
                    proto = format!("{}.{}", version.proto_major, version.proto_minor),
                    "Connected to gpsd"
                );
                return Ok(Self {
                    lines,
                    writer,
                    release: version.release,
                });
            }
        }
    }

    async fn write(&mut self, command: &str) -> Result<(), GpsdError> {
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Check that a daemon answers at the configured address.
///
/// Connects, waits for the VERSION banner and hangs up. Returns the daemon
/// release. No provider state is involved, so this never counts as an
/// authorization request.
pub async fn daemon_release(config: &GpsdConfig) -> Result<String, GpsdError> {
    let connection = Connection::open(config).await?;
    debug!(release = %connection.release, "gpsd daemon answered");
    Ok(connection.release)
}

enum Input {
    Command(Option<Command>),
    Line(std::io::Result<Option<String>>),
}

/// Background task owning the socket.
struct ConnectionTask {
    config: GpsdConfig,
    shared: Arc<Shared>,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::Sender<ProviderEvent>,
    connection: Option<Connection>,
    /// `Some(single)` while watching.
    watch: Option<bool>,
    last_delivered: Option<Coordinate>,
}

impl ConnectionTask {
    async fn run(mut self) {
        debug!(address = %self.config.address(), "gpsd connection task started");
        let mut fixes_sent: u64 = 0;

        loop {
            let input = match &mut self.connection {
                Some(connection) => tokio::select! {
                    command = self.commands.recv() => Input::Command(command),
                    line = connection.lines.next_line() => Input::Line(line),
                },
                None => Input::Command(self.commands.recv().await),
            };

            let keep_running = match input {
                Input::Command(None) => false,
                Input::Command(Some(command)) => self.handle_command(command).await,
                Input::Line(Ok(Some(line))) => self.handle_line(&line, &mut fixes_sent).await,
                Input::Line(Ok(None)) => self.connection_lost(GpsdError::ConnectionClosed).await,
                Input::Line(Err(e)) => self.connection_lost(GpsdError::Io(e)).await,
            };

            if !keep_running {
                break;
            }
        }

        info!(fixes_sent, "gpsd connection task stopped");
    }

    /// Returns false once the event channel is closed.
    async fn emit(&self, event: ProviderEvent) -> bool {
        if self.events.send(event).await.is_err() {
            debug!("Provider event channel closed, stopping gpsd task");
            return false;
        }
        true
    }

    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Authorize(mode) => self.authorize(mode).await,
            Command::Watch { single } => self.watch(single).await,
            Command::Stop => {
                self.watch = None;
                if let Some(connection) = self.connection.as_mut() {
                    if let Err(e) = connection.write(WATCH_DISABLE).await {
                        warn!(error = %e, "Failed to disable gpsd watch");
                    }
                }
                debug!("gpsd watch stopped");
                true
            }
        }
    }

    async fn authorize(&mut self, mode: AuthorizationMode) -> bool {
        if self.connection.is_none() {
            match Connection::open(&self.config).await {
                Ok(connection) => {
                    self.connection = Some(connection);
                    self.shared.service_enabled.store(true, Ordering::Relaxed);
                }
                Err(e) => {
                    warn!(error = %e, "gpsd unavailable, location restricted");
                    self.shared.service_enabled.store(false, Ordering::Relaxed);
                    *self.shared.status.lock() = AuthorizationStatus::Undetermined;
                    return self
                        .emit(ProviderEvent::AuthorizationChanged(
                            AuthorizationStatus::Restricted,
                        ))
                        .await;
                }
            }
        }

        let status = granted_status(mode);
        *self.shared.status.lock() = status;
        self.emit(ProviderEvent::AuthorizationChanged(status)).await
    }

    async fn watch(&mut self, single: bool) -> bool {
        let Some(connection) = self.connection.as_mut() else {
            return self
                .emit(ProviderEvent::Error(ProviderError::Disconnected(
                    "not connected to gpsd".to_string(),
                )))
                .await;
        };

        if let Err(e) = connection.write(WATCH_ENABLE).await {
            return self.connection_lost(e).await;
        }

        self.watch = Some(single);
        self.last_delivered = None;
        debug!(single, "gpsd watch enabled");
        true
    }

    async fn handle_line(&mut self, line: &str, fixes_sent: &mut u64) -> bool {
        let report = match parse_report(line) {
            Ok(report) => report,
            Err(e) => {
                trace!(error = %e, "Ignoring unparseable gpsd line");
                return true;
            }
        };

        match report {
            Report::Tpv(tpv) => {
                let Some(single) = self.watch else {
                    return true;
                };
                let Some(fix) = tpv.to_fix(chrono::Utc::now(), Instant::now()) else {
                    return true;
                };
                if !single && self.within_distance_filter(&fix) {
                    trace!(
                        lat = fix.latitude(),
                        lon = fix.longitude(),
                        "Fix within distance filter, skipped"
                    );
                    return true;
                }

                self.last_delivered = Some(fix.coordinate);
                *fixes_sent += 1;
                self.emit(ProviderEvent::FixesReceived(vec![fix])).await
            }
            Report::Error(error) => {
                warn!(message = %error.message, "gpsd reported an error");
                self.emit(ProviderEvent::Error(ProviderError::Other(error.message)))
                    .await
            }
            Report::Version(_) | Report::Other => true,
        }
    }

    fn within_distance_filter(&self, fix: &LocationFix) -> bool {
        let distance_filter = self.shared.settings.lock().distance_filter;
        match self.last_delivered {
            Some(previous) if distance_filter > 0.0 => {
                previous.distance_to(&fix.coordinate) < distance_filter
            }
            _ => false,
        }
    }

    async fn connection_lost(&mut self, error: impl Into<GpsdError>) -> bool {
        let error = error.into();
        warn!(error = %error, "gpsd connection lost");

        self.connection = None;
        *self.shared.status.lock() = AuthorizationStatus::Undetermined;
        let was_watching = self.watch.take().is_some();

        if was_watching {
            self.emit(ProviderEvent::Error(error.into())).await
        } else {
            true
        }
    }
}

fn granted_status(mode: AuthorizationMode) -> AuthorizationStatus {
    match mode {
        AuthorizationMode::Always => AuthorizationStatus::AuthorizedAlways,
        AuthorizationMode::WhenInUse => AuthorizationStatus::AuthorizedWhenInUse,
    }
}
