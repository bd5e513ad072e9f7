//! gpsd location provider.
//!
//! Binds a [`LocationSession`](crate::location::LocationSession) to the gpsd
//! daemon over its JSON protocol (TCP, default port 2947).
//!
//! # Setup
//!
//! Run `gpsd` with a receiver attached, e.g. `gpsd -N /dev/ttyUSB0`, and point
//! the provider at it.
//!
//! # Example
//!
//! ```ignore
//! let (tx, rx) = mpsc::channel(16);
//! let provider = GpsdProvider::spawn(GpsdConfig::default(), tx);
//! let session = LocationSession::new(provider, geocoder);
//! session.attach(rx);
//! ```

mod config;
mod error;
mod protocol;
mod provider;

pub use config::{
    GpsdConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_GPSD_HOST, DEFAULT_GPSD_PORT,
};
pub use error::GpsdError;
pub use protocol::{parse_report, ErrorReport, Report, TpvReport, VersionReport};
pub use provider::{daemon_release, GpsdProvider};
