//! whereami - "where am I?" answers from a location service
//!
//! This library wraps a platform location provider behind a session that
//! handles the permission flow, drops stale or inaccurate fixes, and can turn
//! the current position into a human-readable place.
//!
//! # High-Level API
//!
//! ```ignore
//! use tokio::sync::mpsc;
//! use whereami::geocoder::NominatimGeocoder;
//! use whereami::gpsd::{GpsdConfig, GpsdProvider};
//! use whereami::location::{LocationResponse, LocationSession};
//!
//! let (events_tx, events_rx) = mpsc::channel(16);
//! let provider = GpsdProvider::spawn(GpsdConfig::default(), events_tx);
//! let session = LocationSession::new(provider, NominatimGeocoder::with_defaults()?);
//! session.attach(events_rx);
//!
//! if let LocationResponse::Updated(fix) = session.locate().await {
//!     println!("{} ±{}m", fix.coordinate, fix.horizontal_accuracy);
//! }
//! ```

pub mod config;
pub mod coord;
pub mod geocoder;
pub mod gpsd;
pub mod location;
pub mod logging;

/// Version of the whereami library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
