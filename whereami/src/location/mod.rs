//! Location session management.
//!
//! This module mediates between a caller that wants "where am I?" answers and
//! a platform [`LocationProvider`]. It owns the permission flow, filters stale
//! or inaccurate fixes, and hands results back as [`LocationResponse`] /
//! [`PlaceResponse`] values rather than callbacks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      LocationSession                        │
//! │                                                             │
//! │  request_authorization ──▶ waiters ◀── AuthorizationChanged │
//! │  start_updates ──────────▶ subscriber ◀── FixesReceived     │
//! │                              │  (FixFilter)                 │
//! │  describe_place ─▶ locate ─▶ ReverseGeocoder (cancellable)  │
//! └─────────────────────────────────────────────────────────────┘
//!                ▲                              │
//!         ProviderEvent                   LocationProvider
//!                └──────────── platform ◀───────┘
//! ```
//!
//! Sessions are plain values; construct as many as needed.

mod authorization;
mod config;
mod error;
mod filter;
mod fix;
mod profile;
mod provider;
mod response;
mod session;

pub use authorization::{AuthorizationMode, AuthorizationStatus};
pub use config::{SessionConfig, UpdateMode, DEFAULT_MAX_AGE};
pub use error::ProviderError;
pub use filter::{FixFilter, FixRejection};
pub use fix::LocationFix;
pub use profile::{DesiredAccuracy, LocationProfile, PrecisionProfile, PrecisionSettings};
pub use provider::{LocationProvider, ProviderEvent, ProviderSettings};
pub use response::{LocationResponse, PlaceError, PlaceResponse};
pub use session::{LocationSession, LocationUpdates};
