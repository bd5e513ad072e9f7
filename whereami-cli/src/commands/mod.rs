//! CLI command implementations.
//!
//! Each subcommand has its own module with its handler.
//!
//! # Command Modules
//!
//! - [`authorize`] - Request location access
//! - [`config`] - Configuration management (get, set, list, path)
//! - [`describe`] - Reverse geocode the current position
//! - [`locate`] - Print a single fix
//! - [`status`] - Show authorization state
//! - [`watch`] - Stream fixes

pub mod authorize;
pub mod common;
pub mod config;
pub mod describe;
pub mod locate;
pub mod status;
pub mod watch;
