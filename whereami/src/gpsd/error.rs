//! Error types for the gpsd provider.

use thiserror::Error;

use crate::location::ProviderError;

/// Errors that can occur talking to gpsd.
#[derive(Debug, Error)]
pub enum GpsdError {
    /// The configured address could not be parsed.
    #[error("Invalid gpsd address: {0:?}")]
    InvalidAddress(String),

    /// TCP connection failed.
    #[error("Failed to connect to gpsd at {address}: {source}")]
    ConnectError {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// No connection or VERSION banner within the timeout.
    #[error("Timed out connecting to gpsd at {0}")]
    Timeout(String),

    /// The daemon closed the connection.
    #[error("gpsd closed the connection")]
    ConnectionClosed,

    /// Socket read or write failed.
    #[error("gpsd I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A report could not be decoded.
    #[error("Failed to parse gpsd report: {0}")]
    JsonError(String),
}

impl From<serde_json::Error> for GpsdError {
    fn from(e: serde_json::Error) -> Self {
        GpsdError::JsonError(e.to_string())
    }
}

impl From<GpsdError> for ProviderError {
    fn from(e: GpsdError) -> Self {
        ProviderError::Disconnected(e.to_string())
    }
}
