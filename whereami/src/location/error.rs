//! Error types for location providers.

use thiserror::Error;

/// Failures reported by a location provider.
///
/// Surfaced once to the pending location subscriber; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider could not determine a position right now.
    #[error("Location is currently unknown")]
    LocationUnknown,

    /// The provider refused to deliver locations.
    #[error("Location access denied by the provider")]
    Denied,

    /// The provider lost its connection to the location source.
    #[error("Location provider disconnected: {0}")]
    Disconnected(String),

    /// The pending request was discarded before a fix arrived.
    #[error("Location request cancelled")]
    Cancelled,

    /// Any other provider-specific failure.
    #[error("Location provider error: {0}")]
    Other(String),
}
