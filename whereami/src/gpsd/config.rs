//! Configuration for the gpsd provider.

use std::time::Duration;

use super::error::GpsdError;

/// Default gpsd host.
pub const DEFAULT_GPSD_HOST: &str = "127.0.0.1";

/// Default gpsd TCP port.
pub const DEFAULT_GPSD_PORT: u16 = 2947;

/// Default time allowed for connecting and receiving the VERSION banner.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the gpsd provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpsdConfig {
    /// Host running gpsd.
    pub host: String,

    /// gpsd TCP port.
    pub port: u16,

    /// Time allowed for connecting and receiving the VERSION banner.
    pub connect_timeout: Duration,
}

impl GpsdConfig {
    /// Create a config for a specific host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Parse a `HOST:PORT` string. A bare host uses the default port.
    pub fn from_address(address: &str) -> Result<Self, GpsdError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GpsdError::InvalidAddress(address.to_string()));
        }

        match address.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| GpsdError::InvalidAddress(address.to_string()))?;
                if host.is_empty() {
                    return Err(GpsdError::InvalidAddress(address.to_string()));
                }
                Ok(Self::new(host, port))
            }
            None => Ok(Self::new(address, DEFAULT_GPSD_PORT)),
        }
    }

    /// `host:port` suitable for `TcpStream::connect`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for GpsdConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GPSD_HOST.to_string(),
            port: DEFAULT_GPSD_PORT,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}
