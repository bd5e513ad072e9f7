//! Authorization types.

use std::fmt;
use std::str::FromStr;

/// Authorization state reported by the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    /// The user has not been asked yet.
    #[default]
    Undetermined,
    /// The user refused access.
    Denied,
    /// Access is blocked by policy (parental controls, MDM, missing service).
    Restricted,
    /// Access granted, including background delivery.
    AuthorizedAlways,
    /// Access granted while the application is in use.
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    /// True once the user has been prompted at least once.
    ///
    /// Every status other than `Undetermined` is terminal for an
    /// authorization request.
    #[inline]
    pub fn is_determined(&self) -> bool {
        !matches!(self, Self::Undetermined)
    }

    /// True for the authorized variants.
    #[inline]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::AuthorizedAlways | Self::AuthorizedWhenInUse)
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undetermined => write!(f, "Undetermined"),
            Self::Denied => write!(f, "Denied"),
            Self::Restricted => write!(f, "Restricted"),
            Self::AuthorizedAlways => write!(f, "Authorized (always)"),
            Self::AuthorizedWhenInUse => write!(f, "Authorized (when in use)"),
        }
    }
}

/// Which kind of authorization to request.
///
/// Background delivery is only enabled in `Always` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationMode {
    /// Location is delivered even when the application is in the background.
    Always,
    /// Location is delivered only while the application is in use.
    #[default]
    WhenInUse,
}

impl AuthorizationMode {
    /// Config-file name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::WhenInUse => "when_in_use",
        }
    }

    /// Whether background delivery should be enabled for this mode.
    #[inline]
    pub fn allows_background(&self) -> bool {
        matches!(self, Self::Always)
    }
}

impl fmt::Display for AuthorizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AuthorizationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "when_in_use" | "in_use" => Ok(Self::WhenInUse),
            other => Err(format!(
                "unknown authorization mode '{}' (expected always or when_in_use)",
                other
            )),
        }
    }
}
