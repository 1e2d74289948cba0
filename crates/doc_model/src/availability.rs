use std::fmt;

use semver::Version;

/// Canonical identifier for the Mac Catalyst availability domain.
///
/// Resolvers announce the platform under its display name "Mac Catalyst";
/// every other platform name doubles as its domain identifier.
pub const MAC_CATALYST_DOMAIN: &str = "macCatalyst";

/// A platform version triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlatformVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl PlatformVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Leniently parses a platform version string.
    ///
    /// Availability metadata routinely omits trailing components ("13.5",
    /// "14"); missing components are padded with zeros before handing the
    /// string to the semver parser. Anything the parser still rejects yields
    /// `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_start_matches('v');
        if trimmed.is_empty() {
            return None;
        }
        let padded = match trimmed.split('.').count() {
            1 => format!("{trimmed}.0.0"),
            2 => format!("{trimmed}.0"),
            _ => trimmed.to_string(),
        };
        let version = Version::parse(&padded).ok()?;
        Some(Self::new(version.major, version.minor, version.patch))
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One row of a symbol's availability table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityItem {
    pub domain: String,
    pub introduced: Option<PlatformVersion>,
    pub deprecated: Option<PlatformVersion>,
    pub obsoleted: Option<PlatformVersion>,
    pub renamed: Option<String>,
    pub is_unconditionally_deprecated: bool,
    pub is_unconditionally_unavailable: bool,
}
