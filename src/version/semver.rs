use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A released library version
///
/// Ordering is lexicographic on (major, minor, patch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LibVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl LibVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a strict `MAJOR.MINOR.PATCH` string.
    ///
    /// Pre-release and build metadata are rejected: cache file names and
    /// provider manifests only ever carry plain release versions.
    pub fn parse(s: &str) -> Result<Self, String> {
        let parsed = ::semver::Version::parse(s.trim()).map_err(|e| e.to_string())?;
        if !parsed.pre.is_empty() {
            return Err(format!("pre-release versions are not supported: {}", s));
        }
        if !parsed.build.is_empty() {
            return Err(format!("build metadata is not supported: {}", s));
        }
        Ok(Self::new(parsed.major, parsed.minor, parsed.patch))
    }
}

impl fmt::Display for LibVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for LibVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<(u64, u64, u64)> for LibVersion {
    fn from((major, minor, patch): (u64, u64, u64)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl Serialize for LibVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
