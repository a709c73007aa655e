//! Library request parsing (`alias:MAJOR[.MINOR[.PATCH]]`)

use super::LibVersion;
use crate::error::{ShmgrError, ShmgrResult};
use serde::{Serialize, Serializer};
use std::fmt;

/// Minimum acceptable version inside exactly one major line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionFloor {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionFloor {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// True iff `version` is in the same major and at or above the floor
    pub fn is_satisfied_by(&self, version: &LibVersion) -> bool {
        version.major == self.major && (version.minor, version.patch) >= (self.minor, self.patch)
    }
}

impl fmt::Display for VersionFloor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for VersionFloor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A parsed `alias:version` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRequest {
    pub alias: String,
    pub floor: VersionFloor,
    token: String,
}

impl LibraryRequest {
    /// Parse a request token such as `foo:2`, `foo:2.1` or `bar:3.2.1`.
    ///
    /// Missing trailing components default to 0.
    pub fn parse(token: &str) -> ShmgrResult<Self> {
        let (alias, version) = token
            .split_once(':')
            .ok_or_else(|| ShmgrError::malformed(token, "expected NAME:VERSION"))?;

        if alias.is_empty() {
            return Err(ShmgrError::malformed(token, "library name is empty"));
        }
        validate_alias(alias).map_err(|reason| ShmgrError::malformed(token, reason))?;

        if version.is_empty() {
            return Err(ShmgrError::malformed(token, "version is empty"));
        }

        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() > 3 {
            return Err(ShmgrError::malformed(
                token,
                format!("expected at most 3 version components, got {}", parts.len()),
            ));
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = parse_component(part).map_err(|reason| ShmgrError::malformed(token, reason))?;
        }

        Ok(Self {
            alias: alias.to_string(),
            floor: VersionFloor::new(numbers[0], numbers[1], numbers[2]),
            token: token.to_string(),
        })
    }

    /// The token this request was parsed from
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for LibraryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// Only plain decimal digits; `u64::from_str` would also take a leading `+`
fn parse_component(part: &str) -> Result<u64, String> {
    if part.is_empty() {
        return Err("empty version component".to_string());
    }
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a non-negative integer", part));
    }
    part.parse::<u64>()
        .map_err(|e| format!("'{}' is out of range: {}", part, e))
}

/// Validate that an alias is usable as a single cache directory name.
pub fn validate_alias(alias: &str) -> Result<(), String> {
    if alias.is_empty() {
        return Err("library name is empty".to_string());
    }
    if alias.starts_with('.') {
        return Err(format!("invalid library name '{}': must not start with '.'", alias));
    }
    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(format!(
            "invalid library name '{}': must contain only alphanumeric characters, '-', '_' or '.'",
            alias
        ));
    }
    Ok(())
}
