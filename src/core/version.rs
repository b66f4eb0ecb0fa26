//! core::version
//!
//! Two-part `MAJOR.MINOR` patchset versions.
//!
//! Versions order numerically per component, so `1.10` is newer than
//! `1.9`. Normalization is shared by `create`, `import` and subject parsing.

use std::cmp::Ordering;
use std::fmt;

use super::error::PatchsetError;

/// A patchset version.
///
/// # Example
///
/// ```
/// use patchset::core::version::Version;
///
/// let v = Version::normalize("3").unwrap();
/// assert_eq!(v.to_string(), "3.0");
/// assert_eq!(v.next_minor().to_string(), "3.1");
/// assert_eq!(v.next_major().to_string(), "4.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    major: u64,
    minor: u64,
}

impl Version {
    /// The version every new patchset starts with.
    pub const INITIAL: Version = Version { major: 1, minor: 0 };

    pub fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Parse a strict `MAJOR.MINOR` string as stored in branch names.
    ///
    /// Returns `None` for anything else, including the empty string.
    pub fn parse(input: &str) -> Option<Self> {
        let (major, minor) = input.split_once('.')?;
        if major.is_empty()
            || minor.is_empty()
            || !major.bytes().all(|b| b.is_ascii_digit())
            || !minor.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Normalize a user supplied version.
    ///
    /// - missing components become `0`
    /// - signs are dropped
    /// - anything past the second component is discarded
    /// - a zero major becomes `1`
    ///
    /// # Errors
    ///
    /// Returns [`PatchsetError::Other`] when a component is not an integer.
    ///
    /// # Example
    ///
    /// ```
    /// use patchset::core::version::Version;
    ///
    /// assert_eq!(Version::normalize("").unwrap().to_string(), "1.0");
    /// assert_eq!(Version::normalize("2.3.4").unwrap().to_string(), "2.3");
    /// assert_eq!(Version::normalize("0.5").unwrap().to_string(), "1.5");
    /// assert!(Version::normalize("x.1").is_err());
    /// ```
    pub fn normalize(input: &str) -> Result<Self, PatchsetError> {
        let mut parts = Vec::with_capacity(2);

        for component in input.trim().split('.').take(2) {
            let value = if component.is_empty() {
                0
            } else {
                component
                    .parse::<i64>()
                    .map_err(|_| {
                        PatchsetError::other(format!("invalid version number: {input}"))
                    })?
                    .unsigned_abs()
            };
            parts.push(value);
        }

        let major = parts.first().copied().unwrap_or(1).max(1);
        let minor = parts.get(1).copied().unwrap_or(0);

        Ok(Self { major, minor })
    }

    /// Next major version; the minor number resets.
    pub fn next_major(self) -> Self {
        Self {
            major: self.major + 1,
            minor: 0,
        }
    }

    /// Next minor (internal) version.
    pub fn next_minor(self) -> Self {
        Self {
            major: self.major,
            minor: self.minor + 1,
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
