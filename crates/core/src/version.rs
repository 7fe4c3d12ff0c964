//! Release versions of the scanned codebase
//!
//! A [`Version`] is either a numeric release tag (`v3.1.2`) or the
//! [`Version::Latest`] sentinel that stands for the unreleased tip of the
//! default branch.
//!
//! # Ordering
//!
//! Releases compare by `(major, minor, patch)`; the sentinel is greater than
//! every release. The derived `Ord` relies on variant declaration order, so
//! `Release` must stay declared before `Latest`.
//!
//! ```
//! use hookscope_core::Version;
//!
//! let a: Version = "v2.9.0".parse().unwrap();
//! let b: Version = "3.0.0".parse().unwrap();
//! assert!(a < b);
//! assert!(b < Version::Latest);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Name used for the sentinel version in text form
pub const LATEST: &str = "latest";

/// A version of the scanned codebase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    /// A released `major.minor.patch` tag
    Release {
        /// Major component
        major: u32,
        /// Minor component
        minor: u32,
        /// Patch component
        patch: u32,
    },
    /// The unreleased tip of development, newer than every release
    Latest,
}

impl Version {
    /// Create a release version
    #[must_use]
    pub const fn release(major: u32, minor: u32, patch: u32) -> Self {
        Self::Release {
            major,
            minor,
            patch,
        }
    }

    /// Whether this is the moving "latest" sentinel
    #[must_use]
    pub const fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    /// Parse a git tag name into a release version
    ///
    /// Only plain `X.Y.Z` / `vX.Y.Z` tags are accepted; pre-release tags such
    /// as `v3.2.0.beta1` return `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.strip_prefix("refs/tags/").unwrap_or(tag);
        match tag.parse::<Self>() {
            Ok(version @ Self::Release { .. }) => Some(version),
            _ => None,
        }
    }

    /// Candidate tag names for a release, most common form first
    ///
    /// Returns an empty list for the sentinel, which has no tag.
    #[must_use]
    pub fn tag_candidates(&self) -> Vec<String> {
        match self {
            Self::Release {
                major,
                minor,
                patch,
            } => vec![
                format!("v{major}.{minor}.{patch}"),
                format!("{major}.{minor}.{patch}"),
            ],
            Self::Latest => Vec::new(),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release {
                major,
                minor,
                patch,
            } => write!(f, "v{major}.{minor}.{patch}"),
            Self::Latest => f.write_str(LATEST),
        }
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(LATEST) {
            return Ok(Self::Latest);
        }

        let invalid = || Error::InvalidVersion {
            input: s.to_string(),
        };

        let numeric = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let mut parts = numeric.split('.');
        let mut component = || -> Result<u32> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let major = component()?;
        let minor = component()?;
        let patch = component()?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::release(major, minor, patch))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
