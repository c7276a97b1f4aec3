//! Semantic version parsing and comparison
//!
//! Property defaults and recommended values are gated by the target Spark
//! version. Precedence is plain numeric major.minor.patch comparison; no
//! pre-release or build metadata is supported. Early Spark releases were
//! published with two components ("0.6"), so a missing patch component is
//! read as zero.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A parsed major.minor.patch version
///
/// Ordering is derived, numeric per component, so `0.9.0 < 0.10.0` and
/// `1.4.1 < 2.0.0`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component (zero when absent from the input)
    pub patch: u64,
}

impl Version {
    /// Create a version from explicit components
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::str::FromStr for Version {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CatalogError::invalid_version(s);

        let mut parts = s.split('.');
        let major = parts.next().ok_or_else(invalid)?;
        let minor = parts.next().ok_or_else(invalid)?;
        let patch = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let parse = |component: &str| -> Result<u64, CatalogError> {
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            component.parse().map_err(|_| invalid())
        };

        Ok(Self {
            major: parse(major)?,
            minor: parse(minor)?,
            patch: match patch {
                Some(p) => parse(p)?,
                None => 0,
            },
        })
    }
}

impl TryFrom<String> for Version {
    type Error = CatalogError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
