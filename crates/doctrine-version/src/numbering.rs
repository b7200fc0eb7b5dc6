//! Version numbering: `major.minor` labels with strict parsing.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A `major.minor` version label
///
/// The first version of an item is always `1.0`. A minor bump increments
/// the minor component; a major bump increments the major component and
/// resets minor to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber {
    major: u32,
    minor: u32,
}

impl VersionNumber {
    /// The label assigned to an item's first version (`1.0`).
    pub const INITIAL: Self = Self { major: 1, minor: 0 };

    /// Construct from explicit components.
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Major component.
    #[inline]
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Minor component.
    #[inline]
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// The label following this one.
    ///
    /// Minor bump: `2.3 -> 2.4`. Major bump: `2.3 -> 3.0`.
    #[inline]
    #[must_use]
    pub const fn bump(self, minor: bool) -> Self {
        if minor {
            Self {
                major: self.major,
                minor: self.minor + 1,
            }
        } else {
            Self {
                major: self.major + 1,
                minor: 0,
            }
        }
    }

    /// Derive the next label from an optional previous one.
    ///
    /// With no previous label this is [`VersionNumber::INITIAL`]; otherwise
    /// `previous` is parsed strictly and bumped. Malformed input is never
    /// coerced.
    ///
    /// # Errors
    /// Returns [`NumberingError::Malformed`] if `previous` is not two
    /// dot-separated non-negative integers
    pub fn next(previous: Option<&str>, minor: bool) -> Result<Self, NumberingError> {
        match previous {
            None => Ok(Self::INITIAL),
            Some(label) => Ok(label.parse::<Self>()?.bump(minor)),
        }
    }
}

impl Display for VersionNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for VersionNumber {
    type Err = NumberingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NumberingError::Malformed(s.to_string());
        let (major, minor) = s.split_once('.').ok_or_else(malformed)?;
        Ok(Self {
            major: parse_component(major).ok_or_else(malformed)?,
            minor: parse_component(minor).ok_or_else(malformed)?,
        })
    }
}

/// Strict component parse: non-empty ASCII digits only (no sign, no
/// whitespace, no further dots).
fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl Serialize for VersionNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VersionNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors raised by version numbering
#[derive(Debug, thiserror::Error)]
pub enum NumberingError {
    /// Label is not two dot-separated non-negative integers
    #[error("malformed version number: {0:?}")]
    Malformed(String),
}
