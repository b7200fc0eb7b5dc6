//! Drift-detection digests over version content and metadata.
//!
//! Provides [`ContentDigest`], a short deterministic fingerprint used to
//! detect accidental divergence between a stored version and its recorded
//! checksum. It is a checksum, not tamper-evidence.

use crate::metadata::ContentMetadata;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of raw digest bytes (16 hex characters when rendered).
pub const DIGEST_LEN: usize = 8;

/// A short content digest over `(content, metadata)`
///
/// Deterministic: identical inputs produce identical digests across
/// invocations and process restarts. Fixed-length output for any input.
/// Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    /// Create a digest from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Create digest from a byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly [`DIGEST_LEN`] bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DigestError> {
        if bytes.len() != DIGEST_LEN {
            return Err(DigestError::InvalidLength {
                expected: DIGEST_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; DIGEST_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Compute the digest of a version's content body and metadata
    ///
    /// Metadata is serialized to its canonical JSON form (sorted course
    /// associations) so that logically equal metadata always digests
    /// identically. A NUL byte separates the two inputs so that moving
    /// text between them cannot produce the same digest.
    ///
    /// # Errors
    /// Returns error if metadata canonicalization fails
    ///
    /// # Performance
    /// O(n) where n = content length
    pub fn compute(content: &str, metadata: &ContentMetadata) -> Result<Self, DigestError> {
        let meta_json = serde_json::to_vec(&metadata.canonical_value()?)?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(content.as_bytes());
        hasher.update(&[0]);
        hasher.update(&meta_json);
        let hash = hasher.finalize();
        let mut arr = [0u8; DIGEST_LEN];
        arr.copy_from_slice(&hash.as_bytes()[..DIGEST_LEN]);
        Ok(Self(arr))
    }
}

impl Display for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ContentDigest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl serde::Serialize for ContentDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ContentDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when working with content digests
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Invalid digest length
    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Metadata serialization error
    #[error("metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ContentMetadata, SecurityLevel};
    use proptest::prelude::*;

    fn metadata() -> ContentMetadata {
        let mut meta = ContentMetadata::new("gunnery", SecurityLevel::Restricted);
        meta.tags.insert("drill".to_string());
        meta
    }

    #[test]
    fn digest_is_deterministic() {
        let d1 = ContentDigest::compute("step 1\nstep 2", &metadata()).unwrap();
        let d2 = ContentDigest::compute("step 1\nstep 2", &metadata()).unwrap();
        assert_eq!(d1, d2);
    }

    #[test]
    fn digest_changes_with_content() {
        let d1 = ContentDigest::compute("step 1", &metadata()).unwrap();
        let d2 = ContentDigest::compute("step 2", &metadata()).unwrap();
        assert_ne!(d1, d2);
    }

    #[test]
    fn digest_changes_with_metadata() {
        let mut other = metadata();
        other.security_level = SecurityLevel::Secret;
        let d1 = ContentDigest::compute("step 1", &metadata()).unwrap();
        let d2 = ContentDigest::compute("step 1", &other).unwrap();
        assert_ne!(d1, d2);
    }

    #[test]
    fn digest_ignores_course_order() {
        let mut a = metadata();
        a.course_ids = vec!["c-201".to_string(), "c-105".to_string()];
        let mut b = metadata();
        b.course_ids = vec!["c-105".to_string(), "c-201".to_string()];
        let d1 = ContentDigest::compute("body", &a).unwrap();
        let d2 = ContentDigest::compute("body", &b).unwrap();
        assert_eq!(d1, d2);
    }

    #[test]
    fn digest_display_and_parse() {
        let digest = ContentDigest::compute("body", &metadata()).unwrap();
        let s = digest.to_string();
        assert_eq!(s.len(), DIGEST_LEN * 2);
        let parsed: ContentDigest = s.parse().unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn digest_from_slice_invalid_length() {
        let result = ContentDigest::from_slice(&[1u8; 7]);
        assert!(matches!(
            result,
            Err(DigestError::InvalidLength { expected: 8, actual: 7 })
        ));
    }

    #[test]
    fn digest_serde_round_trip() {
        let digest = ContentDigest::compute("body", &metadata()).unwrap();
        let json = serde_json::to_string(&digest).unwrap();
        let decoded: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, decoded);
    }

    proptest! {
        #[test]
        fn digest_length_is_fixed(content in ".*") {
            let digest = ContentDigest::compute(&content, &metadata()).unwrap();
            prop_assert_eq!(digest.to_string().len(), DIGEST_LEN * 2);
        }

        #[test]
        fn digest_hex_round_trips(content in ".*") {
            let digest = ContentDigest::compute(&content, &metadata()).unwrap();
            let parsed: ContentDigest = digest.to_string().parse().unwrap();
            prop_assert_eq!(digest, parsed);
        }
    }
}
