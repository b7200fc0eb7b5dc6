//! Content metadata: classification, course associations, review window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Security classification, ordered from least to most restrictive.
///
/// Stored and diffed by this engine; enforcement is the consuming
/// system's responsibility.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Releasable without restriction
    #[default]
    Unclassified,
    /// Internal distribution only
    Restricted,
    /// Need-to-know distribution
    Confidential,
    /// Highest classification handled by the platform
    Secret,
}

impl Display for SecurityLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unclassified => "unclassified",
            Self::Restricted => "restricted",
            Self::Confidential => "confidential",
            Self::Secret => "secret",
        };
        f.write_str(label)
    }
}

/// Descriptive metadata carried by every version snapshot
///
/// Pure value type: two values are equal when every field matches, with
/// course associations compared order-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Primary category (e.g. "gunnery", "maintenance")
    pub category: String,

    /// Optional refinement of the category
    pub subcategory: Option<String>,

    /// Associated weapon or equipment system, if any
    pub weapon_system: Option<String>,

    /// Courses this content is attached to (non-unique, order-irrelevant)
    pub course_ids: Vec<String>,

    /// Security classification
    pub security_level: SecurityLevel,

    /// Free-text tags
    pub tags: BTreeSet<String>,

    /// Start of the validity window
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity window
    pub valid_until: Option<DateTime<Utc>>,

    /// Reference to the source document this content was derived from
    pub source_document: Option<String>,

    /// When the content was last reviewed
    pub last_reviewed: Option<DateTime<Utc>>,

    /// When the next review is due
    pub next_review: Option<DateTime<Utc>>,
}

impl ContentMetadata {
    /// Minimal metadata with a category and classification.
    #[must_use]
    pub fn new(category: impl Into<String>, security_level: SecurityLevel) -> Self {
        Self {
            category: category.into(),
            security_level,
            ..Self::default()
        }
    }

    /// Canonical JSON form used for digesting and field-wise diffing.
    ///
    /// Course associations are sorted so that logically equal metadata
    /// canonicalizes identically regardless of list order.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn canonical_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Some(courses) = value
            .get_mut("course_ids")
            .and_then(serde_json::Value::as_array_mut)
        {
            courses.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        }
        Ok(value)
    }

    fn sorted_courses(&self) -> Vec<&String> {
        let mut courses: Vec<&String> = self.course_ids.iter().collect();
        courses.sort();
        courses
    }
}

impl PartialEq for ContentMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category
            && self.subcategory == other.subcategory
            && self.weapon_system == other.weapon_system
            && self.sorted_courses() == other.sorted_courses()
            && self.security_level == other.security_level
            && self.tags == other.tags
            && self.valid_from == other.valid_from
            && self.valid_until == other.valid_until
            && self.source_document == other.source_document
            && self.last_reviewed == other.last_reviewed
            && self.next_review == other.next_review
    }
}

impl Eq for ContentMetadata {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_levels_are_ordered() {
        assert!(SecurityLevel::Unclassified < SecurityLevel::Restricted);
        assert!(SecurityLevel::Restricted < SecurityLevel::Confidential);
        assert!(SecurityLevel::Confidential < SecurityLevel::Secret);
    }

    #[test]
    fn equality_ignores_course_order() {
        let mut a = ContentMetadata::new("gunnery", SecurityLevel::Restricted);
        a.course_ids = vec!["c-201".to_string(), "c-105".to_string()];
        let mut b = a.clone();
        b.course_ids = vec!["c-105".to_string(), "c-201".to_string()];
        assert_eq!(a, b);
    }

    #[test]
    fn equality_is_field_by_field() {
        let a = ContentMetadata::new("gunnery", SecurityLevel::Restricted);
        let mut b = a.clone();
        assert_eq!(a, b);
        b.subcategory = Some("loading".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn canonical_value_sorts_courses() {
        let mut meta = ContentMetadata::new("gunnery", SecurityLevel::Unclassified);
        meta.course_ids = vec!["c-2".to_string(), "c-1".to_string()];
        let value = meta.canonical_value().unwrap();
        assert_eq!(
            value["course_ids"],
            serde_json::json!(["c-1", "c-2"])
        );
    }

    #[test]
    fn serde_round_trip() {
        let mut meta = ContentMetadata::new("maintenance", SecurityLevel::Confidential);
        meta.tags.insert("hydraulics".to_string());
        meta.valid_from = Some(Utc::now());
        let json = serde_json::to_string(&meta).unwrap();
        let decoded: ContentMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, decoded);
    }
}
