//! Positional diffs between two version snapshots.
//!
//! The content comparison is deliberately positional, not a minimal-edit
//! (LCS) diff: line `i` of the old body is compared against line `i` of
//! the new body. It over-reports changes when lines are inserted or
//! removed mid-document. That is the documented contract (downstream
//! consumers render exactly this shape), so do not "fix" it to a classic
//! diff without changing the contract.

use crate::metadata::ContentMetadata;
use crate::version::ContentVersion;
use serde::{Deserialize, Serialize};

/// One metadata field that differs between two versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Metadata field name
    pub field: String,
    /// Canonical rendering of the old value
    pub old_value: String,
    /// Canonical rendering of the new value
    pub new_value: String,
}

/// Structural difference between two versions
///
/// Ephemeral: computed on demand, never persisted, carries no identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDiff {
    /// Lines present only in the new version
    pub added_lines: Vec<String>,
    /// Lines present only in the old version
    pub removed_lines: Vec<String>,
    /// Lines present in both but differing, rendered
    /// `Line {n}: "{old}" -> "{new}"`
    pub modified_lines: Vec<String>,
    /// Metadata fields whose values differ
    pub metadata_changes: Vec<FieldChange>,
}

impl VersionDiff {
    /// True when the two versions have identical content and metadata.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_lines.is_empty()
            && self.removed_lines.is_empty()
            && self.modified_lines.is_empty()
            && self.metadata_changes.is_empty()
    }
}

/// Computes [`VersionDiff`]s; pure and stateless
#[derive(Debug)]
pub struct DiffEngine;

impl DiffEngine {
    /// Compare two versions, treating `old` as the baseline.
    ///
    /// # Errors
    /// Returns error if metadata canonicalization fails
    pub fn compare(old: &ContentVersion, new: &ContentVersion) -> Result<VersionDiff, DiffError> {
        let mut diff = VersionDiff::default();
        Self::compare_lines(&old.content, &new.content, &mut diff);
        diff.metadata_changes = Self::metadata_changes(&old.metadata, &new.metadata)?;
        Ok(diff)
    }

    fn compare_lines(old: &str, new: &str, diff: &mut VersionDiff) {
        let old_lines: Vec<&str> = old.lines().collect();
        let new_lines: Vec<&str> = new.lines().collect();
        for i in 0..old_lines.len().max(new_lines.len()) {
            match (old_lines.get(i), new_lines.get(i)) {
                (Some(o), Some(n)) if o != n => diff
                    .modified_lines
                    .push(format!("Line {}: \"{o}\" -> \"{n}\"", i + 1)),
                (Some(_), Some(_)) => {}
                (None, Some(n)) => diff.added_lines.push((*n).to_string()),
                (Some(o), None) => diff.removed_lines.push((*o).to_string()),
                (None, None) => unreachable!("index bounded by max of both lengths"),
            }
        }
    }

    /// Full field-set union with value equality per field, canonical
    /// string rendering for each mismatch.
    fn metadata_changes(
        old: &ContentMetadata,
        new: &ContentMetadata,
    ) -> Result<Vec<FieldChange>, DiffError> {
        let old_value = old.canonical_value()?;
        let new_value = new.canonical_value()?;
        let (Some(old_map), Some(new_map)) = (old_value.as_object(), new_value.as_object()) else {
            return Ok(Vec::new());
        };

        let mut changes = Vec::new();
        let mut fields: Vec<&String> = old_map.keys().chain(new_map.keys()).collect();
        fields.sort();
        fields.dedup();
        for field in fields {
            let old_field = old_map.get(field);
            let new_field = new_map.get(field);
            if old_field != new_field {
                changes.push(FieldChange {
                    field: field.clone(),
                    old_value: render(old_field),
                    new_value: render(new_field),
                });
            }
        }
        Ok(changes)
    }
}

fn render(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => "null".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Errors raised while computing a diff
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Metadata canonicalization failed
    #[error("metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ItemId, UserId};
    use crate::metadata::SecurityLevel;
    use crate::version::{VersionFactory, VersionSpec};
    use pretty_assertions::assert_eq;

    fn version(content: &str, metadata: ContentMetadata) -> ContentVersion {
        VersionFactory::first(VersionSpec {
            item_id: ItemId::new(),
            title: "Gun Drill SOP".to_string(),
            content: content.to_string(),
            metadata,
            author: UserId::new("sgt.mills"),
            change_description: "test fixture".to_string(),
        })
        .unwrap()
    }

    fn meta() -> ContentMetadata {
        ContentMetadata::new("gunnery", SecurityLevel::Restricted)
    }

    #[test]
    fn diff_against_self_is_empty() {
        let v = version("1.\n2.\n3.", meta());
        let diff = DiffEngine::compare(&v, &v).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn modified_and_added_lines() {
        let old = version("1.\n2.\n3.", meta());
        let new = version("1.\n2b.\n3.\n4.", meta());
        let diff = DiffEngine::compare(&old, &new).unwrap();
        assert_eq!(diff.modified_lines, vec!["Line 2: \"2.\" -> \"2b.\""]);
        assert_eq!(diff.added_lines, vec!["4."]);
        assert!(diff.removed_lines.is_empty());
        assert!(diff.metadata_changes.is_empty());
    }

    #[test]
    fn removed_lines() {
        let old = version("alpha\nbravo\ncharlie", meta());
        let new = version("alpha", meta());
        let diff = DiffEngine::compare(&old, &new).unwrap();
        assert_eq!(diff.removed_lines, vec!["bravo", "charlie"]);
        assert!(diff.added_lines.is_empty());
    }

    // Positional comparison over-reports on mid-document insertion; the
    // shifted tail shows up as modifications plus one addition.
    #[test]
    fn insertion_shifts_are_reported_positionally() {
        let old = version("alpha\nbravo", meta());
        let new = version("inserted\nalpha\nbravo", meta());
        let diff = DiffEngine::compare(&old, &new).unwrap();
        assert_eq!(
            diff.modified_lines,
            vec![
                "Line 1: \"alpha\" -> \"inserted\"",
                "Line 2: \"bravo\" -> \"alpha\"",
            ]
        );
        assert_eq!(diff.added_lines, vec!["bravo"]);
    }

    #[test]
    fn metadata_field_changes() {
        let mut changed = meta();
        changed.security_level = SecurityLevel::Secret;
        changed.subcategory = Some("loading".to_string());
        let old = version("body", meta());
        let new = version("body", changed);
        let diff = DiffEngine::compare(&old, &new).unwrap();
        assert_eq!(diff.metadata_changes.len(), 2);

        let security = diff
            .metadata_changes
            .iter()
            .find(|c| c.field == "security_level")
            .unwrap();
        assert_eq!(security.old_value, "restricted");
        assert_eq!(security.new_value, "secret");

        let subcategory = diff
            .metadata_changes
            .iter()
            .find(|c| c.field == "subcategory")
            .unwrap();
        assert_eq!(subcategory.old_value, "null");
        assert_eq!(subcategory.new_value, "loading");
    }

    #[test]
    fn course_order_is_not_a_change() {
        let mut a = meta();
        a.course_ids = vec!["c-2".to_string(), "c-1".to_string()];
        let mut b = meta();
        b.course_ids = vec!["c-1".to_string(), "c-2".to_string()];
        let diff = DiffEngine::compare(&version("body", a), &version("body", b)).unwrap();
        assert!(diff.metadata_changes.is_empty());
    }
}
