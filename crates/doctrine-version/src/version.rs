//! The immutable [`ContentVersion`] snapshot and its factory.
//!
//! A version is frozen at creation: editing a document always means
//! producing a new version through [`VersionFactory`], never mutating an
//! existing one. The only fields written after construction are `status`
//! and `approval`, and only by the workflow layer.

use crate::digest::{ContentDigest, DigestError};
use crate::ids::{ItemId, UserId, VersionId};
use crate::metadata::ContentMetadata;
use crate::numbering::{NumberingError, VersionNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Review-pipeline stage of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Being edited, not yet submitted
    Draft,
    /// Submitted, awaiting an approver
    PendingReview,
    /// Approved, not yet published
    Approved,
    /// The live version of its item
    Published,
    /// Retired by administrative action (terminal)
    Archived,
    /// Retired because a newer version of the same item was published
    Superseded,
}

impl Display for WorkflowStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Published => "published",
            Self::Archived => "archived",
            Self::Superseded => "superseded",
        };
        f.write_str(label)
    }
}

/// What kind of change produced a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// First version of a new item
    Created,
    /// Content edit
    Edited,
    /// Workflow status change
    StatusChanged,
    /// Metadata-only update
    MetadataUpdated,
    /// Copy of an older version's content
    Restored,
}

impl Display for ChangeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Edited => "edited",
            Self::StatusChanged => "status_changed",
            Self::MetadataUpdated => "metadata_updated",
            Self::Restored => "restored",
        };
        f.write_str(label)
    }
}

/// Approval record set by the `pending_review -> approved` transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// Who approved (never the version's creator)
    pub approved_by: UserId,
    /// When the approval was granted
    pub approved_at: DateTime<Utc>,
}

/// An immutable snapshot of a document at one point in time
///
/// # Invariants
/// - `digest` always equals `ContentDigest::compute(content, metadata)`;
///   an observed mismatch on a stored version means corruption and is
///   surfaced, never repaired
/// - `previous_version_id` is `None` exactly for an item's first version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentVersion {
    /// Globally unique version identifier
    pub id: VersionId,
    /// `major.minor` label within the owning item
    pub number: VersionNumber,
    /// Owning content item
    pub item_id: ItemId,
    /// Document title at this snapshot
    pub title: String,
    /// Full plain-text content body
    pub content: String,
    /// Metadata snapshot
    pub metadata: ContentMetadata,
    /// Review-pipeline stage
    pub status: WorkflowStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Creator identity
    pub created_by: UserId,
    /// Human-readable description of the change
    pub change_description: String,
    /// What kind of change produced this version
    pub change_kind: ChangeKind,
    /// The version this one supersedes, if any
    pub previous_version_id: Option<VersionId>,
    /// Approval record, once granted
    pub approval: Option<Approval>,
    /// Integrity digest over `(content, metadata)`
    pub digest: ContentDigest,
}

impl ContentVersion {
    /// Recompute the digest from the stored content and metadata.
    ///
    /// # Errors
    /// Returns error if metadata canonicalization fails
    pub fn recompute_digest(&self) -> Result<ContentDigest, DigestError> {
        ContentDigest::compute(&self.content, &self.metadata)
    }

    /// Check the recorded digest against a fresh recomputation.
    ///
    /// # Errors
    /// Returns error if metadata canonicalization fails
    pub fn verify(&self) -> Result<bool, DigestError> {
        Ok(self.digest == self.recompute_digest()?)
    }
}

/// Caller-supplied inputs for one new version.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    /// Owning item
    pub item_id: ItemId,
    /// Document title
    pub title: String,
    /// Full content body
    pub content: String,
    /// Metadata snapshot
    pub metadata: ContentMetadata,
    /// Acting identity
    pub author: UserId,
    /// Required description of the change
    pub change_description: String,
}

/// Assembles immutable versions from caller inputs
///
/// Wires version numbering and digesting, validates required fields, and
/// stamps identity and creation time. Stateless; all functions are pure
/// apart from id/timestamp generation.
#[derive(Debug)]
pub struct VersionFactory;

impl VersionFactory {
    /// Build the first version of a new item.
    ///
    /// Number `1.0`, change kind `created`, no previous version.
    ///
    /// # Errors
    /// Returns error if a required field is empty or digesting fails
    pub fn first(spec: VersionSpec) -> Result<ContentVersion, VersionError> {
        Self::build(spec, VersionNumber::INITIAL, ChangeKind::Created, None)
    }

    /// Build the version following `previous` for the same item.
    ///
    /// Bumps the number (minor or major), resets status to draft, and
    /// records the supersession link. A change that leaves title and
    /// content untouched is tagged `metadata_updated`, otherwise `edited`.
    ///
    /// # Errors
    /// Returns error if a required field is empty or digesting fails
    pub fn derived(
        previous: &ContentVersion,
        spec: VersionSpec,
        minor: bool,
    ) -> Result<ContentVersion, VersionError> {
        let kind = if spec.title == previous.title
            && spec.content == previous.content
            && spec.metadata != previous.metadata
        {
            ChangeKind::MetadataUpdated
        } else {
            ChangeKind::Edited
        };
        Self::build(spec, previous.number.bump(minor), kind, Some(previous.id))
    }

    /// Build a new draft copying an older version's title, content and
    /// metadata.
    ///
    /// A restore is a major bump: reverting live content is a significant
    /// change. The new version supersedes `current`, not `source`.
    ///
    /// # Errors
    /// Returns error if digesting fails
    pub fn restored(
        source: &ContentVersion,
        current: &ContentVersion,
        author: UserId,
    ) -> Result<ContentVersion, VersionError> {
        let spec = VersionSpec {
            item_id: current.item_id,
            title: source.title.clone(),
            content: source.content.clone(),
            metadata: source.metadata.clone(),
            author,
            change_description: format!("Restored content from version {}", source.number),
        };
        Self::build(
            spec,
            current.number.bump(false),
            ChangeKind::Restored,
            Some(current.id),
        )
    }

    fn build(
        spec: VersionSpec,
        number: VersionNumber,
        change_kind: ChangeKind,
        previous_version_id: Option<VersionId>,
    ) -> Result<ContentVersion, VersionError> {
        if spec.title.trim().is_empty() {
            return Err(VersionError::EmptyField("title"));
        }
        if spec.change_description.trim().is_empty() {
            return Err(VersionError::EmptyField("change_description"));
        }
        let digest = ContentDigest::compute(&spec.content, &spec.metadata)?;
        Ok(ContentVersion {
            id: VersionId::new(),
            number,
            item_id: spec.item_id,
            title: spec.title,
            content: spec.content,
            metadata: spec.metadata,
            status: WorkflowStatus::Draft,
            created_at: Utc::now(),
            created_by: spec.author,
            change_description: spec.change_description,
            change_kind,
            previous_version_id,
            approval: None,
            digest,
        })
    }
}

/// Errors raised while assembling a version
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    /// A required field was empty or whitespace
    #[error("required field is empty: {0}")]
    EmptyField(&'static str),

    /// Digest computation failed
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    /// Version number derivation failed
    #[error("numbering error: {0}")]
    Numbering(#[from] NumberingError),
}
