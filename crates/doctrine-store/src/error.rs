//! Error taxonomy for repository operations.
//!
//! Not-found and conflict conditions are expected, caller-recoverable
//! results. Integrity failures indicate storage corruption and are the
//! one class the engine refuses to recover from.

use crate::lock::LockError;
use doctrine_version::{
    ContentDigest, DiffError, DigestError, ItemId, UserId, VersionError, VersionId,
};
use doctrine_workflow::WorkflowError;

/// Failures surfaced by [`crate::ContentRepository`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unknown item id
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// Version id absent from the addressed item
    #[error("version not found: {0}")]
    VersionNotFound(VersionId),

    /// A mutating operation hit a lock held by another user
    #[error("item {item} is locked by {holder}")]
    ItemLocked {
        /// The locked item
        item: ItemId,
        /// The lock holder
        holder: UserId,
    },

    /// Lock acquire/release failed
    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    /// Workflow transition rejected
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Version assembly rejected
    #[error("version error: {0}")]
    Version(#[from] VersionError),

    /// Diff computation failed
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    /// Digest recomputation failed
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    /// A stored version's digest no longer matches its content:
    /// corruption or tampering, never silently repaired
    #[error(
        "integrity mismatch on version {version}: recorded {recorded}, computed {computed}"
    )]
    IntegrityMismatch {
        /// The corrupt version
        version: VersionId,
        /// Digest recorded at creation
        recorded: ContentDigest,
        /// Digest recomputed from stored content
        computed: ContentDigest,
    },
}

impl StoreError {
    /// Item or version absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound(_) | Self::VersionNotFound(_))
    }

    /// Lock contention or an illegal workflow transition.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ItemLocked { .. }
                | Self::Lock(_)
                | Self::Workflow(
                    WorkflowError::InvalidTransition { .. } | WorkflowError::SelfApproval { .. }
                )
        )
    }

    /// Malformed or missing caller input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Version(_)
                | Self::Workflow(
                    WorkflowError::MissingChangeDescription
                        | WorkflowError::MissingRejectionReason
                )
        )
    }

    /// Storage corruption detected.
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::IntegrityMismatch { .. } | Self::Digest(_))
    }

    /// Everything except integrity failures is recoverable by the caller.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !self.is_integrity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctrine_version::WorkflowStatus;

    #[test]
    fn classification() {
        assert!(StoreError::ItemNotFound(ItemId::new()).is_not_found());
        assert!(StoreError::Workflow(WorkflowError::InvalidTransition {
            from: WorkflowStatus::Draft,
            to: WorkflowStatus::Published,
        })
        .is_conflict());
        assert!(StoreError::Workflow(WorkflowError::MissingChangeDescription).is_validation());
        assert!(StoreError::Version(VersionError::EmptyField("title")).is_validation());
    }

    #[test]
    fn integrity_failures_are_not_recoverable() {
        let err = StoreError::IntegrityMismatch {
            version: VersionId::new(),
            recorded: ContentDigest::new([0; 8]),
            computed: ContentDigest::new([1; 8]),
        };
        assert!(err.is_integrity());
        assert!(!err.is_recoverable());

        assert!(StoreError::ItemNotFound(ItemId::new()).is_recoverable());
        assert!(StoreError::Lock(LockError::NotLockHolder { holder: None }).is_recoverable());
    }
}
