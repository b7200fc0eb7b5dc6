//! Status workflow for content versions.
//!
//! A version advances `draft -> pending_review -> approved -> published
//! -> archived`, with a rejection path back to draft and a `superseded`
//! state reachable only as the side effect of another version of the same
//! item being published. All transition rules live here; callers never
//! write the status field directly.

use chrono::Utc;
use doctrine_version::{Approval, ContentVersion, UserId, WorkflowStatus};

/// States a version in `from` may legally move to.
#[must_use]
pub fn allowed_transitions(from: WorkflowStatus) -> Vec<WorkflowStatus> {
    use WorkflowStatus::*;
    match from {
        Draft => vec![PendingReview, Archived],
        PendingReview => vec![Approved, Draft, Archived],
        Approved => vec![Published, Archived],
        Published => vec![Archived],
        Superseded => vec![Archived],
        Archived => vec![],
    }
}

/// Validates a state transition against the table above.
///
/// # Errors
/// Returns [`WorkflowError::InvalidTransition`] for any pair not in the
/// table. `superseded` is never a valid target here; it is entered only
/// through [`supersede`].
pub fn validate_transition(
    from: WorkflowStatus,
    to: WorkflowStatus,
) -> Result<(), WorkflowError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidTransition { from, to })
    }
}

/// What the caller must do after a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The version was published: any previously published version of the
    /// same item must be marked superseded by the repository.
    pub supersedes_previous: bool,
}

/// Apply a guarded transition to a version.
///
/// Guards, per target:
/// - `pending_review`: the version must carry a non-empty change
///   description
/// - `approved`: `actor` must differ from the version's creator
///   (four-eyes); the approval record is stamped
/// - `draft` (rejection): `note` must carry a non-empty reason
/// - `published`: no guard here; the item-level lock check is the
///   repository's responsibility, which also honors the returned
///   [`TransitionOutcome`]
/// - `archived`: explicit administrative action, no guard
///
/// Authorization beyond the four-eyes rule is supplied by the caller's
/// auth system; `actor` is taken at face value.
///
/// # Errors
/// Returns [`WorkflowError::InvalidTransition`] for a pair outside the
/// table, or the specific guard failure
pub fn apply(
    version: &mut ContentVersion,
    target: WorkflowStatus,
    actor: &UserId,
    note: Option<&str>,
) -> Result<TransitionOutcome, WorkflowError> {
    let from = version.status;
    validate_transition(from, target)?;

    let mut outcome = TransitionOutcome {
        supersedes_previous: false,
    };
    match (from, target) {
        (WorkflowStatus::Draft, WorkflowStatus::PendingReview) => {
            if version.change_description.trim().is_empty() {
                return Err(WorkflowError::MissingChangeDescription);
            }
        }
        (WorkflowStatus::PendingReview, WorkflowStatus::Approved) => {
            if *actor == version.created_by {
                return Err(WorkflowError::SelfApproval {
                    actor: actor.clone(),
                });
            }
            version.approval = Some(Approval {
                approved_by: actor.clone(),
                approved_at: Utc::now(),
            });
        }
        (WorkflowStatus::PendingReview, WorkflowStatus::Draft) => {
            let reason = note.map(str::trim).unwrap_or_default();
            if reason.is_empty() {
                return Err(WorkflowError::MissingRejectionReason);
            }
            tracing::info!(
                version = %version.id,
                rejected_by = %actor,
                reason,
                "version sent back for revision"
            );
        }
        (WorkflowStatus::Approved, WorkflowStatus::Published) => {
            outcome.supersedes_previous = true;
        }
        _ => {}
    }

    version.status = target;
    tracing::debug!(version = %version.id, %from, to = %target, actor = %actor, "status transition");
    Ok(outcome)
}

/// Retire a previously published version because a newer version of the
/// same item was published. Returns whether the status changed.
///
/// This is the only way a version enters `superseded`.
pub fn supersede(version: &mut ContentVersion) -> bool {
    if version.status == WorkflowStatus::Published {
        version.status = WorkflowStatus::Superseded;
        tracing::debug!(version = %version.id, "published version superseded");
        true
    } else {
        false
    }
}

/// Errors raised by the workflow state machine
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Transition pair not in the table
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: WorkflowStatus,
        /// Requested status
        to: WorkflowStatus,
    },

    /// Four-eyes rule: creator cannot approve their own version
    #[error("approver {actor} is the version's creator")]
    SelfApproval {
        /// The rejected approver identity
        actor: UserId,
    },

    /// Submission for review requires a change description
    #[error("change description is required to submit for review")]
    MissingChangeDescription,

    /// Rejection requires a reason
    #[error("a rejection reason is required to send back for revision")]
    MissingRejectionReason,
}
