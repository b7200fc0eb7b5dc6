//! Append-only audit trail of repository mutations.

use chrono::{DateTime, Utc};
use doctrine_version::{ItemId, UserId, VersionId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One recorded repository mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the operation completed
    pub at: DateTime<Utc>,
    /// Acting identity
    pub actor: UserId,
    /// Item the operation touched
    pub item_id: ItemId,
    /// Version the operation touched, when applicable
    pub version_id: Option<VersionId>,
    /// Operation name (e.g. "create_version", "publish", "lock")
    pub action: String,
    /// Human-readable outcome summary
    pub detail: String,
}

/// In-memory append-only event log. Entries are never updated or removed.
#[derive(Debug, Default)]
pub struct AuditLog {
    inner: Mutex<Vec<AuditEvent>>,
}

impl AuditLog {
    pub(crate) fn record(
        &self,
        actor: &UserId,
        item_id: ItemId,
        version_id: Option<VersionId>,
        action: &str,
        detail: impl Into<String>,
    ) {
        self.inner.lock().push(AuditEvent {
            at: Utc::now(),
            actor: actor.clone(),
            item_id,
            version_id,
            action: action.to_string(),
            detail: detail.into(),
        });
    }

    /// Snapshot of all recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.inner.lock().clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_append_in_order() {
        let log = AuditLog::default();
        let actor = UserId::new("sgt.mills");
        let item = ItemId::new();
        log.record(&actor, item, None, "create_item", "first");
        log.record(&actor, item, None, "lock", "second");

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, "create_item");
        assert_eq!(events[1].action, "lock");
        assert!(!log.is_empty());
    }
}
