//! The [`ContentItem`] aggregate: a document's identity, its current
//! version, and its full version history.

use crate::lock::LockState;
use chrono::{DateTime, Utc};
use doctrine_version::{ContentVersion, ItemId, UserId, VersionId, WorkflowStatus};
use serde::{Deserialize, Serialize};

/// A long-lived document owning a linear version history
///
/// # Invariants
/// - `history` never contains the version referenced by `current`
/// - `history` is ordered newest-first
/// - at most one version across `current` + `history` is `published`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Item identifier
    pub id: ItemId,
    /// The materialized current version
    pub current: ContentVersion,
    /// Superseded versions, newest-first
    pub history: Vec<ContentVersion>,
    /// Item creation time (time of the first version)
    pub created_at: DateTime<Utc>,
    /// Item creator
    pub created_by: UserId,
    /// Cooperative edit lock
    pub lock: LockState,
}

impl ContentItem {
    /// Id of the current version.
    #[inline]
    #[must_use]
    pub fn current_version_id(&self) -> VersionId {
        self.current.id
    }

    /// Look up a version by id across current and history.
    #[must_use]
    pub fn find_version(&self, id: VersionId) -> Option<&ContentVersion> {
        self.versions().find(|v| v.id == id)
    }

    pub(crate) fn find_version_mut(&mut self, id: VersionId) -> Option<&mut ContentVersion> {
        self.versions_mut().find(|v| v.id == id)
    }

    /// All versions, current first, then history newest-first.
    pub fn versions(&self) -> impl Iterator<Item = &ContentVersion> {
        std::iter::once(&self.current).chain(self.history.iter())
    }

    pub(crate) fn versions_mut(&mut self) -> impl Iterator<Item = &mut ContentVersion> {
        std::iter::once(&mut self.current).chain(self.history.iter_mut())
    }

    /// The published version of this item, if it has one.
    #[must_use]
    pub fn published_version(&self) -> Option<&ContentVersion> {
        self.versions().find(|v| v.status == WorkflowStatus::Published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctrine_version::{
        ContentMetadata, SecurityLevel, VersionFactory, VersionSpec,
    };

    fn item() -> ContentItem {
        let item_id = ItemId::new();
        let creator = UserId::new("sgt.mills");
        let current = VersionFactory::first(VersionSpec {
            item_id,
            title: "Gun Drill SOP".to_string(),
            content: "1.\n2.\n3.".to_string(),
            metadata: ContentMetadata::new("gunnery", SecurityLevel::Restricted),
            author: creator.clone(),
            change_description: "Initial draft".to_string(),
        })
        .unwrap();
        ContentItem {
            id: item_id,
            created_at: current.created_at,
            created_by: creator,
            current,
            history: Vec::new(),
            lock: LockState::unlocked(),
        }
    }

    #[test]
    fn find_version_covers_current_and_history() {
        let mut item = item();
        let old = item.current.clone();
        let next = VersionFactory::derived(
            &old,
            VersionSpec {
                item_id: item.id,
                title: old.title.clone(),
                content: "revised".to_string(),
                metadata: old.metadata.clone(),
                author: item.created_by.clone(),
                change_description: "Revision".to_string(),
            },
            true,
        )
        .unwrap();
        item.history.insert(0, std::mem::replace(&mut item.current, next));

        assert!(item.find_version(item.current_version_id()).is_some());
        assert!(item.find_version(old.id).is_some());
        assert!(item.find_version(VersionId::new()).is_none());
    }

    #[test]
    fn published_version_lookup() {
        let mut item = item();
        assert!(item.published_version().is_none());
        item.current.status = WorkflowStatus::Published;
        assert_eq!(item.published_version().unwrap().id, item.current.id);
    }
}
