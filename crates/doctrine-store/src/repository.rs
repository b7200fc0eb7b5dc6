//! The content repository: aggregate root and public surface of the
//! engine.
//!
//! Items live in a concurrent map; a mutation holds the item's map entry
//! exclusively for its whole duration, so operations on the same item are
//! serialized while different items proceed fully in parallel. Every
//! operation validates and assembles before touching item state, leaving
//! the item unchanged on failure.

use crate::audit::{AuditEvent, AuditLog};
use crate::error::StoreError;
use crate::item::ContentItem;
use crate::lock::LockState;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use doctrine_version::{
    ContentMetadata, ContentVersion, DiffEngine, ItemId, UserId, VersionDiff, VersionFactory,
    VersionId, VersionSpec, WorkflowStatus,
};

/// Repository configuration
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfig {
    /// Identity allowed to release any lock (administrative override)
    pub admin_override: Option<UserId>,
    /// When set, a lock older than this is treated as released; the
    /// default (`None`) keeps locks alive until explicitly released
    pub lock_ttl: Option<Duration>,
}

/// Caller-supplied fields for a new item or version.
#[derive(Debug, Clone)]
pub struct ContentDraft {
    /// Document title
    pub title: String,
    /// Full plain-text content body
    pub content: String,
    /// Metadata snapshot
    pub metadata: ContentMetadata,
    /// Required description of the change
    pub change_description: String,
}

/// Owns all content items and exposes the engine's operations
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug, Default)]
pub struct ContentRepository {
    config: RepositoryConfig,
    items: DashMap<ItemId, ContentItem>,
    version_index: DashMap<VersionId, ItemId>,
    audit: AuditLog,
}

impl ContentRepository {
    /// Create an empty repository with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty repository with custom configuration.
    #[must_use]
    pub fn with_config(config: RepositoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a new item together with its first version (`1.0`, draft).
    ///
    /// # Errors
    /// Returns a validation error if a required field is empty
    pub fn create_item(
        &self,
        draft: ContentDraft,
        creator: UserId,
    ) -> Result<ContentItem, StoreError> {
        let item_id = ItemId::new();
        let version = VersionFactory::first(VersionSpec {
            item_id,
            title: draft.title,
            content: draft.content,
            metadata: draft.metadata,
            author: creator.clone(),
            change_description: draft.change_description,
        })?;

        let item = ContentItem {
            id: item_id,
            created_at: version.created_at,
            created_by: creator.clone(),
            current: version,
            history: Vec::new(),
            lock: LockState::unlocked(),
        };
        self.version_index.insert(item.current.id, item_id);
        self.items.insert(item_id, item.clone());

        tracing::info!(item = %item_id, version = %item.current.id, title = %item.current.title, "item created");
        self.audit.record(
            &creator,
            item_id,
            Some(item.current.id),
            "create_item",
            format!("created with version {}", item.current.number),
        );
        Ok(item)
    }

    /// Create the next version of an item and make it current.
    ///
    /// The previous current version moves to the head of history; the new
    /// version starts over as a draft.
    ///
    /// # Errors
    /// `ItemNotFound` for an unknown id, `ItemLocked` if another user
    /// holds the lock, or a validation error from version assembly
    pub fn create_version(
        &self,
        item_id: ItemId,
        draft: ContentDraft,
        editor: UserId,
        minor: bool,
    ) -> Result<ContentVersion, StoreError> {
        let mut entry = self
            .items
            .get_mut(&item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        let item = entry.value_mut();
        self.ensure_unlocked_for(item, &editor)?;

        let version = VersionFactory::derived(
            &item.current,
            VersionSpec {
                item_id,
                title: draft.title,
                content: draft.content,
                metadata: draft.metadata,
                author: editor.clone(),
                change_description: draft.change_description,
            },
            minor,
        )?;

        self.version_index.insert(version.id, item_id);
        let previous = std::mem::replace(&mut item.current, version.clone());
        item.history.insert(0, previous);

        tracing::info!(item = %item_id, version = %version.id, number = %version.number, editor = %editor, "version created");
        self.audit.record(
            &editor,
            item_id,
            Some(version.id),
            "create_version",
            format!("version {} ({})", version.number, version.change_kind),
        );
        Ok(version)
    }

    /// Move a version to `target` status.
    ///
    /// Delegates guard evaluation to the workflow state machine. On a
    /// successful publish, the item's previously published version (if
    /// any) becomes superseded; no other version changes status.
    ///
    /// # Errors
    /// `VersionNotFound`, `ItemLocked` (lock held by another user),
    /// or a workflow rejection (`InvalidTransition`, four-eyes, missing
    /// description/reason)
    pub fn transition(
        &self,
        version_id: VersionId,
        target: WorkflowStatus,
        actor: UserId,
        note: Option<&str>,
    ) -> Result<ContentVersion, StoreError> {
        let item_id = *self
            .version_index
            .get(&version_id)
            .ok_or(StoreError::VersionNotFound(version_id))?;
        let mut entry = self
            .items
            .get_mut(&item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        let item = entry.value_mut();
        self.ensure_unlocked_for(item, &actor)?;

        let (outcome, updated) = {
            let version = item
                .find_version_mut(version_id)
                .ok_or(StoreError::VersionNotFound(version_id))?;
            let outcome = doctrine_workflow::apply(version, target, &actor, note)?;
            (outcome, version.clone())
        };

        if outcome.supersedes_previous {
            for version in item.versions_mut() {
                if version.id != version_id {
                    doctrine_workflow::supersede(version);
                }
            }
        }

        tracing::info!(item = %item_id, version = %version_id, status = %target, actor = %actor, "status transition");
        self.audit.record(
            &actor,
            item_id,
            Some(version_id),
            "transition",
            format!("-> {target}"),
        );
        Ok(updated)
    }

    /// Create a new draft version copying an older version's content
    /// (major bump, change kind `restored`).
    ///
    /// # Errors
    /// `ItemNotFound`, `VersionNotFound`, or `ItemLocked`
    pub fn restore(
        &self,
        item_id: ItemId,
        source_id: VersionId,
        editor: UserId,
    ) -> Result<ContentVersion, StoreError> {
        let mut entry = self
            .items
            .get_mut(&item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        let item = entry.value_mut();
        self.ensure_unlocked_for(item, &editor)?;

        let source = item
            .find_version(source_id)
            .ok_or(StoreError::VersionNotFound(source_id))?
            .clone();
        let version = VersionFactory::restored(&source, &item.current, editor.clone())?;

        self.version_index.insert(version.id, item_id);
        let previous = std::mem::replace(&mut item.current, version.clone());
        item.history.insert(0, previous);

        tracing::info!(item = %item_id, version = %version.id, source = %source_id, "version restored");
        self.audit.record(
            &editor,
            item_id,
            Some(version.id),
            "restore",
            format!("restored from version {}", source.number),
        );
        Ok(version)
    }

    /// Archive the item's current version (terminal administrative
    /// action). The item and its history persist as an audit record.
    ///
    /// # Errors
    /// `ItemNotFound`, `ItemLocked`, or `InvalidTransition` if the
    /// current version is already archived
    pub fn archive_item(
        &self,
        item_id: ItemId,
        actor: UserId,
    ) -> Result<ContentVersion, StoreError> {
        let current_id = {
            let entry = self
                .items
                .get(&item_id)
                .ok_or(StoreError::ItemNotFound(item_id))?;
            entry.current_version_id()
        };
        self.transition(current_id, WorkflowStatus::Archived, actor, None)
    }

    /// Structural difference between two versions of one item, `a`
    /// treated as the baseline.
    ///
    /// # Errors
    /// `ItemNotFound`, or `VersionNotFound` if either id is not in the
    /// item's current + history set
    pub fn diff(
        &self,
        item_id: ItemId,
        a: VersionId,
        b: VersionId,
    ) -> Result<VersionDiff, StoreError> {
        let entry = self
            .items
            .get(&item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        let old = entry
            .find_version(a)
            .ok_or(StoreError::VersionNotFound(a))?;
        let new = entry
            .find_version(b)
            .ok_or(StoreError::VersionNotFound(b))?;
        Ok(DiffEngine::compare(old, new)?)
    }

    /// All versions of an item, newest first by creation time.
    ///
    /// # Errors
    /// `ItemNotFound` for an unknown id
    pub fn history(&self, item_id: ItemId) -> Result<Vec<ContentVersion>, StoreError> {
        let entry = self
            .items
            .get(&item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        let mut versions: Vec<ContentVersion> = entry.versions().cloned().collect();
        versions.sort_by(|a, b| (b.created_at, b.number).cmp(&(a.created_at, a.number)));
        Ok(versions)
    }

    /// Acquire the exclusive edit lock on an item for `user`.
    ///
    /// # Errors
    /// `ItemNotFound` or `AlreadyLocked`
    pub fn lock(&self, item_id: ItemId, user: UserId) -> Result<(), StoreError> {
        let mut entry = self
            .items
            .get_mut(&item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        entry
            .value_mut()
            .lock
            .acquire(&user, Utc::now(), self.config.lock_ttl)?;

        tracing::info!(item = %item_id, user = %user, "item locked");
        self.audit.record(&user, item_id, None, "lock", "acquired");
        Ok(())
    }

    /// Release the edit lock on an item.
    ///
    /// # Errors
    /// `ItemNotFound`, or `NotLockHolder` unless `user` is the holder or
    /// the configured administrative override
    pub fn unlock(&self, item_id: ItemId, user: UserId) -> Result<(), StoreError> {
        let mut entry = self
            .items
            .get_mut(&item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        entry
            .value_mut()
            .lock
            .release(&user, self.config.admin_override.as_ref())?;

        tracing::info!(item = %item_id, user = %user, "item unlocked");
        self.audit.record(&user, item_id, None, "unlock", "released");
        Ok(())
    }

    /// Recompute every stored version's digest and compare against the
    /// recorded one.
    ///
    /// # Errors
    /// `IntegrityMismatch` on the first divergence; corruption is
    /// surfaced, never repaired
    pub fn verify_item(&self, item_id: ItemId) -> Result<(), StoreError> {
        let entry = self
            .items
            .get(&item_id)
            .ok_or(StoreError::ItemNotFound(item_id))?;
        for version in entry.versions() {
            let computed = version.recompute_digest()?;
            if computed != version.digest {
                tracing::warn!(
                    item = %item_id,
                    version = %version.id,
                    recorded = %version.digest,
                    %computed,
                    "integrity mismatch detected"
                );
                return Err(StoreError::IntegrityMismatch {
                    version: version.id,
                    recorded: version.digest,
                    computed,
                });
            }
        }
        Ok(())
    }

    /// Snapshot of an item.
    ///
    /// # Errors
    /// `ItemNotFound` for an unknown id
    pub fn item(&self, item_id: ItemId) -> Result<ContentItem, StoreError> {
        self.items
            .get(&item_id)
            .map(|entry| entry.clone())
            .ok_or(StoreError::ItemNotFound(item_id))
    }

    /// Snapshot of a version, located through the version index.
    ///
    /// # Errors
    /// `VersionNotFound` for an unknown id
    pub fn find_version(&self, version_id: VersionId) -> Result<ContentVersion, StoreError> {
        let item_id = *self
            .version_index
            .get(&version_id)
            .ok_or(StoreError::VersionNotFound(version_id))?;
        let entry = self
            .items
            .get(&item_id)
            .ok_or(StoreError::VersionNotFound(version_id))?;
        entry
            .find_version(version_id)
            .cloned()
            .ok_or(StoreError::VersionNotFound(version_id))
    }

    /// Ids of all items in the repository.
    #[must_use]
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the repository holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Snapshot of the audit trail, oldest first.
    #[must_use]
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit.events()
    }

    fn ensure_unlocked_for(&self, item: &ContentItem, user: &UserId) -> Result<(), StoreError> {
        match item
            .lock
            .blocking_holder(user, Utc::now(), self.config.lock_ttl)
        {
            Some(holder) => Err(StoreError::ItemLocked {
                item: item.id,
                holder,
            }),
            None => Ok(()),
        }
    }
}
