//! Doctrine Content Store
//!
//! The aggregate root of the versioned content engine: owns every
//! [`ContentItem`], serializes same-item mutations, and exposes the
//! create/transition/lock/diff/history operations as the engine's public
//! surface.
//!
//! # Example
//!
//! ```rust,ignore
//! use doctrine_store::{ContentDraft, ContentRepository};
//!
//! let repo = ContentRepository::new();
//! let item = repo.create_item(draft, editor)?;
//! repo.lock(item.id, editor.clone())?;
//! let v2 = repo.create_version(item.id, edited_draft, editor, true)?;
//! ```

#![warn(unreachable_pub)]

mod audit;
mod error;
mod item;
mod lock;
mod repository;

pub use audit::{AuditEvent, AuditLog};
pub use error::StoreError;
pub use item::ContentItem;
pub use lock::{LockError, LockHolder, LockState};
pub use repository::{ContentDraft, ContentRepository, RepositoryConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
