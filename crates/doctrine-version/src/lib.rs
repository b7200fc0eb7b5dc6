//! Doctrine Version System
//!
//! Immutable, digest-verified content versions with deterministic
//! numbering and positional diffs.
//!
//! # Core Concepts
//!
//! - [`ContentVersion`]: an immutable snapshot of a document's title,
//!   content and metadata
//! - [`VersionFactory`]: the only way versions come into existence;
//!   wires numbering, digesting and validation
//! - [`ContentDigest`]: short deterministic checksum over
//!   `(content, metadata)` for drift detection
//! - [`VersionNumber`]: strict `major.minor` labels
//! - [`DiffEngine`]: positional (not minimal-edit) content and metadata
//!   comparison
//!
//! # Example
//!
//! ```rust,ignore
//! use doctrine_version::{VersionFactory, VersionSpec, DiffEngine};
//!
//! let first = VersionFactory::first(spec)?;
//! let second = VersionFactory::derived(&first, edited_spec, true)?;
//! let diff = DiffEngine::compare(&first, &second)?;
//! ```

#![warn(unreachable_pub)]

mod diff;
mod digest;
mod ids;
mod metadata;
mod numbering;
mod version;

pub use diff::{DiffEngine, DiffError, FieldChange, VersionDiff};
pub use digest::{ContentDigest, DigestError, DIGEST_LEN};
pub use ids::{ItemId, UserId, VersionId};
pub use metadata::{ContentMetadata, SecurityLevel};
pub use numbering::{NumberingError, VersionNumber};
pub use version::{
    Approval, ChangeKind, ContentVersion, VersionError, VersionFactory, VersionSpec,
    WorkflowStatus,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
