//! vmf-folder
//!
//! Lifecycle driver for one resource kind: a VM folder in a virtualization
//! inventory. Given a declarative [`FolderSpec`] it creates, reads, updates
//! and deletes the remote folder through an [`vmf_inventory::InventoryClient`].
//!
//! Architectural decisions:
//! - The only state carried between calls is the [`FolderIdentity`] token;
//!   every read/update/delete re-resolves it first.
//! - An identity that no longer resolves means "absent", not an error.
//! - Update applies name before parent and reports each field separately;
//!   a failed step is never rolled back.
//! - Delete refuses non-empty folders.
//! - Deadlines and cancellation come from an explicit [`CallContext`].
//!
//! Sequential per call. No retries, no locking.

mod context;
mod error;
mod guard;
mod identity;
pub mod path;
mod reconciler;
mod spec;

pub use context::CallContext;
pub use error::{FolderError, UpdateFailure};
pub use guard::ensure_empty;
pub use identity::FolderIdentity;
pub use reconciler::{
    DeleteOutcome, FieldStatus, FolderReconciler, ReadOutcome, UpdateOutcome, UpdateReport,
};
pub use spec::{drift, Field, FieldChanges, FieldDrift, FolderSpec};
