//! Inventory client trait.
//!
//! Declared `pub` so external crates can provide implementations (live,
//! in-memory, recording), while the reconciler depends only on this contract.

use async_trait::async_trait;

use crate::{EntityProperties, InventoryError, ObjectRef, Resolved, TaskHandle};

type Result<T> = std::result::Result<T, InventoryError>;

/// Remote inventory operations consumed by the folder reconciler.
///
/// Implementations must be `Send + Sync` so a reconciler can be shared across
/// async task boundaries. Rename, move and destroy are long-running: they
/// return a [`TaskHandle`] that must be passed to [`InventoryClient::await_task`]
/// before the change is known to have happened.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Locate an object by inventory path, e.g. `DC1/vm/eng`.
    async fn resolve_path(&self, path: &str) -> Result<Resolved>;

    /// Locate an object by reference.
    async fn resolve_reference(&self, reference: &ObjectRef) -> Result<Resolved>;

    /// Create a folder named `name` directly under `parent`.
    async fn create_child_folder(&self, parent: &ObjectRef, name: &str) -> Result<ObjectRef>;

    /// Fetch the `name` and `parent` properties of an entity.
    async fn get_properties(&self, reference: &ObjectRef) -> Result<EntityProperties>;

    /// Direct children of a folder.
    async fn list_children(&self, reference: &ObjectRef) -> Result<Vec<ObjectRef>>;

    async fn rename(&self, reference: &ObjectRef, new_name: &str) -> Result<TaskHandle>;

    /// Move `children` under `parent`.
    async fn move_into(&self, parent: &ObjectRef, children: &[ObjectRef]) -> Result<TaskHandle>;

    async fn destroy(&self, reference: &ObjectRef) -> Result<TaskHandle>;

    /// Block until the task completes. A task may fail even though its
    /// submission was accepted.
    async fn await_task(&self, task: &TaskHandle) -> Result<()>;
}
