//! Create / read / update / delete for one folder.
//!
//! Each operation is a short, strictly sequential chain of inventory calls.
//! Nothing is cached between calls: the identity is re-resolved every time.

use tracing::{debug, info, warn};
use vmf_inventory::{FolderObject, InventoryClient, InventoryError, ObjectRef, Resolved};

use crate::path::{to_declarative, to_fully_qualified};
use crate::spec::FieldChanges;
use crate::{ensure_empty, CallContext, FolderError, FolderIdentity, FolderSpec, UpdateFailure};

/// Result of [`FolderReconciler::read`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The folder exists; observed fields in declarative form.
    Present(FolderSpec),
    /// The identity no longer resolves. The caller clears it and recreates.
    Absent,
}

impl ReadOutcome {
    pub fn is_absent(&self) -> bool {
        matches!(self, ReadOutcome::Absent)
    }
}

/// Outcome of one mutable field during an update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldStatus {
    /// Field did not change; nothing was sent.
    #[default]
    Unchanged,
    Applied,
    Failed,
    /// Field changed but an earlier step failed, so it was not attempted.
    Skipped,
}

/// Per-field record of what an update did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub name: FieldStatus,
    pub parent: FieldStatus,
}

impl UpdateReport {
    fn pending(changes: &FieldChanges) -> Self {
        let status = |changed: bool| {
            if changed {
                FieldStatus::Skipped
            } else {
                FieldStatus::Unchanged
            }
        };
        Self {
            name: status(changes.name),
            parent: status(changes.parent),
        }
    }

    /// `true` if nothing was sent because nothing changed.
    pub fn is_noop(&self) -> bool {
        self.name == FieldStatus::Unchanged && self.parent == FieldStatus::Unchanged
    }
}

/// Result of a successful [`FolderReconciler::update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(UpdateReport),
    /// The identity no longer resolves; nothing was changed.
    Absent,
}

/// Result of [`FolderReconciler::delete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The identity did not resolve; treated as already converged.
    AlreadyAbsent,
}

/// Folder lifecycle driver over an inventory client.
#[derive(Debug)]
pub struct FolderReconciler<C> {
    client: C,
}

impl<C: InventoryClient> FolderReconciler<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Hand the client back once the reconciler is done with it.
    pub fn into_client(self) -> C {
        self.client
    }

    /// Create the folder described by `spec` under its existing parent.
    ///
    /// Missing ancestors are not created.
    pub async fn create(
        &self,
        ctx: &CallContext,
        spec: &FolderSpec,
    ) -> Result<FolderIdentity, FolderError> {
        let spec = spec.normalized();
        spec.validate()?;

        let parent = self.locate_parent(ctx, &spec).await?;
        let created = ctx
            .run(self.client.create_child_folder(&parent.reference, &spec.name))
            .await
            .map_err(FolderError::CreateFailed)?;

        let identity = FolderIdentity::from_reference(&created);
        info!(
            identity = %identity,
            datacenter = %spec.datacenter,
            parent = %spec.parent,
            name = %spec.name,
            "folder created"
        );
        Ok(identity)
    }

    /// Observe the folder's current name and parent.
    ///
    /// Read-only. `datacenter` is the one the folder was declared in; the
    /// observed parent path is expressed relative to it.
    pub async fn read(
        &self,
        ctx: &CallContext,
        identity: &FolderIdentity,
        datacenter: &str,
    ) -> Result<ReadOutcome, FolderError> {
        let Some(folder) = self
            .resolve_identity(ctx, identity, FolderError::ReadFailed)
            .await?
        else {
            warn!(identity = %identity, "folder no longer exists; reporting absent");
            return Ok(ReadOutcome::Absent);
        };

        let props = ctx
            .run(self.client.get_properties(&folder.reference))
            .await
            .map_err(FolderError::ReadFailed)?;
        let parent_ref = props.parent.ok_or_else(|| {
            FolderError::ReadFailed(InventoryError::NotFound(format!(
                "parent of {}",
                folder.reference
            )))
        })?;

        let parent = match ctx
            .run(self.client.resolve_reference(&parent_ref))
            .await
            .map_err(FolderError::ReadFailed)?
        {
            Resolved::Folder(f) => f,
            Resolved::Other(r) => return Err(not_a_folder(&r)),
            Resolved::NotFound => {
                return Err(FolderError::ReadFailed(InventoryError::NotFound(
                    parent_ref.to_string(),
                )))
            }
        };

        let parent_path = to_declarative(&parent.inventory_path, datacenter).ok_or_else(|| {
            FolderError::OutsideDatacenter {
                path: parent.inventory_path.clone(),
                datacenter: datacenter.to_string(),
            }
        })?;

        debug!(identity = %identity, parent = %parent_path, name = %props.name, "folder read");
        Ok(ReadOutcome::Present(FolderSpec {
            datacenter: datacenter.to_string(),
            parent: parent_path,
            name: props.name,
        }))
    }

    /// Converge name and parent from `old` to `new`, name first.
    ///
    /// A field that did not change sends nothing. When a step fails the
    /// earlier steps stay applied and the failure carries the report.
    pub async fn update(
        &self,
        ctx: &CallContext,
        identity: &FolderIdentity,
        old: &FolderSpec,
        new: &FolderSpec,
    ) -> Result<UpdateOutcome, UpdateFailure> {
        let new = new.normalized();
        let changes = FieldChanges::between(old, &new);
        let mut report = UpdateReport::pending(&changes);

        if let Err(error) = new.validate() {
            return Err(UpdateFailure { report, error });
        }
        if changes.datacenter {
            return Err(UpdateFailure {
                report,
                error: FolderError::DatacenterChanged {
                    from: old.datacenter.clone(),
                    to: new.datacenter.clone(),
                },
            });
        }
        if !changes.any_mutable() {
            debug!(identity = %identity, "folder update: nothing changed");
            return Ok(UpdateOutcome::Updated(report));
        }

        let lookup_failed: fn(InventoryError) -> FolderError = if changes.name {
            FolderError::RenameFailed
        } else {
            FolderError::MoveFailed
        };
        let folder = match self.resolve_identity(ctx, identity, lookup_failed).await {
            Ok(Some(folder)) => folder,
            Ok(None) => {
                warn!(identity = %identity, "folder no longer exists; nothing to update");
                return Ok(UpdateOutcome::Absent);
            }
            Err(error) => return Err(UpdateFailure { report, error }),
        };

        if changes.name {
            match self.rename(ctx, &folder.reference, &new.name).await {
                Ok(()) => report.name = FieldStatus::Applied,
                Err(error) => {
                    report.name = FieldStatus::Failed;
                    return Err(UpdateFailure { report, error });
                }
            }
        }

        if changes.parent {
            match self.relocate(ctx, &folder.reference, &new).await {
                Ok(()) => report.parent = FieldStatus::Applied,
                Err(error) => {
                    report.parent = FieldStatus::Failed;
                    return Err(UpdateFailure { report, error });
                }
            }
        }

        Ok(UpdateOutcome::Updated(report))
    }

    /// Destroy the folder if, and only if, it is empty.
    pub async fn delete(
        &self,
        ctx: &CallContext,
        identity: &FolderIdentity,
    ) -> Result<DeleteOutcome, FolderError> {
        let Some(folder) = self
            .resolve_identity(ctx, identity, FolderError::DeleteFailed)
            .await?
        else {
            info!(identity = %identity, "folder already absent; delete is a no-op");
            return Ok(DeleteOutcome::AlreadyAbsent);
        };

        let children = ctx
            .run(self.client.list_children(&folder.reference))
            .await
            .map_err(FolderError::DeleteFailed)?;
        ensure_empty(&folder.reference, &children)?;

        let task = ctx
            .run(self.client.destroy(&folder.reference))
            .await
            .map_err(FolderError::DeleteFailed)?;
        ctx.run(self.client.await_task(&task))
            .await
            .map_err(FolderError::DeleteFailed)?;

        info!(identity = %identity, path = %folder.inventory_path, "folder deleted");
        Ok(DeleteOutcome::Deleted)
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    async fn locate_parent(
        &self,
        ctx: &CallContext,
        spec: &FolderSpec,
    ) -> Result<FolderObject, FolderError> {
        let path = to_fully_qualified(&spec.datacenter, &spec.parent);
        debug!(path = %path, "locating parent folder");
        match ctx.run(self.client.resolve_path(&path)).await {
            Ok(Resolved::Folder(f)) => Ok(f),
            Ok(Resolved::Other(r)) => {
                warn!(path = %path, object = %r, "parent path is not a folder");
                Err(FolderError::ParentNotFound { path })
            }
            Ok(Resolved::NotFound) => Err(FolderError::ParentNotFound { path }),
            Err(source) => Err(FolderError::ParentLookupFailed { path, source }),
        }
    }

    /// Resolve the persisted identity. `Ok(None)` means the object is gone.
    async fn resolve_identity(
        &self,
        ctx: &CallContext,
        identity: &FolderIdentity,
        wrap: fn(InventoryError) -> FolderError,
    ) -> Result<Option<FolderObject>, FolderError> {
        let reference = identity.to_reference();
        match ctx
            .run(self.client.resolve_reference(&reference))
            .await
            .map_err(wrap)?
        {
            Resolved::Folder(f) => Ok(Some(f)),
            Resolved::Other(r) => Err(not_a_folder(&r)),
            Resolved::NotFound => Ok(None),
        }
    }

    async fn rename(
        &self,
        ctx: &CallContext,
        folder: &ObjectRef,
        name: &str,
    ) -> Result<(), FolderError> {
        let task = ctx
            .run(self.client.rename(folder, name))
            .await
            .map_err(FolderError::RenameFailed)?;
        ctx.run(self.client.await_task(&task))
            .await
            .map_err(FolderError::RenameFailed)?;
        info!(folder = %folder, name, "folder renamed");
        Ok(())
    }

    async fn relocate(
        &self,
        ctx: &CallContext,
        folder: &ObjectRef,
        spec: &FolderSpec,
    ) -> Result<(), FolderError> {
        // A failed lookup of the new parent is part of the move.
        let parent = match self.locate_parent(ctx, spec).await {
            Err(FolderError::ParentLookupFailed { source, .. }) => {
                return Err(FolderError::MoveFailed(source))
            }
            other => other?,
        };
        let task = ctx
            .run(
                self.client
                    .move_into(&parent.reference, std::slice::from_ref(folder)),
            )
            .await
            .map_err(FolderError::MoveFailed)?;
        ctx.run(self.client.await_task(&task))
            .await
            .map_err(FolderError::MoveFailed)?;
        info!(folder = %folder, parent = %spec.parent, "folder moved");
        Ok(())
    }
}

fn not_a_folder(r: &ObjectRef) -> FolderError {
    FolderError::NotAFolder {
        reference: r.value.clone(),
        actual: r.kind.to_string(),
    }
}
