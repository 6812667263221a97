use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vmf_inventory::{InventoryError, ObjectKind, ObjectRef, TaskHandle};

/// One stored inventory object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: ObjectKind,
    pub name: String,
    /// Object id of the parent; `None` for datacenters.
    pub parent: Option<String>,
}

/// Serializable inventory contents.
///
/// Keyed by object id so iteration (and therefore child listing) is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub next_id: u64,
    pub objects: BTreeMap<String, Node>,
}

/// Operation selector for fault injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    ResolvePath,
    ResolveReference,
    CreateChildFolder,
    GetProperties,
    ListChildren,
    Rename,
    MoveInto,
    Destroy,
}

/// Where an injected fault fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultStage {
    /// The request itself is rejected.
    Submit,
    /// The request is accepted but its task fails when awaited.
    Task,
}

#[derive(Clone, Debug)]
pub(crate) struct InjectedFault {
    pub op: Op,
    pub stage: FaultStage,
    pub error: InventoryError,
}

/// Journal entry for every client call, in call order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    ResolvePath(String),
    ResolveReference(ObjectRef),
    CreateChildFolder { parent: ObjectRef, name: String },
    GetProperties(ObjectRef),
    ListChildren(ObjectRef),
    Rename { target: ObjectRef, name: String },
    MoveInto { parent: ObjectRef, children: Vec<ObjectRef> },
    Destroy(ObjectRef),
    AwaitTask(TaskHandle),
}

impl Call {
    /// `true` for calls that change (or request a change to) the inventory.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::CreateChildFolder { .. }
                | Call::Rename { .. }
                | Call::MoveInto { .. }
                | Call::Destroy(_)
        )
    }
}

/// Change recorded at submission and applied when the task is awaited.
#[derive(Clone, Debug)]
pub(crate) enum PendingChange {
    Rename { target: String, name: String },
    Move { parent: String, children: Vec<String> },
    Destroy { target: String },
}

#[derive(Clone, Debug)]
pub(crate) struct PendingTask {
    pub change: PendingChange,
    pub fault: Option<InventoryError>,
}
