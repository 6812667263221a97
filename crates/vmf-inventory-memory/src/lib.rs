//! Deterministic in-memory inventory.
//!
//! Design decisions (kept simple and deterministic):
//! - Object ids come from one counter: `datacenter-N`, `group-vN` for
//!   folders, `vm-N` for virtual machines, `task-N` for tasks.
//! - Every datacenter owns exactly one `vm` root folder.
//! - Rename, move and destroy only record the change at submission; the
//!   change is applied when the task is awaited, so a task can fail after
//!   its request was accepted.
//! - Destroy removes the whole subtree, as the real inventory does.
//! - Every client call is journaled before fault checks run.
//!
//! Used by the reconciler's scenario tests and by the CLI harness, which
//! persists the contents as JSON between invocations.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;
use vmf_inventory::{
    faults, EntityProperties, InventoryClient, InventoryError, ObjectKind, ObjectRef, Resolved,
    TaskHandle,
};

mod tree;
pub mod types;

pub use types::{Call, FaultStage, InventorySnapshot, Node, Op};
use types::{InjectedFault, PendingChange, PendingTask};

type Result<T> = std::result::Result<T, InventoryError>;

#[derive(Debug, Default)]
struct State {
    inv: InventorySnapshot,
    tasks: BTreeMap<String, PendingTask>,
    next_task: u64,
    journal: Vec<Call>,
    faults: Vec<InjectedFault>,
    hang_tasks: bool,
}

impl State {
    fn take_fault(&mut self, op: Op, stage: FaultStage) -> Option<InventoryError> {
        let idx = self
            .faults
            .iter()
            .position(|f| f.op == op && f.stage == stage)?;
        Some(self.faults.remove(idx).error)
    }

    fn check(&mut self, op: Op) -> Result<()> {
        match self.take_fault(op, FaultStage::Submit) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn existing(&self, reference: &ObjectRef) -> Result<()> {
        if self.inv.objects.contains_key(&reference.value) {
            Ok(())
        } else {
            Err(InventoryError::NotFound(reference.to_string()))
        }
    }

    fn submit(&mut self, op: Op, change: PendingChange) -> TaskHandle {
        self.next_task += 1;
        let id = format!("task-{}", self.next_task);
        let fault = self.take_fault(op, FaultStage::Task);
        self.tasks.insert(id.clone(), PendingTask { change, fault });
        TaskHandle::new(id)
    }

    fn apply(&mut self, task: &TaskHandle, change: PendingChange) -> Result<()> {
        let failed = |fault: &str, message: String| InventoryError::TaskFailed {
            task: task.to_string(),
            message: format!("{fault}: {message}"),
        };

        match change {
            PendingChange::Rename { target, name } => {
                let parent = match self.inv.objects.get(&target) {
                    Some(node) => node.parent.clone(),
                    None => {
                        return Err(failed(
                            faults::INVALID_STATE,
                            format!("object {target} no longer exists"),
                        ))
                    }
                };
                if let Some(other) = self.inv.child_named(parent.as_deref(), &name) {
                    if other != target {
                        return Err(failed(
                            faults::DUPLICATE_NAME,
                            format!("name '{name}' already exists"),
                        ));
                    }
                }
                if let Some(node) = self.inv.objects.get_mut(&target) {
                    node.name = name;
                }
            }

            PendingChange::Move { parent, children } => {
                if !self.inv.is_folder(&parent) {
                    return Err(failed(
                        faults::INVALID_STATE,
                        format!("destination {parent} is not a folder"),
                    ));
                }
                for child in &children {
                    let Some(node) = self.inv.objects.get(child) else {
                        return Err(failed(
                            faults::INVALID_STATE,
                            format!("object {child} no longer exists"),
                        ));
                    };
                    if self.inv.is_within(&parent, child) {
                        return Err(failed(
                            faults::INVALID_ARGUMENT,
                            format!("cannot move {child} into itself or its descendant"),
                        ));
                    }
                    if let Some(other) = self.inv.child_named(Some(&parent), &node.name) {
                        if &other != child {
                            return Err(failed(
                                faults::DUPLICATE_NAME,
                                format!("name '{}' already exists in destination", node.name),
                            ));
                        }
                    }
                }
                for child in children {
                    if let Some(node) = self.inv.objects.get_mut(&child) {
                        node.parent = Some(parent.clone());
                    }
                }
            }

            PendingChange::Destroy { target } => {
                if !self.inv.objects.contains_key(&target) {
                    return Err(failed(
                        faults::INVALID_STATE,
                        format!("object {target} no longer exists"),
                    ));
                }
                self.inv.remove_subtree(&target);
            }
        }
        Ok(())
    }
}

/// In-memory [`InventoryClient`].
#[derive(Debug, Default)]
pub struct MemoryInventory {
    state: Mutex<State>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(inv: InventorySnapshot) -> Self {
        Self {
            state: Mutex::new(State {
                inv,
                ..State::default()
            }),
        }
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        Ok(Self::from_snapshot(serde_json::from_str(raw)?))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        self.state().inv.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // Poisoning only follows a panic in another test thread; the data is
        // still consistent because no critical section panics midway.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -----------------------------------------------------------------------
    // Setup helpers (out-of-band changes; never journaled)
    // -----------------------------------------------------------------------

    /// Add a datacenter with its `vm` root folder. Returns the root folder.
    /// Idempotent by name.
    pub fn add_datacenter(&self, name: &str) -> ObjectRef {
        let mut st = self.state();
        let dc = match st.inv.child_named(None, name) {
            Some(id) => id,
            None => {
                let id = st.inv.allocate("datacenter-");
                st.inv.insert(id.clone(), ObjectKind::Datacenter, name, None);
                id
            }
        };
        let root = match st.inv.child_named(Some(&dc), "vm") {
            Some(id) => id,
            None => {
                let id = st.inv.allocate("group-v");
                st.inv.insert(id.clone(), ObjectKind::Folder, "vm", Some(&dc));
                id
            }
        };
        ObjectRef::folder(root)
    }

    /// Create every missing folder along `path` (e.g. `DC1/vm/eng/ci`).
    /// The datacenter and its `vm` folder must already exist.
    pub fn ensure_folder(&self, path: &str) -> Result<ObjectRef> {
        let mut st = self.state();
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let dc_name = segments
            .next()
            .ok_or_else(|| InventoryError::NotFound(path.to_string()))?;
        let mut current = st
            .inv
            .child_named(None, dc_name)
            .ok_or_else(|| InventoryError::NotFound(path.to_string()))?;
        for seg in segments {
            current = match st.inv.child_named(Some(&current), seg) {
                Some(id) if st.inv.is_folder(&id) => id,
                Some(id) => {
                    return Err(InventoryError::rejected(
                        faults::INVALID_ARGUMENT,
                        format!("{id} at '{seg}' is not a folder"),
                    ))
                }
                None => {
                    let id = st.inv.allocate("group-v");
                    st.inv
                        .insert(id.clone(), ObjectKind::Folder, seg, Some(&current));
                    id
                }
            };
        }
        Ok(ObjectRef::folder(current))
    }

    /// Place a virtual machine into an existing folder.
    pub fn add_vm(&self, folder_path: &str, name: &str) -> Result<ObjectRef> {
        let mut st = self.state();
        let parent = st
            .inv
            .find_path(folder_path)
            .filter(|id| st.inv.is_folder(id))
            .ok_or_else(|| InventoryError::NotFound(folder_path.to_string()))?;
        let id = st.inv.allocate("vm-");
        st.inv
            .insert(id.clone(), ObjectKind::VirtualMachine, name, Some(&parent));
        Ok(ObjectRef::new(ObjectKind::VirtualMachine, id))
    }

    /// Delete an object and its subtree out of band. Returns `false` if the
    /// object did not exist.
    pub fn remove(&self, reference: &ObjectRef) -> bool {
        let mut st = self.state();
        if !st.inv.objects.contains_key(&reference.value) {
            return false;
        }
        st.inv.remove_subtree(&reference.value);
        true
    }

    pub fn find(&self, path: &str) -> Option<ObjectRef> {
        let st = self.state();
        st.inv.find_path(path).and_then(|id| st.inv.reference(&id))
    }

    pub fn path_of(&self, reference: &ObjectRef) -> Option<String> {
        self.state().inv.path_of(&reference.value)
    }

    /// Absolute paths of every folder, sorted.
    pub fn folder_paths(&self) -> Vec<String> {
        let st = self.state();
        let mut out: Vec<String> = st
            .inv
            .objects
            .iter()
            .filter(|(_, n)| n.kind == ObjectKind::Folder)
            .filter_map(|(id, _)| st.inv.path_of(id))
            .collect();
        out.sort();
        out
    }

    // -----------------------------------------------------------------------
    // Fault injection + journal
    // -----------------------------------------------------------------------

    /// Reject the next `op` request with `error`.
    pub fn fail_next(&self, op: Op, error: InventoryError) {
        self.state().faults.push(InjectedFault {
            op,
            stage: FaultStage::Submit,
            error,
        });
    }

    /// Accept the next `op` request but fail its task with `error`.
    pub fn fail_next_task(&self, op: Op, error: InventoryError) {
        self.state().faults.push(InjectedFault {
            op,
            stage: FaultStage::Task,
            error,
        });
    }

    /// When set, `await_task` never completes.
    pub fn set_hang_tasks(&self, hang: bool) {
        self.state().hang_tasks = hang;
    }

    pub fn journal(&self) -> Vec<Call> {
        self.state().journal.clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.state()
            .journal
            .iter()
            .filter(|c| c.is_mutating())
            .cloned()
            .collect()
    }

    pub fn clear_journal(&self) {
        self.state().journal.clear();
    }
}

#[async_trait]
impl InventoryClient for MemoryInventory {
    async fn resolve_path(&self, path: &str) -> Result<Resolved> {
        let mut st = self.state();
        st.journal.push(Call::ResolvePath(path.to_string()));
        st.check(Op::ResolvePath)?;
        debug!(path, "memory inventory: resolve_path");
        Ok(match st.inv.find_path(path) {
            Some(id) => st.inv.resolve(&id),
            None => Resolved::NotFound,
        })
    }

    async fn resolve_reference(&self, reference: &ObjectRef) -> Result<Resolved> {
        let mut st = self.state();
        st.journal.push(Call::ResolveReference(reference.clone()));
        st.check(Op::ResolveReference)?;
        debug!(%reference, "memory inventory: resolve_reference");
        Ok(st.inv.resolve(&reference.value))
    }

    async fn create_child_folder(&self, parent: &ObjectRef, name: &str) -> Result<ObjectRef> {
        let mut st = self.state();
        st.journal.push(Call::CreateChildFolder {
            parent: parent.clone(),
            name: name.to_string(),
        });
        st.check(Op::CreateChildFolder)?;
        st.existing(parent)?;
        if !st.inv.is_folder(&parent.value) {
            return Err(InventoryError::rejected(
                faults::NOT_SUPPORTED,
                format!("{parent} is not a folder"),
            ));
        }
        if name.is_empty() {
            return Err(InventoryError::rejected(
                faults::INVALID_ARGUMENT,
                "folder name must not be empty",
            ));
        }
        if st.inv.child_named(Some(&parent.value), name).is_some() {
            return Err(InventoryError::rejected(
                faults::DUPLICATE_NAME,
                format!("name '{name}' already exists"),
            ));
        }
        let id = st.inv.allocate("group-v");
        st.inv
            .insert(id.clone(), ObjectKind::Folder, name, Some(&parent.value));
        debug!(%parent, name, folder = %id, "memory inventory: folder created");
        Ok(ObjectRef::folder(id))
    }

    async fn get_properties(&self, reference: &ObjectRef) -> Result<EntityProperties> {
        let mut st = self.state();
        st.journal.push(Call::GetProperties(reference.clone()));
        st.check(Op::GetProperties)?;
        let node = st
            .inv
            .objects
            .get(&reference.value)
            .ok_or_else(|| InventoryError::NotFound(reference.to_string()))?;
        Ok(EntityProperties {
            name: node.name.clone(),
            parent: node.parent.as_deref().and_then(|p| st.inv.reference(p)),
        })
    }

    async fn list_children(&self, reference: &ObjectRef) -> Result<Vec<ObjectRef>> {
        let mut st = self.state();
        st.journal.push(Call::ListChildren(reference.clone()));
        st.check(Op::ListChildren)?;
        st.existing(reference)?;
        Ok(st
            .inv
            .children_of(&reference.value)
            .iter()
            .filter_map(|id| st.inv.reference(id))
            .collect())
    }

    async fn rename(&self, reference: &ObjectRef, new_name: &str) -> Result<TaskHandle> {
        let mut st = self.state();
        st.journal.push(Call::Rename {
            target: reference.clone(),
            name: new_name.to_string(),
        });
        st.check(Op::Rename)?;
        st.existing(reference)?;
        Ok(st.submit(
            Op::Rename,
            PendingChange::Rename {
                target: reference.value.clone(),
                name: new_name.to_string(),
            },
        ))
    }

    async fn move_into(&self, parent: &ObjectRef, children: &[ObjectRef]) -> Result<TaskHandle> {
        let mut st = self.state();
        st.journal.push(Call::MoveInto {
            parent: parent.clone(),
            children: children.to_vec(),
        });
        st.check(Op::MoveInto)?;
        st.existing(parent)?;
        for child in children {
            st.existing(child)?;
        }
        Ok(st.submit(
            Op::MoveInto,
            PendingChange::Move {
                parent: parent.value.clone(),
                children: children.iter().map(|c| c.value.clone()).collect(),
            },
        ))
    }

    async fn destroy(&self, reference: &ObjectRef) -> Result<TaskHandle> {
        let mut st = self.state();
        st.journal.push(Call::Destroy(reference.clone()));
        st.check(Op::Destroy)?;
        st.existing(reference)?;
        Ok(st.submit(
            Op::Destroy,
            PendingChange::Destroy {
                target: reference.value.clone(),
            },
        ))
    }

    async fn await_task(&self, task: &TaskHandle) -> Result<()> {
        let hang = {
            let mut st = self.state();
            st.journal.push(Call::AwaitTask(task.clone()));
            st.hang_tasks
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let mut st = self.state();
        let pending = st
            .tasks
            .remove(task.id())
            .ok_or_else(|| InventoryError::NotFound(task.to_string()))?;
        if let Some(err) = pending.fault {
            return Err(err);
        }
        st.apply(task, pending.change)?;
        debug!(%task, "memory inventory: task completed");
        Ok(())
    }
}
