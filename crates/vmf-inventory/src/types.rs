use std::fmt;

use serde::{Deserialize, Serialize};

/// Managed object type as reported by the inventory.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Folder,
    Datacenter,
    VirtualMachine,
    /// Any other managed object type, carried verbatim.
    Other(String),
}

impl ObjectKind {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectKind::Folder => "Folder",
            ObjectKind::Datacenter => "Datacenter",
            ObjectKind::VirtualMachine => "VirtualMachine",
            ObjectKind::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Folder" => ObjectKind::Folder,
            "Datacenter" => ObjectKind::Datacenter,
            "VirtualMachine" => ObjectKind::VirtualMachine,
            other => ObjectKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle identifying one inventory object, independent of its path.
///
/// `kind` is what the caller *claims* the object is; the inventory decides
/// what it actually is when the reference is resolved.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub value: String,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn folder(value: impl Into<String>) -> Self {
        Self::new(ObjectKind::Folder, value)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

/// A live folder located in the inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderObject {
    pub reference: ObjectRef,
    /// Absolute inventory path, e.g. `/DC1/vm/eng`.
    pub inventory_path: String,
}

/// Typed result of resolving a path or a reference.
///
/// Narrowing to "is this a folder" happens here, inside the resolution call,
/// so callers never downcast a generic object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    Folder(FolderObject),
    /// The object exists but is not a folder.
    Other(ObjectRef),
    NotFound,
}

impl Resolved {
    pub fn into_folder(self) -> Option<FolderObject> {
        match self {
            Resolved::Folder(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolved::NotFound)
    }
}

/// Properties fetched for a managed entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityProperties {
    pub name: String,
    /// `None` only for inventory roots.
    pub parent: Option<ObjectRef>,
}

/// Handle to an in-flight long-running remote task.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskHandle(pub String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ref_display_is_kind_colon_value() {
        let r = ObjectRef::folder("group-v12");
        assert_eq!(r.to_string(), "Folder:group-v12");
    }

    #[test]
    fn object_kind_parse_round_trips_known_and_unknown() {
        for k in ["Folder", "Datacenter", "VirtualMachine", "ResourcePool"] {
            assert_eq!(ObjectKind::parse(k).as_str(), k);
        }
        assert_eq!(
            ObjectKind::parse("ResourcePool"),
            ObjectKind::Other("ResourcePool".to_string())
        );
    }

    #[test]
    fn resolved_into_folder_only_for_folder_variant() {
        let f = FolderObject {
            reference: ObjectRef::folder("group-v1"),
            inventory_path: "/DC1/vm".to_string(),
        };
        assert_eq!(Resolved::Folder(f.clone()).into_folder(), Some(f));
        assert_eq!(
            Resolved::Other(ObjectRef::new(ObjectKind::VirtualMachine, "vm-3")).into_folder(),
            None
        );
        assert!(Resolved::NotFound.is_not_found());
    }
}
