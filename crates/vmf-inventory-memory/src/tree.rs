//! Tree navigation over [`InventorySnapshot`].

use vmf_inventory::{FolderObject, ObjectKind, ObjectRef, Resolved};

use crate::types::{InventorySnapshot, Node};

impl InventorySnapshot {
    pub(crate) fn allocate(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    pub(crate) fn insert(&mut self, id: String, kind: ObjectKind, name: &str, parent: Option<&str>) {
        self.objects.insert(
            id,
            Node {
                kind,
                name: name.to_string(),
                parent: parent.map(str::to_string),
            },
        );
    }

    pub fn reference(&self, id: &str) -> Option<ObjectRef> {
        self.objects
            .get(id)
            .map(|n| ObjectRef::new(n.kind.clone(), id))
    }

    /// Absolute inventory path of an object, e.g. `/DC1/vm/eng`.
    pub fn path_of(&self, id: &str) -> Option<String> {
        let mut names: Vec<&str> = Vec::new();
        let mut cursor = Some(id);
        // Bounded walk: a corrupted snapshot with a parent cycle must not spin.
        for _ in 0..=self.objects.len() {
            let Some(cur) = cursor else {
                names.reverse();
                return Some(format!("/{}", names.join("/")));
            };
            let node = self.objects.get(cur)?;
            names.push(node.name.as_str());
            cursor = node.parent.as_deref();
        }
        None
    }

    pub(crate) fn child_named(&self, parent: Option<&str>, name: &str) -> Option<String> {
        self.objects
            .iter()
            .find(|(_, n)| n.parent.as_deref() == parent && n.name == name)
            .map(|(id, _)| id.clone())
    }

    pub(crate) fn children_of(&self, id: &str) -> Vec<String> {
        self.objects
            .iter()
            .filter(|(_, n)| n.parent.as_deref() == Some(id))
            .map(|(cid, _)| cid.clone())
            .collect()
    }

    /// Locate an object by slash-delimited path. Leading, trailing and
    /// repeated slashes are ignored.
    pub fn find_path(&self, path: &str) -> Option<String> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let mut current = self.child_named(None, segments.next()?)?;
        for seg in segments {
            current = self.child_named(Some(&current), seg)?;
        }
        Some(current)
    }

    /// `true` if `id` is `ancestor` or lies beneath it.
    pub(crate) fn is_within(&self, id: &str, ancestor: &str) -> bool {
        let mut cursor = Some(id);
        for _ in 0..=self.objects.len() {
            match cursor {
                Some(cur) if cur == ancestor => return true,
                Some(cur) => cursor = self.objects.get(cur).and_then(|n| n.parent.as_deref()),
                None => return false,
            }
        }
        false
    }

    pub(crate) fn remove_subtree(&mut self, id: &str) {
        for child in self.children_of(id) {
            self.remove_subtree(&child);
        }
        self.objects.remove(id);
    }

    pub(crate) fn resolve(&self, id: &str) -> Resolved {
        let Some(node) = self.objects.get(id) else {
            return Resolved::NotFound;
        };
        let reference = ObjectRef::new(node.kind.clone(), id);
        match node.kind {
            ObjectKind::Folder => match self.path_of(id) {
                Some(inventory_path) => Resolved::Folder(FolderObject {
                    reference,
                    inventory_path,
                }),
                None => Resolved::NotFound,
            },
            _ => Resolved::Other(reference),
        }
    }

    pub(crate) fn is_folder(&self, id: &str) -> bool {
        self.objects
            .get(id)
            .is_some_and(|n| n.kind == ObjectKind::Folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InventorySnapshot {
        let mut inv = InventorySnapshot::default();
        inv.insert("datacenter-1".into(), ObjectKind::Datacenter, "DC1", None);
        inv.insert("group-v2".into(), ObjectKind::Folder, "vm", Some("datacenter-1"));
        inv.insert("group-v3".into(), ObjectKind::Folder, "eng", Some("group-v2"));
        inv.insert("vm-4".into(), ObjectKind::VirtualMachine, "web01", Some("group-v3"));
        inv.next_id = 4;
        inv
    }

    #[test]
    fn path_of_joins_names_from_root() {
        let inv = sample();
        assert_eq!(inv.path_of("group-v3").as_deref(), Some("/DC1/vm/eng"));
        assert_eq!(inv.path_of("datacenter-1").as_deref(), Some("/DC1"));
        assert_eq!(inv.path_of("missing"), None);
    }

    #[test]
    fn find_path_ignores_surrounding_slashes() {
        let inv = sample();
        assert_eq!(inv.find_path("DC1/vm/eng").as_deref(), Some("group-v3"));
        assert_eq!(inv.find_path("/DC1/vm/eng/").as_deref(), Some("group-v3"));
        assert_eq!(inv.find_path("DC1/vm/ops"), None);
        assert_eq!(inv.find_path(""), None);
    }

    #[test]
    fn is_within_covers_self_and_descendants() {
        let inv = sample();
        assert!(inv.is_within("group-v3", "group-v3"));
        assert!(inv.is_within("vm-4", "group-v2"));
        assert!(!inv.is_within("group-v2", "group-v3"));
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let mut inv = sample();
        inv.remove_subtree("group-v3");
        assert!(!inv.objects.contains_key("group-v3"));
        assert!(!inv.objects.contains_key("vm-4"));
        assert!(inv.objects.contains_key("group-v2"));
    }

    #[test]
    fn cyclic_parent_chain_does_not_hang() {
        let mut inv = sample();
        inv.objects.get_mut("group-v2").unwrap().parent = Some("group-v3".into());
        assert_eq!(inv.path_of("group-v3"), None);
        assert!(!inv.is_within("group-v3", "datacenter-1"));
    }
}
