use std::fmt;

use serde::{Deserialize, Serialize};
use vmf_inventory::ObjectRef;

/// Persisted identity of a managed folder: the inventory's object id
/// (e.g. `group-v1042`).
///
/// Stable across renames and moves. The orchestration runtime stores it as
/// an opaque string; an empty token means "no identity".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderIdentity(String);

impl FolderIdentity {
    /// Parse a persisted token. Blank tokens carry no identity.
    pub fn from_token(token: &str) -> Option<Self> {
        let t = token.trim();
        if t.is_empty() {
            None
        } else {
            Some(Self(t.to_string()))
        }
    }

    pub fn from_reference(reference: &ObjectRef) -> Self {
        Self(reference.value.clone())
    }

    /// Reference used for every lookup. The type is asserted as `Folder`;
    /// the inventory reports what the object really is on resolution.
    pub fn to_reference(&self) -> ObjectRef {
        ObjectRef::folder(self.0.as_str())
    }

    pub fn as_token(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmf_inventory::ObjectKind;

    #[test]
    fn blank_token_is_no_identity() {
        assert_eq!(FolderIdentity::from_token(""), None);
        assert_eq!(FolderIdentity::from_token("   "), None);
    }

    #[test]
    fn token_maps_to_folder_reference() {
        let id = FolderIdentity::from_token("group-v42").unwrap();
        let r = id.to_reference();
        assert_eq!(r.kind, ObjectKind::Folder);
        assert_eq!(r.value, "group-v42");
        assert_eq!(FolderIdentity::from_reference(&r), id);
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = FolderIdentity::from_token("group-v7").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"group-v7\"");
    }
}
