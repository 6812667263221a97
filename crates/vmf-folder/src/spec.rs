use serde::{Deserialize, Serialize};

use crate::path::normalize_parent;
use crate::FolderError;

/// Declarative description of one folder.
///
/// `datacenter` is fixed at creation; `parent` and `name` may change.
/// `parent` is relative to the datacenter's `vm` folder and kept in canonical
/// form (see [`crate::path::normalize_parent`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSpec {
    pub datacenter: String,
    pub parent: String,
    pub name: String,
}

impl FolderSpec {
    pub fn new(datacenter: impl Into<String>, parent: &str, name: impl Into<String>) -> Self {
        Self {
            datacenter: datacenter.into(),
            parent: normalize_parent(parent),
            name: name.into(),
        }
    }

    /// Same spec with `parent` re-normalized. Needed when the value was
    /// built by struct literal or deserialized.
    pub fn normalized(&self) -> Self {
        Self {
            parent: normalize_parent(&self.parent),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), FolderError> {
        if self.datacenter.trim().is_empty() {
            return Err(FolderError::InvalidSpec("datacenter must not be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(FolderError::InvalidSpec("name must not be empty".into()));
        }
        if self.name.contains('/') {
            return Err(FolderError::InvalidSpec(format!(
                "name '{}' must not contain '/'",
                self.name
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Datacenter,
    Parent,
    Name,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Datacenter => "datacenter",
            Field::Parent => "parent",
            Field::Name => "name",
        }
    }
}

/// One field that differs between two specs.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldDrift {
    pub field: Field,
    pub from: String,
    pub to: String,
}

/// Field-by-field differences from `from` to `to`, compared in canonical
/// form. Ordered datacenter, parent, name.
pub fn drift(from: &FolderSpec, to: &FolderSpec) -> Vec<FieldDrift> {
    let from = from.normalized();
    let to = to.normalized();
    let mut out = Vec::new();

    let mut push = |field: Field, a: &str, b: &str| {
        if a != b {
            out.push(FieldDrift {
                field,
                from: a.to_string(),
                to: b.to_string(),
            });
        }
    };

    push(Field::Datacenter, &from.datacenter, &to.datacenter);
    push(Field::Parent, &from.parent, &to.parent);
    push(Field::Name, &from.name, &to.name);
    out
}

/// Which fields changed between two specs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldChanges {
    pub datacenter: bool,
    pub parent: bool,
    pub name: bool,
}

impl FieldChanges {
    pub fn between(old: &FolderSpec, new: &FolderSpec) -> Self {
        let mut changes = Self::default();
        for d in drift(old, new) {
            match d.field {
                Field::Datacenter => changes.datacenter = true,
                Field::Parent => changes.parent = true,
                Field::Name => changes.name = true,
            }
        }
        changes
    }

    /// `true` if a field that update can apply in place changed.
    pub fn any_mutable(&self) -> bool {
        self.parent || self.name
    }

    pub fn any(&self) -> bool {
        self.datacenter || self.any_mutable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_parent() {
        let s = FolderSpec::new("DC1", "eng/ci/", "build");
        assert_eq!(s.parent, "/eng/ci");
    }

    #[test]
    fn validate_rejects_blank_and_slashed_names() {
        assert!(FolderSpec::new("DC1", "/", "build").validate().is_ok());
        assert!(FolderSpec::new("", "/", "build").validate().is_err());
        assert!(FolderSpec::new("DC1", "/", " ").validate().is_err());
        assert!(FolderSpec::new("DC1", "/", "a/b").validate().is_err());
    }

    #[test]
    fn unnormalized_parent_is_not_drift() {
        let a = FolderSpec::new("DC1", "/eng", "build");
        let b = FolderSpec {
            parent: "eng/".to_string(),
            ..a.clone()
        };
        assert!(drift(&a, &b).is_empty());
        assert!(!FieldChanges::between(&a, &b).any());
    }

    #[test]
    fn drift_lists_each_changed_field() {
        let a = FolderSpec::new("DC1", "/eng", "build");
        let b = FolderSpec::new("DC2", "/eng/ci", "build");
        let d = drift(&a, &b);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].field, Field::Datacenter);
        assert_eq!(d[1].field, Field::Parent);
        assert_eq!(d[1].from, "/eng");
        assert_eq!(d[1].to, "/eng/ci");

        let c = FieldChanges::between(&a, &b);
        assert!(c.datacenter && c.parent && !c.name);
        assert!(c.any_mutable());
    }
}
