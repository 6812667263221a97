//! Diff refreshed state against declarations and order the resulting actions.
//!
//! Ordering:
//! - create / update / replace run shallowest parent first, so a folder that
//!   is both declared and used as a parent exists before its children need it;
//! - delete runs last and deepest first, after children have moved away.
//!
//! A datacenter change cannot be applied in place; it becomes a replace
//! (delete the old folder, then create the new one).

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use vmf_config::FolderDeclaration;
use vmf_folder::path::to_fully_qualified;
use vmf_folder::{drift, FieldChanges, FolderIdentity, FolderSpec};

use crate::state::StateFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create {
        key: String,
        spec: FolderSpec,
    },
    Update {
        key: String,
        identity: FolderIdentity,
        from: FolderSpec,
        to: FolderSpec,
    },
    Replace {
        key: String,
        identity: FolderIdentity,
        from: FolderSpec,
        to: FolderSpec,
    },
    Delete {
        key: String,
        identity: FolderIdentity,
        spec: FolderSpec,
    },
    NoOp {
        key: String,
    },
}

impl Action {
    pub fn key(&self) -> &str {
        match self {
            Action::Create { key, .. }
            | Action::Update { key, .. }
            | Action::Replace { key, .. }
            | Action::Delete { key, .. }
            | Action::NoOp { key } => key,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Action::Create { .. } => "create",
            Action::Update { .. } => "update",
            Action::Replace { .. } => "replace",
            Action::Delete { .. } => "delete",
            Action::NoOp { .. } => "no-op",
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Action::NoOp { .. })
    }

    /// Depth of the spec that decides ordering: the target for create,
    /// update and replace; the current spec for delete.
    fn depth(&self) -> usize {
        match self {
            Action::Create { spec, .. } | Action::Delete { spec, .. } => depth(spec),
            Action::Update { to, .. } | Action::Replace { to, .. } => depth(to),
            Action::NoOp { .. } => 0,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8} {}", self.verb(), self.key())?;
        match self {
            Action::Create { spec, .. } | Action::Delete { spec, .. } => {
                write!(f, " {}", display_path(spec))
            }
            Action::Update { from, to, .. } => {
                let fields: Vec<String> = drift(from, to)
                    .iter()
                    .map(|d| format!("{}: {} -> {}", d.field.as_str(), d.from, d.to))
                    .collect();
                write!(f, " {}", fields.join("; "))
            }
            Action::Replace { from, to, .. } => {
                write!(f, " {} -> {}", display_path(from), display_path(to))
            }
            Action::NoOp { .. } => Ok(()),
        }
    }
}

/// Actions in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    pub fn build(state: &StateFile, declared: &BTreeMap<String, FolderDeclaration>) -> Self {
        let mut forward: Vec<Action> = Vec::new();
        let mut deletes: Vec<Action> = Vec::new();

        for (key, decl) in declared {
            let action = match state.resources.get(key) {
                None => Action::Create {
                    key: key.clone(),
                    spec: decl.spec.clone(),
                },
                Some(res) => {
                    let changes = FieldChanges::between(&res.spec, &decl.spec);
                    if changes.datacenter {
                        Action::Replace {
                            key: key.clone(),
                            identity: res.identity.clone(),
                            from: res.spec.clone(),
                            to: decl.spec.clone(),
                        }
                    } else if changes.any_mutable() {
                        Action::Update {
                            key: key.clone(),
                            identity: res.identity.clone(),
                            from: res.spec.clone(),
                            to: decl.spec.clone(),
                        }
                    } else {
                        Action::NoOp { key: key.clone() }
                    }
                }
            };
            forward.push(action);
        }

        for (key, res) in &state.resources {
            if !declared.contains_key(key) {
                deletes.push(Action::Delete {
                    key: key.clone(),
                    identity: res.identity.clone(),
                    spec: res.spec.clone(),
                });
            }
        }

        forward.sort_by(|a, b| (a.depth(), a.key()).cmp(&(b.depth(), b.key())));
        deletes.sort_by(|a, b| (Reverse(a.depth()), a.key()).cmp(&(Reverse(b.depth()), b.key())));
        forward.extend(deletes);
        Self { actions: forward }
    }

    pub fn has_changes(&self) -> bool {
        self.actions.iter().any(Action::is_change)
    }

    pub fn summary(&self) -> String {
        let count = |verb: &str| self.actions.iter().filter(|a| a.verb() == verb).count();
        format!(
            "plan: {} to create, {} to update, {} to replace, {} to delete, {} unchanged",
            count("create"),
            count("update"),
            count("replace"),
            count("delete"),
            count("no-op")
        )
    }
}

fn depth(spec: &FolderSpec) -> usize {
    spec.parent.split('/').filter(|s| !s.is_empty()).count()
}

/// Full inventory path of the folder a spec describes, e.g. `DC1/vm/eng/build`.
pub fn display_path(spec: &FolderSpec) -> String {
    format!(
        "{}/{}",
        to_fully_qualified(&spec.datacenter, &spec.parent),
        spec.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ResourceState;

    fn declared(items: &[(&str, FolderSpec)]) -> BTreeMap<String, FolderDeclaration> {
        items
            .iter()
            .map(|(k, s)| {
                (
                    k.to_string(),
                    FolderDeclaration {
                        key: k.to_string(),
                        spec: s.clone(),
                    },
                )
            })
            .collect()
    }

    fn state(items: &[(&str, &str, FolderSpec)]) -> StateFile {
        let mut s = StateFile::default();
        for (k, id, spec) in items {
            s.resources.insert(
                k.to_string(),
                ResourceState {
                    identity: FolderIdentity::from_token(id).unwrap(),
                    spec: spec.clone(),
                },
            );
        }
        s
    }

    #[test]
    fn creates_run_shallowest_first() {
        let plan = Plan::build(
            &StateFile::default(),
            &declared(&[
                ("a_ci", FolderSpec::new("DC1", "/eng/build", "ci")),
                ("b_build", FolderSpec::new("DC1", "/eng", "build")),
                ("c_eng", FolderSpec::new("DC1", "/", "eng")),
            ]),
        );
        let keys: Vec<&str> = plan.actions.iter().map(Action::key).collect();
        assert_eq!(keys, vec!["c_eng", "b_build", "a_ci"]);
    }

    #[test]
    fn deletes_run_last_and_deepest_first() {
        let plan = Plan::build(
            &state(&[
                ("eng", "group-v3", FolderSpec::new("DC1", "/", "eng")),
                ("build", "group-v4", FolderSpec::new("DC1", "/eng", "build")),
                ("ops", "group-v5", FolderSpec::new("DC1", "/", "ops")),
            ]),
            &declared(&[("ops", FolderSpec::new("DC1", "/", "ops"))]),
        );
        let verbs: Vec<(&str, &str)> = plan.actions.iter().map(|a| (a.verb(), a.key())).collect();
        assert_eq!(
            verbs,
            vec![("no-op", "ops"), ("delete", "build"), ("delete", "eng")]
        );
    }

    #[test]
    fn datacenter_change_plans_replace() {
        let plan = Plan::build(
            &state(&[("build", "group-v4", FolderSpec::new("DC1", "/", "build"))]),
            &declared(&[("build", FolderSpec::new("DC2", "/", "build"))]),
        );
        assert!(matches!(plan.actions[0], Action::Replace { .. }));
        assert_eq!(
            plan.actions[0].to_string(),
            "replace  build DC1/vm/build -> DC2/vm/build"
        );
    }

    #[test]
    fn parent_spelling_differences_are_not_changes() {
        let mut decl = declared(&[("build", FolderSpec::new("DC1", "/eng", "build"))]);
        if let Some(d) = decl.get_mut("build") {
            d.spec.parent = "eng/".into();
        }
        let plan = Plan::build(
            &state(&[("build", "group-v4", FolderSpec::new("DC1", "/eng", "build"))]),
            &decl,
        );
        assert!(!plan.has_changes());
    }

    #[test]
    fn update_line_lists_changed_fields() {
        let plan = Plan::build(
            &state(&[("build", "group-v4", FolderSpec::new("DC1", "/eng", "build"))]),
            &declared(&[("build", FolderSpec::new("DC1", "/ops", "deploy"))]),
        );
        assert_eq!(
            plan.actions[0].to_string(),
            "update   build parent: /eng -> /ops; name: build -> deploy"
        );
        assert_eq!(
            plan.summary(),
            "plan: 0 to create, 1 to update, 0 to replace, 0 to delete, 0 unchanged"
        );
    }
}
