//! Persisted per-resource state: identity plus the last known spec.
//!
//! This is the only thing carried between invocations besides the inventory
//! itself. A missing file is an empty state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use vmf_folder::{FolderIdentity, FolderSpec, UpdateReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    pub identity: FolderIdentity,
    pub spec: FolderSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,
}

impl StateFile {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read state file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("state file is not valid JSON: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("state serialize failed")?;
        fs::write(path, raw)
            .with_context(|| format!("failed to write state file: {}", path.display()))
    }

    /// Record the fields a partially failed update did apply, so the next
    /// plan only carries what is left.
    pub fn record_partial(&mut self, key: &str, target: &FolderSpec, report: &UpdateReport) {
        use vmf_folder::FieldStatus::Applied;

        let Some(res) = self.resources.get_mut(key) else {
            return;
        };
        if report.name == Applied {
            res.spec.name = target.name.clone();
        }
        if report.parent == Applied {
            res.spec.parent = target.parent.clone();
        }
    }
}
