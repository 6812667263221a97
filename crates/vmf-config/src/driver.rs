//! Typed view of the consumed keys.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use vmf_folder::FolderSpec;

use crate::LoadedConfig;

/// One declared folder, keyed by its config key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderDeclaration {
    pub key: String,
    pub spec: FolderSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub default_datacenter: Option<String>,
    /// Deadline placed on each driver call. `None` means no deadline.
    pub call_timeout: Option<Duration>,
    pub folders: BTreeMap<String, FolderDeclaration>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFolder {
    #[serde(default)]
    datacenter: Option<String>,
    #[serde(default = "root_parent")]
    parent: String,
    name: String,
}

fn root_parent() -> String {
    "/".to_string()
}

impl DriverConfig {
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        Self::from_json(&loaded.config_json)
    }

    pub fn from_json(config_json: &Value) -> Result<Self> {
        let default_datacenter = match config_json.pointer("/driver/default_datacenter") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(other) => bail!(
                "driver.default_datacenter must be a non-empty string, got {}",
                other
            ),
        };

        let call_timeout = match config_json.pointer("/driver/call_timeout_secs") {
            None | Some(Value::Null) => None,
            Some(v) => match v.as_u64() {
                Some(0) | None => bail!(
                    "driver.call_timeout_secs must be a positive integer, got {}",
                    v
                ),
                Some(secs) => Some(Duration::from_secs(secs)),
            },
        };

        let raw: BTreeMap<String, Value> = match config_json.pointer("/folders") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(v) => serde_json::from_value(v.clone()).context("invalid folders section")?,
        };

        let mut folders = BTreeMap::new();
        for (key, entry) in raw {
            // The unused-key guard treats /folders as consumed, so misspelled
            // field names are caught here.
            let f: RawFolder = serde_json::from_value(entry)
                .with_context(|| format!("folders.{key}: invalid declaration"))?;
            let datacenter = f
                .datacenter
                .map(|dc| dc.trim().to_string())
                .filter(|dc| !dc.is_empty())
                .or_else(|| default_datacenter.clone())
                .with_context(|| {
                    format!(
                        "folders.{key}: no datacenter given and driver.default_datacenter is not set"
                    )
                })?;
            let spec = FolderSpec::new(datacenter, &f.parent, f.name);
            spec.validate()
                .with_context(|| format!("folders.{key}: invalid declaration"))?;
            folders.insert(key.clone(), FolderDeclaration { key, spec });
        }

        Ok(Self {
            default_datacenter,
            call_timeout,
            folders,
        })
    }
}
