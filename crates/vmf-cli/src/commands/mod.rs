//! Command handler modules for the `vmf` binary.
//!
//! Shared helpers used by several commands live here.

pub mod inventory;
pub mod reconcile;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use vmf_config::{DriverConfig, LoadedConfig};
use vmf_folder::CallContext;
use vmf_inventory_memory::MemoryInventory;

pub fn load_config(paths: &[String]) -> Result<(LoadedConfig, DriverConfig)> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = vmf_config::load_layered_yaml(&path_refs)?;
    let cfg = DriverConfig::from_loaded(&loaded)?;
    Ok((loaded, cfg))
}

pub fn load_inventory(path: &Path) -> Result<MemoryInventory> {
    let raw = fs::read_to_string(path).with_context(|| {
        format!(
            "failed to read inventory file: {} (create one with `vmf inventory init`)",
            path.display()
        )
    })?;
    MemoryInventory::from_json(&raw)
        .with_context(|| format!("inventory file is not a valid snapshot: {}", path.display()))
}

pub fn save_inventory(inv: &MemoryInventory, path: &Path) -> Result<()> {
    let raw = inv.to_json().context("inventory serialize failed")?;
    fs::write(path, raw)
        .with_context(|| format!("failed to write inventory file: {}", path.display()))
}

/// Fresh context per driver call; the configured timeout bounds each call
/// separately.
pub fn call_context(cfg: &DriverConfig) -> CallContext {
    match cfg.call_timeout {
        Some(timeout) => CallContext::with_timeout(timeout),
        None => CallContext::background(),
    }
}
