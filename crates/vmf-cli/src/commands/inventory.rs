//! `vmf inventory ...`: seed and inspect an inventory snapshot file.

use anyhow::{bail, Context, Result};
use std::path::Path;
use vmf_inventory_memory::MemoryInventory;

use super::{load_inventory, save_inventory};

pub struct InitArgs<'a> {
    pub datacenters: &'a [String],
    pub folders: &'a [String],
    pub vms: &'a [String],
    pub out: &'a Path,
    pub force: bool,
}

pub fn init(args: InitArgs<'_>) -> Result<()> {
    if args.out.exists() && !args.force {
        bail!(
            "REFUSING INIT: {} already exists. Re-run with --force to overwrite.",
            args.out.display()
        );
    }

    let inv = MemoryInventory::new();
    for dc in args.datacenters {
        inv.add_datacenter(dc);
    }
    for path in args.folders {
        inv.ensure_folder(path)
            .with_context(|| format!("cannot seed folder {path}"))?;
    }
    for vm in args.vms {
        place_vm(&inv, vm)?;
    }

    save_inventory(&inv, args.out)?;
    println!("inventory_written=true path={}", args.out.display());
    Ok(())
}

/// Out-of-band change: drop a virtual machine into an existing folder.
pub fn add_vm(path: &Path, vm: &str) -> Result<()> {
    let inv = load_inventory(path)?;
    place_vm(&inv, vm)?;
    save_inventory(&inv, path)?;
    println!("vm_added=true path={vm}");
    Ok(())
}

fn place_vm(inv: &MemoryInventory, vm: &str) -> Result<()> {
    let Some((folder, name)) = vm.rsplit_once('/') else {
        bail!("expected <folder path>/<name>, got '{vm}'");
    };
    inv.add_vm(folder, name)
        .with_context(|| format!("cannot place vm {vm}"))?;
    Ok(())
}

pub fn tree(path: &Path) -> Result<()> {
    let inv = load_inventory(path)?;
    for p in inv.folder_paths() {
        println!("{p}");
    }
    Ok(())
}
