use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vmf_config::{report_unused_keys, UnusedKeyPolicy};
use vmf_folder::path::{normalize_parent, to_fully_qualified};

mod commands;
mod plan;
mod state;

use commands::inventory::InitArgs;
use commands::reconcile::ReconcileArgs;

#[derive(Parser)]
#[command(name = "vmf")]
#[command(about = "VM folder lifecycle driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Parse folder declarations and report unused config keys
    Validate {
        #[arg(required = true)]
        paths: Vec<String>,

        /// Treat unused keys as an error
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Print the inventory path used to look up a parent folder
    ResolvePath {
        #[arg(long)]
        datacenter: String,

        /// Parent relative to the datacenter's vm folder ("/" for the root)
        #[arg(long, default_value = "/")]
        parent: String,
    },

    /// Inventory snapshot utilities
    Inventory {
        #[command(subcommand)]
        cmd: InventoryCmd,
    },

    /// Refresh state and print the actions apply would take
    Plan {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        #[arg(long)]
        state: PathBuf,

        #[arg(long)]
        inventory: PathBuf,
    },

    /// Refresh state, then create/update/replace/delete to match config
    Apply {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        #[arg(long)]
        state: PathBuf,

        #[arg(long)]
        inventory: PathBuf,
    },
}

#[derive(Subcommand)]
enum InventoryCmd {
    /// Write a new snapshot with the given datacenters (each gets a vm folder).
    Init {
        #[arg(long = "datacenter", required = true)]
        datacenters: Vec<String>,

        /// Pre-existing folder path, e.g. DC1/vm/eng (parents are created)
        #[arg(long = "folder")]
        folders: Vec<String>,

        /// Pre-existing virtual machine, e.g. DC1/vm/eng/web01
        #[arg(long = "vm")]
        vms: Vec<String>,

        #[arg(long)]
        out: PathBuf,

        /// Overwrite an existing snapshot
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Place a virtual machine into an existing folder of a snapshot
    AddVm {
        #[arg(long)]
        inventory: PathBuf,

        /// e.g. DC1/vm/eng/web01
        #[arg(long)]
        vm: String,
    },

    /// Print every folder path in a snapshot
    Tree {
        #[arg(long)]
        inventory: PathBuf,
    },
}

fn init_tracing() {
    // stderr keeps stdout machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent when missing.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = vmf_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Validate { paths, strict } => {
            let (loaded, cfg) = commands::load_config(&paths)?;
            let policy = if strict {
                UnusedKeyPolicy::Fail
            } else {
                UnusedKeyPolicy::Warn
            };
            let report = report_unused_keys(&loaded.config_json, policy)?;
            for p in &report.unused_leaf_pointers {
                tracing::warn!(pointer = %p, "unused config key");
            }
            println!("config_hash={}", loaded.config_hash);
            println!("folders={}", cfg.folders.len());
            println!("unused_keys={}", report.unused_leaf_pointers.len());
        }

        Commands::ResolvePath { datacenter, parent } => {
            println!(
                "{}",
                to_fully_qualified(&datacenter, &normalize_parent(&parent))
            );
        }

        Commands::Inventory { cmd } => match cmd {
            InventoryCmd::Init {
                datacenters,
                folders,
                vms,
                out,
                force,
            } => commands::inventory::init(InitArgs {
                datacenters: &datacenters,
                folders: &folders,
                vms: &vms,
                out: &out,
                force,
            })?,
            InventoryCmd::AddVm { inventory, vm } => commands::inventory::add_vm(&inventory, &vm)?,
            InventoryCmd::Tree { inventory } => commands::inventory::tree(&inventory)?,
        },

        Commands::Plan {
            config_paths,
            state,
            inventory,
        } => {
            commands::reconcile::plan(ReconcileArgs {
                config_paths: &config_paths,
                state_path: &state,
                inventory_path: &inventory,
            })
            .await?
        }

        Commands::Apply {
            config_paths,
            state,
            inventory,
        } => {
            commands::reconcile::apply(ReconcileArgs {
                config_paths: &config_paths,
                state_path: &state,
                inventory_path: &inventory,
            })
            .await?
        }
    }

    Ok(())
}
