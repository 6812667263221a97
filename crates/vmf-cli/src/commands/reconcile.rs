//! `vmf plan` / `vmf apply`.
//!
//! Plays the orchestration runtime against a snapshot inventory: refresh every
//! recorded resource through Read, diff against declarations, then (apply
//! only) execute the actions through the driver and persist state.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};
use vmf_config::DriverConfig;
use vmf_folder::{
    drift, DeleteOutcome, FolderReconciler, FolderSpec, ReadOutcome, UpdateOutcome,
};
use vmf_inventory_memory::MemoryInventory;

use super::{call_context, load_config, load_inventory, save_inventory};
use crate::plan::{display_path, Action, Plan};
use crate::state::{ResourceState, StateFile};

pub struct ReconcileArgs<'a> {
    pub config_paths: &'a [String],
    pub state_path: &'a Path,
    pub inventory_path: &'a Path,
}

type Reconciler = FolderReconciler<MemoryInventory>;

pub async fn plan(args: ReconcileArgs<'_>) -> Result<()> {
    let (loaded, cfg) = load_config(args.config_paths)?;
    let r = FolderReconciler::new(load_inventory(args.inventory_path)?);
    let mut state = StateFile::load(args.state_path)?;

    refresh(&r, &cfg, &mut state).await?;
    let plan = Plan::build(&state, &cfg.folders);

    println!("config_hash={}", loaded.config_hash);
    print_plan(&plan);
    Ok(())
}

pub async fn apply(args: ReconcileArgs<'_>) -> Result<()> {
    let (loaded, cfg) = load_config(args.config_paths)?;
    let r = FolderReconciler::new(load_inventory(args.inventory_path)?);
    let mut state = StateFile::load(args.state_path)?;

    refresh(&r, &cfg, &mut state).await?;
    let plan = Plan::build(&state, &cfg.folders);

    println!("config_hash={}", loaded.config_hash);
    print_plan(&plan);

    let mut outcome = Ok(());
    for action in plan.actions.iter().filter(|a| a.is_change()) {
        if let Err(e) = execute(&r, &cfg, &mut state, action).await {
            outcome = Err(e);
            break;
        }
    }

    // Persist whatever was done, including partial progress before a failure.
    state.save(args.state_path)?;
    save_inventory(&r.into_client(), args.inventory_path)?;
    outcome?;

    println!("apply_complete=true resources={}", state.resources.len());
    Ok(())
}

/// Replace each recorded spec with what the inventory reports now. Resources
/// whose identity no longer resolves are dropped so the plan recreates them.
async fn refresh(r: &Reconciler, cfg: &DriverConfig, state: &mut StateFile) -> Result<()> {
    let keys: Vec<String> = state.resources.keys().cloned().collect();
    for key in keys {
        let Some(res) = state.resources.get(&key).cloned() else {
            continue;
        };
        let outcome = r
            .read(&call_context(cfg), &res.identity, &res.spec.datacenter)
            .await
            .with_context(|| format!("refresh {key} failed"))?;
        match outcome {
            ReadOutcome::Present(observed) => {
                for d in drift(&res.spec, &observed) {
                    info!(key = %key, field = d.field.as_str(), recorded = %d.from, observed = %d.to, "drift detected");
                }
                state.resources.insert(
                    key,
                    ResourceState {
                        identity: res.identity,
                        spec: observed,
                    },
                );
            }
            ReadOutcome::Absent => {
                warn!(key = %key, identity = %res.identity, "resource gone; dropping from state");
                state.resources.remove(&key);
            }
        }
    }
    Ok(())
}

async fn execute(
    r: &Reconciler,
    cfg: &DriverConfig,
    state: &mut StateFile,
    action: &Action,
) -> Result<()> {
    match action {
        Action::Create { key, spec } => create(r, cfg, state, key, spec).await,

        Action::Update {
            key,
            identity,
            from,
            to,
        } => match r.update(&call_context(cfg), identity, from, to).await {
            Ok(UpdateOutcome::Updated(report)) => {
                if let Some(res) = state.resources.get_mut(key) {
                    res.spec = to.clone();
                }
                info!(key = %key, name = ?report.name, parent = ?report.parent, "updated");
                println!("updated {key}");
                Ok(())
            }
            Ok(UpdateOutcome::Absent) => {
                warn!(key = %key, "resource gone during update; dropping from state");
                state.resources.remove(key);
                println!("gone {key}");
                Ok(())
            }
            Err(failure) => {
                state.record_partial(key, to, &failure.report);
                Err(anyhow::Error::new(failure).context(format!("update {key} failed")))
            }
        },

        Action::Replace {
            key,
            identity,
            from,
            to,
        } => {
            let out = r
                .delete(&call_context(cfg), identity)
                .await
                .with_context(|| format!("replace {key}: delete {} failed", display_path(from)))?;
            state.resources.remove(key);
            if out == DeleteOutcome::Deleted {
                println!("deleted {key}");
            }
            create(r, cfg, state, key, to).await
        }

        Action::Delete { key, identity, .. } => {
            r.delete(&call_context(cfg), identity)
                .await
                .with_context(|| format!("delete {key} failed"))?;
            state.resources.remove(key);
            println!("deleted {key}");
            Ok(())
        }

        Action::NoOp { .. } => Ok(()),
    }
}

async fn create(
    r: &Reconciler,
    cfg: &DriverConfig,
    state: &mut StateFile,
    key: &str,
    spec: &FolderSpec,
) -> Result<()> {
    let identity = r
        .create(&call_context(cfg), spec)
        .await
        .with_context(|| format!("create {key} failed"))?;
    println!("created {key} identity={identity}");
    state.resources.insert(
        key.to_string(),
        ResourceState {
            identity,
            spec: spec.clone(),
        },
    );
    Ok(())
}

fn print_plan(plan: &Plan) {
    for action in &plan.actions {
        println!("{action}");
    }
    println!("{}", plan.summary());
}
