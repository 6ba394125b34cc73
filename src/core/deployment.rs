use crate::core::classifier::{self, FsListing};
use crate::core::json_registry::JsonRegistry;
use crate::core::library::Library;
use crate::core::planner::{self, DeployKind, DeployOp};
use crate::models::error::SError;
use crate::models::mod_dto::ModRecord;
use crate::models::paths::GamePathRules;
use crate::models::task_status::TaskStatus;
use crate::utils::file::FileUtils;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::{debug, error, info, instrument, warn};

/// Where a mod's content is read from, and therefore which ledger tracks it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// `mods/<id>`, tracked in `AppState::mods`.
    Library,
    /// `<base>/<id>` of a modpack's private storage, tracked in `AppState::modpack_deployments`.
    Modpack(Utf8PathBuf),
}

impl Source {
    fn base<'a>(&'a self, lib: &'a Library) -> &'a Utf8Path {
        match self {
            Source::Library => &lib.paths.mods,
            Source::Modpack(base) => base,
        }
    }
}

fn slot<'a>(lib: &'a mut Library, mod_id: &str, source: &Source) -> Result<&'a mut ModRecord, SError> {
    match source {
        Source::Library => lib.record_mut(mod_id),
        Source::Modpack(_) => Ok(lib
            .state
            .modpack_deployments
            .entry(mod_id.to_string())
            .or_default()),
    }
}

/// Game layout for writing or reverting deployments. With the bypass off, ledger paths under
/// the native mod folders point at trees parked in the backup area.
fn live_rules(lib: &Library) -> Result<GamePathRules, SError> {
    let rules = lib.game_rules()?;
    if !lib.state.bypass_active {
        return Err(SError::BypassInactive);
    }
    Ok(rules)
}

/// Moves a mod to `desired`, always re-deriving from disk rather than trusting the stored flag.
///
/// On failure the flag returns to its value before the attempt and is persisted, the ledger keeps
/// whatever was actually written, and the error names the mod.
#[instrument(skip(lib, source))]
pub fn apply_mod_state(
    lib: &mut Library,
    mod_id: &str,
    desired: bool,
    source: &Source,
    notify: bool,
) -> Result<(), SError> {
    let previous = slot(lib, mod_id, source)?.active;

    let result = if desired {
        activate(lib, mod_id, source)
    } else {
        deactivate(lib, mod_id, source)
    };

    match result {
        Ok(()) => {
            if notify {
                lib.notify(if desired {
                    TaskStatus::ModActivated(mod_id.to_string())
                } else {
                    TaskStatus::ModDeactivated(mod_id.to_string())
                });
            }
            Ok(())
        }
        Err(cause) => {
            error!("transition of '{mod_id}' to active={desired} failed: {cause}");
            if let Ok(record) = slot(lib, mod_id, source) {
                record.active = previous;
            }
            if let Err(e) = lib.persist() {
                warn!("failed to persist reverted flag: {e}");
            }
            if notify {
                lib.notify(TaskStatus::ModFailed {
                    mod_id: mod_id.to_string(),
                    message: cause.to_string(),
                });
            }
            Err(SError::transition(mod_id, cause))
        }
    }
}

/// Deploys a mod into the game tree and records every written path.
pub fn activate(lib: &mut Library, mod_id: &str, source: &Source) -> Result<(), SError> {
    let rules = live_rules(lib)?;

    let dir = source.base(lib).join(mod_id);
    if !dir.is_dir() {
        return Err(SError::SourceMissing(dir.to_string()));
    }

    let roots = classifier::locate(&FsListing, &dir);
    if roots.is_empty() {
        return Err(SError::NoValidContent(dir.to_string()));
    }
    let plan = planner::plan_all(&roots, &rules);

    // A stale ledger from an earlier activation is reverted before anything new is written.
    if !slot(lib, mod_id, source)?.deployed_paths.is_empty() {
        debug!("reverting previous deployment of '{mod_id}'");
        revert_ledger(lib, mod_id, source, &rules)?;
    }

    let registry = JsonRegistry::new(&rules.json_registry);
    let already_listed = registry.entries();
    registry.add_entries(&plan.registry_entries)?;

    let mut ledger = Vec::new();
    let copied = plan
        .ops
        .iter()
        .try_for_each(|op| execute(op, &mut ledger));

    let record = slot(lib, mod_id, source)?;
    record.deployed_paths = ledger;

    if let Err(e) = copied {
        let orphaned: Vec<String> = plan
            .registry_entries
            .iter()
            .filter(|name| !already_listed.contains(name))
            .filter(|name| !has_json(&record.deployed_paths, &rules.json_dir, name))
            .cloned()
            .collect();
        if let Err(re) = registry.remove_entries(&orphaned) {
            warn!("could not drop orphaned registry entries {orphaned:?}: {re}");
        }
        lib.persist()?;
        return Err(e);
    }

    record.active = true;
    info!(
        "activated '{mod_id}' ({} paths)",
        record.deployed_paths.len()
    );
    lib.persist()
}

/// Reverts exactly what the ledger records, then marks the mod inactive.
pub fn deactivate(lib: &mut Library, mod_id: &str, source: &Source) -> Result<(), SError> {
    let rules = live_rules(lib)?;
    revert_ledger(lib, mod_id, source, &rules)?;

    let record = slot(lib, mod_id, source)?;
    record.active = false;
    if let Source::Modpack(_) = source {
        lib.state.modpack_deployments.remove(mod_id);
    }

    info!("deactivated '{mod_id}'");
    lib.persist()
}

fn revert_ledger(
    lib: &mut Library,
    mod_id: &str,
    source: &Source,
    rules: &GamePathRules,
) -> Result<(), SError> {
    let ledger = std::mem::take(&mut slot(lib, mod_id, source)?.deployed_paths);
    let removal = planner::plan_removal(&ledger, &rules.json_dir);

    JsonRegistry::new(&rules.json_registry).remove_entries(&removal.registry_entries)?;

    // Newest first; whatever cannot be removed stays in the ledger.
    let mut remaining = removal.paths;
    while let Some(path) = remaining.last() {
        if let Err(e) = FileUtils::remove_path(path) {
            let err = SError::copy_failed(path, e);
            slot(lib, mod_id, source)?.deployed_paths = remaining;
            lib.persist()?;
            return Err(err);
        }
        remaining.pop();
    }

    slot(lib, mod_id, source)?.deployed_paths.clear();
    lib.persist()
}

/// Performs one copy, appending to `ledger` only what now exists on disk.
fn execute(op: &DeployOp, ledger: &mut Vec<Utf8PathBuf>) -> Result<(), SError> {
    let dst = &op.destination;
    match op.kind {
        DeployKind::Directory => {
            FileUtils::remove_path(dst).map_err(|e| SError::copy_failed(dst, e))?;
            fs::create_dir_all(dst).map_err(|e| SError::copy_failed(dst, e))?;
            ledger.push(dst.clone());
            FileUtils::copy_recursive(&op.source, dst).map_err(|e| SError::copy_failed(dst, e))
        }
        DeployKind::File => {
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent).map_err(|e| SError::copy_failed(parent, e))?;
            }
            match fs::copy(&op.source, dst) {
                Ok(_) => {
                    ledger.push(dst.clone());
                    Ok(())
                }
                Err(e) => {
                    if dst.exists() {
                        ledger.push(dst.clone());
                    }
                    Err(SError::copy_failed(dst, e))
                }
            }
        }
    }
}

fn has_json(ledger: &[Utf8PathBuf], json_dir: &Utf8Path, name: &str) -> bool {
    planner::plan_removal(ledger, json_dir)
        .registry_entries
        .iter()
        .any(|n| n == name)
}
