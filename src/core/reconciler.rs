use crate::core::deployment::{self, Source};
use crate::core::library::Library;
use crate::models::error::SError;
use crate::models::state::ManagementMode;
use crate::models::task_status::{TaskStatus, Warning};
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Outcome of a bulk reconciliation. Per-mod failures do not stop the loop.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub activated: Vec<String>,
    pub deactivated: Vec<String>,
    pub failed: Vec<(String, SError)>,
    pub warnings: Vec<Warning>,
}

impl ReconcileReport {
    pub fn warned(warning: Warning) -> Self {
        Self {
            warnings: vec![warning],
            ..Default::default()
        }
    }

    fn absorb(&mut self, other: ReconcileReport) {
        self.activated.extend(other.activated);
        self.deactivated.extend(other.deactivated);
        self.failed.extend(other.failed);
        self.warnings.extend(other.warnings);
    }

    fn record(&mut self, mod_id: &str, desired: bool, result: Result<(), SError>) {
        match result {
            Ok(()) if desired => self.activated.push(mod_id.to_string()),
            Ok(()) => self.deactivated.push(mod_id.to_string()),
            Err(e) => self.failed.push((mod_id.to_string(), e)),
        }
    }
}

/// Mod operations only run with the bypass on and a usable game path.
pub fn deployment_enabled(lib: &Library) -> bool {
    lib.state.bypass_active && lib.has_valid_game_path()
}

/// Converges the library mods to exactly the entries of `profile`.
#[instrument(skip(lib))]
pub fn apply_profile(lib: &mut Library, profile: &str) -> Result<ReconcileReport, SError> {
    let wanted: HashSet<String> = lib
        .state
        .profiles
        .get(profile)
        .ok_or_else(|| SError::ProfileNotFound(profile.to_string()))?
        .iter()
        .cloned()
        .collect();

    if lib.state.mod_management_mode != ManagementMode::Profiles {
        return Ok(ReconcileReport::warned(Warning::WrongMode));
    }
    if !deployment_enabled(lib) {
        return Ok(ReconcileReport::warned(Warning::BypassInactive));
    }

    // Inactive records with a leftover ledger come from failed activations and are cleaned too.
    let pending: Vec<(String, bool)> = lib
        .state
        .mods
        .iter()
        .filter_map(|(id, record)| {
            let desired = wanted.contains(id);
            let stale = !desired && !record.deployed_paths.is_empty();
            (record.active != desired || stale).then(|| (id.clone(), desired))
        })
        .collect();

    let mut report = ReconcileReport::default();
    for (mod_id, desired) in pending {
        let result = deployment::apply_mod_state(lib, &mod_id, desired, &Source::Library, false);
        report.record(&mod_id, desired, result);
    }

    info!(
        "profile '{profile}' applied: +{} -{} failed {}",
        report.activated.len(),
        report.deactivated.len(),
        report.failed.len()
    );
    lib.notify(TaskStatus::ProfileApplied {
        profile: profile.to_string(),
        failed: report.failed.len(),
    });
    Ok(report)
}

pub fn apply_current_profile(lib: &mut Library) -> Result<ReconcileReport, SError> {
    let current = lib.state.current_profile.clone();
    apply_profile(lib, &current)
}

/// Reverts every deployment the library knows about, library mods and modpack mods alike,
/// and clears the active modpack.
#[instrument(skip(lib))]
pub fn deactivate_all(lib: &mut Library) -> Result<ReconcileReport, SError> {
    let mut report = ReconcileReport::default();

    let library_mods: Vec<String> = lib
        .state
        .mods
        .iter()
        .filter(|(_, r)| r.active || !r.deployed_paths.is_empty())
        .map(|(id, _)| id.clone())
        .collect();
    for mod_id in library_mods {
        let result = deployment::apply_mod_state(lib, &mod_id, false, &Source::Library, false);
        report.record(&mod_id, false, result);
    }

    let pack_base = lib
        .state
        .active_modpack
        .as_ref()
        .and_then(|name| lib.state.modpacks.get(name))
        .map(|pack| pack.mods_dir())
        .unwrap_or_else(|| lib.paths.modpacks_library.clone());
    let pack_mods: Vec<String> = lib.state.modpack_deployments.keys().cloned().collect();
    for mod_id in pack_mods {
        let source = Source::Modpack(pack_base.clone());
        let result = deployment::apply_mod_state(lib, &mod_id, false, &source, false);
        report.record(&mod_id, false, result);
    }

    if lib.state.active_modpack.take().is_some() {
        lib.persist()?;
    }

    if !report.failed.is_empty() {
        warn!("{} mods could not be deactivated", report.failed.len());
    }
    Ok(report)
}

/// Deactivates everything, then deploys the members of `pack_name` from its private storage.
#[instrument(skip(lib))]
pub fn activate_modpack(lib: &mut Library, pack_name: &str) -> Result<ReconcileReport, SError> {
    let pack = lib
        .state
        .modpacks
        .get(pack_name)
        .cloned()
        .ok_or_else(|| SError::ModpackNotFound(pack_name.to_string()))?;

    if lib.state.mod_management_mode != ManagementMode::Modpacks {
        return Ok(ReconcileReport::warned(Warning::WrongMode));
    }
    if !deployment_enabled(lib) {
        return Ok(ReconcileReport::warned(Warning::BypassInactive));
    }
    if lib.state.active_modpack.as_deref() == Some(pack_name) {
        return Ok(ReconcileReport::default());
    }

    let mut report = deactivate_all(lib)?;

    let base = pack.mods_dir();
    let source = Source::Modpack(base.clone());
    let mut missing = Vec::new();
    for entry in &pack.mods {
        if !base.join(&entry.folder_name).is_dir() {
            missing.push(entry.display_name.clone());
            continue;
        }
        let result = deployment::apply_mod_state(lib, &entry.folder_name, true, &source, false);
        report.record(&entry.folder_name, true, result);
    }

    lib.state.active_modpack = Some(pack_name.to_string());
    lib.persist()?;

    if !missing.is_empty() {
        warn!("modpack '{pack_name}' is missing {missing:?}");
        report
            .warnings
            .push(Warning::MissingModpackMods(missing.clone()));
    }
    lib.notify(TaskStatus::ModpackActivated {
        name: pack_name.to_string(),
        missing,
    });
    Ok(report)
}

/// Switches between profile and modpack management. With the bypass on, everything deployed is
/// reverted first; returning to profiles re-applies the current profile.
#[instrument(skip(lib))]
pub fn switch_mode(lib: &mut Library, mode: ManagementMode) -> Result<ReconcileReport, SError> {
    if lib.state.mod_management_mode == mode {
        return Ok(ReconcileReport::default());
    }

    let mut report = ReconcileReport::default();
    let enabled = deployment_enabled(lib);
    if enabled {
        report.absorb(deactivate_all(lib)?);
    }

    lib.state.mod_management_mode = mode;
    lib.persist()?;

    if enabled && mode == ManagementMode::Profiles {
        report.absorb(apply_current_profile(lib)?);
    }

    info!("management mode is now {mode:?}");
    Ok(report)
}
