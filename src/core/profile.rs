use crate::core::reconciler::{self, ReconcileReport};
use crate::core::library::Library;
use crate::models::error::SError;
use crate::models::state::{ManagementMode, DEFAULT_PROFILE};
use crate::models::task_status::Warning;
use tracing::{info, instrument};

/// Creates an empty profile and makes it current. Nothing is redeployed.
pub fn add_profile(lib: &mut Library, name: &str) -> Result<(), SError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SError::ParseError("Profile name is empty".into()));
    }
    if lib.state.profiles.contains_key(name) {
        return Err(SError::ProfileExists(name.to_string()));
    }

    lib.state.profiles.insert(name.to_string(), Vec::new());
    lib.state.current_profile = name.to_string();
    info!("added profile '{name}'");
    lib.persist()
}

/// Deletes a profile. If it was current, `Default` becomes current and is applied.
#[instrument(skip(lib))]
pub fn delete_profile(lib: &mut Library, name: &str) -> Result<ReconcileReport, SError> {
    if name == DEFAULT_PROFILE {
        return Err(SError::ReservedProfile(name.to_string()));
    }
    if lib.state.profiles.remove(name).is_none() {
        return Err(SError::ProfileNotFound(name.to_string()));
    }

    let was_current = lib.state.current_profile == name;
    if was_current {
        lib.state.current_profile = DEFAULT_PROFILE.to_string();
    }
    lib.persist()?;

    if !was_current {
        return Ok(ReconcileReport::default());
    }
    reconciler::apply_current_profile(lib)
}

/// Makes `name` current and converges the deployed mods to it.
#[instrument(skip(lib))]
pub fn change_profile(lib: &mut Library, name: &str) -> Result<ReconcileReport, SError> {
    if !lib.state.profiles.contains_key(name) {
        return Err(SError::ProfileNotFound(name.to_string()));
    }

    lib.state.current_profile = name.to_string();
    lib.persist()?;
    reconciler::apply_profile(lib, name)
}

/// Sets the current profile to every known mod (or none) and applies it.
pub fn toggle_all(lib: &mut Library, activate: bool) -> Result<ReconcileReport, SError> {
    if lib.state.mod_management_mode != ManagementMode::Profiles {
        return Ok(ReconcileReport::warned(Warning::WrongMode));
    }
    if !reconciler::deployment_enabled(lib) {
        return Ok(ReconcileReport::warned(Warning::BypassInactive));
    }

    let entries = if activate {
        lib.state.mods.keys().cloned().collect()
    } else {
        Vec::new()
    };
    let current = lib.state.current_profile.clone();
    lib.state.profiles.insert(current, entries);
    lib.persist()?;

    reconciler::apply_current_profile(lib)
}

/// Adds or removes `mod_id` in the current profile.
pub(crate) fn set_membership(lib: &mut Library, mod_id: &str, member: bool) {
    let current = lib.state.current_profile.clone();
    let entries = lib.state.profiles.entry(current).or_default();
    let present = entries.iter().any(|e| e == mod_id);

    if member && !present {
        entries.push(mod_id.to_string());
    } else if !member && present {
        entries.retain(|e| e != mod_id);
    }
}
