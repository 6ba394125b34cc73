use crate::core::decompression::Extractor;
use crate::core::deployment::{self, Source};
use crate::core::library::Library;
use crate::core::mod_stager::{ModStager, StagedMod};
use crate::core::profile;
use crate::core::reconciler;
use crate::models::error::SError;
use crate::models::mod_dto::{ModRecord, SourceMetadata};
use crate::models::state::ManagementMode;
use crate::models::task_status::Warning;
use crate::utils::file::FileUtils;
use crate::utils::name::sanitize_mod_name;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

#[derive(Clone, Debug, Default)]
pub struct InstallRequest {
    pub archive: Utf8PathBuf,
    /// Name used when the archive has no single top-level folder.
    pub suggested_name: String,
    /// The archive is a download and is deleted afterwards, whatever the outcome.
    pub is_downloaded_temp: bool,
    pub source_metadata: Option<SourceMetadata>,
    pub image: Option<Utf8PathBuf>,
    /// Overwrite a mod with the same folder name instead of failing with `ModExists`.
    pub replace_existing: bool,
}

/// Extracts an archive into the mods storage and registers it. Returns the mod's folder name.
#[instrument(skip(lib, extractor), fields(archive = %request.archive))]
pub fn install_from_archive(
    lib: &mut Library,
    extractor: &dyn Extractor,
    request: InstallRequest,
) -> Result<String, SError> {
    let fallback = sanitize_mod_name(&request.suggested_name)?;
    let staged = ModStager::stage(extractor, &request.archive, &lib.paths.mods, &fallback);

    let result = staged.and_then(|staged| {
        let installed = install_staged(lib, &staged, &request);
        if let Err(e) = ModStager::clean_up(&staged) {
            warn!("could not remove {}: {e}", staged.staging_dir);
        }
        installed
    });

    if request.is_downloaded_temp {
        if let Err(e) = FileUtils::remove_path(&request.archive) {
            warn!("could not remove downloaded archive: {e}");
        }
    }
    if let Err(e) = sync_mods_folder(lib) {
        warn!("folder sync after install failed: {e}");
    }

    match &result {
        Ok(name) => info!("installed '{name}'"),
        Err(e) => warn!("install of '{fallback}' failed: {e}"),
    }
    result
}

fn install_staged(
    lib: &mut Library,
    staged: &StagedMod,
    request: &InstallRequest,
) -> Result<String, SError> {
    let name = staged.name.clone();

    if lib.state.mods.contains_key(&name) {
        if !request.replace_existing {
            return Err(SError::ModExists(name));
        }
        info!("replacing '{name}'");
        remove_mod_files(lib, &name, true)?;
    }

    FileUtils::replace_dir(&staged.content_dir, &lib.mod_dir(&name))?;

    let image = match &request.image {
        Some(src) if src.is_file() => match copy_image(lib, &name, src) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("could not store image for '{name}': {e}");
                None
            }
        },
        _ => None,
    };

    let record = lib.state.mods.entry(name.clone()).or_default();
    if image.is_some() {
        record.manual_image_path = image;
    }
    if let Some(meta) = &request.source_metadata {
        record.source_metadata = Some(SourceMetadata {
            update_available: false,
            latest: None,
            ..meta.clone()
        });
    }

    lib.persist()?;
    Ok(name)
}

/// Deactivates, removes the manual image and local folder. The record itself is either
/// reset (`keep_record`) or left for the caller to drop.
fn remove_mod_files(lib: &mut Library, mod_id: &str, keep_record: bool) -> Result<(), SError> {
    let record = lib.record(mod_id)?;
    if record.active || !record.deployed_paths.is_empty() {
        if !lib.state.bypass_active {
            return Err(SError::BypassInactive);
        }
        deployment::apply_mod_state(lib, mod_id, false, &Source::Library, true)?;
    }

    if let Some(image) = lib.record(mod_id)?.manual_image_path.clone() {
        if let Err(e) = FileUtils::remove_path(&image) {
            warn!("could not remove image {image}: {e}");
        }
    }

    let local = lib.mod_dir(mod_id);
    if let Err(e) = FileUtils::remove_path(&local) {
        warn!("could not remove {local}: {e}");
    }

    if keep_record {
        let record = lib.record_mut(mod_id)?;
        record.active = false;
        record.deployed_paths.clear();
        record.manual_image_path = None;
    }
    Ok(())
}

/// Removes a mod from disk, the game and every profile.
#[instrument(skip(lib))]
pub fn delete_mod(lib: &mut Library, mod_id: &str) -> Result<(), SError> {
    remove_mod_files(lib, mod_id, false)?;

    lib.state.mods.remove(mod_id);
    lib.state.forget_in_profiles(mod_id);
    lib.persist()?;
    info!("deleted '{mod_id}'");

    sync_mods_folder(lib)
}

/// Flips one mod in profile mode and records the choice in the current profile.
///
/// The profile keeps the new intent even when the transition fails, so the next
/// profile application retries it.
#[instrument(skip(lib))]
pub fn toggle_mod(lib: &mut Library, mod_id: &str, active: bool) -> Result<Vec<Warning>, SError> {
    lib.record(mod_id)?;

    if lib.state.mod_management_mode != ManagementMode::Profiles {
        return Ok(vec![Warning::WrongMode]);
    }
    if !reconciler::deployment_enabled(lib) {
        return Ok(vec![Warning::BypassInactive]);
    }

    profile::set_membership(lib, mod_id, active);
    lib.persist()?;

    deployment::apply_mod_state(lib, mod_id, active, &Source::Library, true)?;
    Ok(Vec::new())
}

/// Registers folders found in `mods/` and forgets records whose folder is gone.
pub fn sync_mods_folder(lib: &mut Library) -> Result<(), SError> {
    std::fs::create_dir_all(&lib.paths.mods)?;

    let on_disk: BTreeSet<String> = FileUtils::list_names(&lib.paths.mods)?
        .into_iter()
        .filter(|n| !n.starts_with('.'))
        .filter(|n| lib.paths.mods.join(n).is_dir())
        .collect();

    for name in &on_disk {
        if !lib.state.mods.contains_key(name) {
            info!("found new mod folder '{name}'");
            lib.state.mods.insert(name.clone(), ModRecord::default());
        }
    }

    let vanished: Vec<String> = lib
        .state
        .mods
        .keys()
        .filter(|id| !on_disk.contains(*id))
        .cloned()
        .collect();

    for mod_id in vanished {
        let deployed = lib
            .state
            .mods
            .get(&mod_id)
            .is_some_and(|r| !r.deployed_paths.is_empty());

        // The ledger is enough to undo a deployment whose source is gone. Until that revert
        // succeeds the record stays, inactive and holding its ledger.
        if deployed && !revert_vanished(lib, &mod_id) {
            warn!("mod folder '{mod_id}' vanished while deployed, keeping its ledger");
            if let Ok(record) = lib.record_mut(&mod_id) {
                record.active = false;
            }
            lib.state.forget_in_profiles(&mod_id);
            continue;
        }

        info!("mod folder '{mod_id}' vanished, dropping record");
        lib.state.mods.remove(&mod_id);
        lib.state.forget_in_profiles(&mod_id);
    }

    lib.persist()
}

fn revert_vanished(lib: &mut Library, mod_id: &str) -> bool {
    if !reconciler::deployment_enabled(lib) {
        return false;
    }
    match deployment::apply_mod_state(lib, mod_id, false, &Source::Library, true) {
        Ok(()) => true,
        Err(e) => {
            warn!("could not revert vanished mod '{mod_id}': {e}");
            false
        }
    }
}

/// Stores a user-picked image for a mod, replacing the previous one.
pub fn set_manual_image(
    lib: &mut Library,
    mod_id: &str,
    image: &Utf8Path,
) -> Result<Utf8PathBuf, SError> {
    lib.record(mod_id)?;
    if !image.is_file() {
        return Err(SError::SourceMissing(image.to_string()));
    }

    if let Some(old) = lib.record(mod_id)?.manual_image_path.clone() {
        if let Err(e) = FileUtils::remove_path(&old) {
            warn!("could not remove previous image {old}: {e}");
        }
    }

    let stored = copy_image(lib, mod_id, image)?;
    lib.record_mut(mod_id)?.manual_image_path = Some(stored.clone());
    lib.persist()?;
    Ok(stored)
}

fn copy_image(lib: &Library, mod_id: &str, src: &Utf8Path) -> Result<Utf8PathBuf, SError> {
    let file_name = match src.extension() {
        Some(ext) => format!("{mod_id}.{ext}"),
        None => mod_id.to_string(),
    };
    let dst = lib.paths.mod_images.join(file_name);
    FileUtils::copy_entry(src, &dst)?;
    Ok(dst)
}
