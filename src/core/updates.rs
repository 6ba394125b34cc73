use crate::core::decompression::Extractor;
use crate::core::library::Library;
use crate::core::mod_manager::{self, InstallRequest};
use crate::models::error::SError;
use crate::models::mod_dto::{RemoteFile, SourceMetadata};
use crate::models::task_status::UpdateCheck;
use camino::Utf8Path;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const CATALOG_TIMEOUT: Duration = Duration::from_secs(15);

/// Remote mod catalog.
pub trait Catalog: Send + Sync {
    /// Newest record of mod `id`, looked up by its catalog `name`. `None` when not listed.
    fn latest_record(
        &self,
        id: u64,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<SourceMetadata>, SError>;

    fn list_files(&self, id: u64, timeout: Duration) -> Result<Vec<RemoteFile>, SError>;
}

/// What a pending update needs to be downloaded.
#[derive(Clone, Debug)]
pub struct PendingUpdate {
    pub mod_id: String,
    pub label: String,
    pub latest: SourceMetadata,
    pub files: Vec<RemoteFile>,
}

/// Snapshot of the mods that can be looked up, taken on the coordinating side.
pub fn tracked_mods(lib: &Library) -> Vec<(String, SourceMetadata)> {
    lib.state
        .mods
        .iter()
        .filter_map(|(id, r)| {
            r.source_metadata
                .as_ref()
                .filter(|m| m.is_trackable())
                .map(|m| (id.clone(), m.clone()))
        })
        .collect()
}

/// Looks every tracked mod up. Safe to run off the coordinating thread: touches no state.
pub fn collect_updates(catalog: &dyn Catalog, tracked: &[(String, SourceMetadata)]) -> Vec<UpdateCheck> {
    tracked
        .iter()
        .map(|(mod_id, stored)| {
            let newer = lookup(catalog, stored).unwrap_or_else(|e| {
                warn!("update lookup for '{mod_id}' failed: {e}");
                None
            });
            UpdateCheck {
                mod_id: mod_id.clone(),
                newer,
            }
        })
        .collect()
}

fn lookup(catalog: &dyn Catalog, stored: &SourceMetadata) -> Result<Option<SourceMetadata>, SError> {
    let (Some(id), Some(name)) = (stored.id, stored.name.as_deref()) else {
        return Ok(None);
    };
    let remote = catalog.latest_record(id, name, CATALOG_TIMEOUT)?;
    Ok(remote.filter(|r| r.modified_at > stored.modified_at))
}

/// Writes lookup results into the records. Returns how many mods have an update.
pub fn apply_update_checks(lib: &mut Library, checks: &[UpdateCheck]) -> Result<usize, SError> {
    let mut available = 0;
    for check in checks {
        let Some(meta) = lib
            .state
            .mods
            .get_mut(&check.mod_id)
            .and_then(|r| r.source_metadata.as_mut())
        else {
            debug!("'{}' disappeared during the update check", check.mod_id);
            continue;
        };

        meta.update_available = check.newer.is_some();
        meta.latest = check.newer.clone().map(Box::new);
        if meta.update_available {
            available += 1;
        }
    }

    lib.persist()?;
    info!("{available} mods have updates");
    Ok(available)
}

/// Blocking check of every tracked mod.
pub fn check_for_updates(lib: &mut Library, catalog: &dyn Catalog) -> Result<usize, SError> {
    let tracked = tracked_mods(lib);
    let checks = collect_updates(catalog, &tracked);
    apply_update_checks(lib, &checks)
}

/// Resolves the files of a mod flagged as updatable.
pub fn prepare_update(
    lib: &Library,
    catalog: &dyn Catalog,
    mod_id: &str,
) -> Result<PendingUpdate, SError> {
    let meta = lib
        .record(mod_id)?
        .source_metadata
        .as_ref()
        .filter(|m| m.update_available)
        .ok_or_else(|| SError::Unexpected(Some(format!("'{mod_id}' has no pending update"))))?;

    let latest = meta
        .latest
        .as_deref()
        .cloned()
        .ok_or_else(|| SError::Unexpected(Some(format!("'{mod_id}' has no update record"))))?;
    let remote_id = latest
        .id
        .ok_or_else(|| SError::Unexpected(Some(format!("'{mod_id}' update has no id"))))?;

    let files = catalog.list_files(remote_id, CATALOG_TIMEOUT)?;
    if files.is_empty() {
        return Err(SError::Unexpected(Some(format!("no files listed for '{mod_id}'"))));
    }

    Ok(PendingUpdate {
        mod_id: mod_id.to_string(),
        label: latest.name.clone().unwrap_or_else(|| mod_id.to_string()),
        latest,
        files,
    })
}

/// Installs a downloaded replacement archive over the existing mod and clears its update flag.
pub fn finish_update(
    lib: &mut Library,
    extractor: &dyn Extractor,
    archive: &Utf8Path,
    label: &str,
    latest: SourceMetadata,
) -> Result<String, SError> {
    let modified_at = latest.modified_at;
    let installed = mod_manager::install_from_archive(
        lib,
        extractor,
        InstallRequest {
            archive: archive.to_path_buf(),
            suggested_name: label.to_string(),
            is_downloaded_temp: true,
            source_metadata: Some(latest),
            image: None,
            replace_existing: true,
        },
    )?;

    if let Some(meta) = lib
        .state
        .mods
        .get_mut(&installed)
        .and_then(|r| r.source_metadata.as_mut())
    {
        meta.update_available = false;
        meta.latest = None;
        meta.modified_at = modified_at;
    }
    lib.persist()?;

    info!("updated '{installed}'");
    Ok(installed)
}
