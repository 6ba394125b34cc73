use crate::core::decompression::{Decompression, Extractor};
use crate::core::library::Library;
use crate::core::reconciler::{self, ReconcileReport};
use crate::models::error::SError;
use crate::models::modpack::{Modpack, ModpackEntry, ModpackManifest, MODPACK_MANIFEST};
use crate::utils::file::FileUtils;
use crate::utils::json::Json;
use crate::utils::name::{file_prefix, sanitize_mod_name};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct CreateModpack {
    pub name: String,
    pub author: String,
    pub image: Option<Utf8PathBuf>,
    /// Folder names of library mods to bundle.
    pub mods: Vec<String>,
}

/// Pack names become folder names; anything that is not a plain folder name is refused.
fn clean_pack_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    let clean = sanitize_mod_name(name).ok()?;
    let plain = !clean.is_empty() && clean == name && clean != "." && clean != ".." && !clean.contains('\\');
    plain.then_some(clean)
}

/// Copies the selected mods into a new pack's private storage.
#[instrument(skip(lib, request), fields(name = %request.name))]
pub fn create_modpack(lib: &mut Library, request: CreateModpack) -> Result<(), SError> {
    let name = clean_pack_name(&request.name)
        .ok_or_else(|| SError::ParseError(format!("Invalid modpack name: '{}'", request.name)))?;
    if lib.state.modpacks.contains_key(&name) {
        return Err(SError::ModpackExists(name));
    }

    let storage = lib.paths.modpack_storage(&name);
    let mods_dir = storage.join("mods");
    std::fs::create_dir_all(&mods_dir)?;

    let image = match &request.image {
        Some(src) if src.is_file() => Some(store_pack_image(lib, &name, src, None)?),
        _ if lib.paths.default_pack_icon.is_file() => {
            let icon = lib.paths.default_pack_icon.clone();
            Some(store_pack_image(lib, &name, &icon, Some("icon.png"))?)
        }
        _ => None,
    };

    let mut entries = Vec::with_capacity(request.mods.len());
    for folder in &request.mods {
        let src = lib.mod_dir(folder);
        if src.is_dir() {
            FileUtils::copy_recursive(&src, &mods_dir.join(folder))?;
        } else {
            warn!("mod '{folder}' has no folder, bundling its entry only");
        }

        let display_name = lib
            .state
            .mods
            .get(folder)
            .map(|r| r.display_name(folder))
            .unwrap_or_else(|| folder.clone());
        entries.push(ModpackEntry {
            folder_name: folder.clone(),
            display_name,
        });
    }

    lib.state.modpacks.insert(
        name.clone(),
        Modpack {
            author: request.author,
            image,
            mods: entries,
            path: storage,
        },
    );
    info!("created modpack '{name}'");
    lib.persist()
}

/// Removes a pack, its image and its storage. An active pack is reverted first.
#[instrument(skip(lib))]
pub fn delete_modpack(lib: &mut Library, name: &str) -> Result<ReconcileReport, SError> {
    if !lib.state.modpacks.contains_key(name) {
        return Err(SError::ModpackNotFound(name.to_string()));
    }

    let report = if lib.state.active_modpack.as_deref() == Some(name) {
        reconciler::deactivate_all(lib)?
    } else {
        ReconcileReport::default()
    };

    if let Some(pack) = lib.state.modpacks.remove(name) {
        if let Some(image) = &pack.image {
            if let Err(e) = FileUtils::remove_path(image) {
                warn!("could not remove pack image {image}: {e}");
            }
        }
        if let Err(e) = FileUtils::remove_path(&pack.path) {
            warn!("could not remove pack storage {}: {e}", pack.path);
        }
    }

    info!("deleted modpack '{name}'");
    lib.persist()?;
    Ok(report)
}

/// Writes `modpack.json`, the pack image and the `mods/` tree into a deflated zip.
#[instrument(skip(lib))]
pub fn export_modpack(lib: &Library, name: &str, destination: &Utf8Path) -> Result<(), SError> {
    let pack = lib
        .state
        .modpacks
        .get(name)
        .ok_or_else(|| SError::ModpackNotFound(name.to_string()))?;
    if !pack.path.is_dir() {
        return Err(SError::ImportValidationFailed(format!(
            "storage of '{name}' is missing: {}",
            pack.path
        )));
    }

    let image = pack
        .image
        .as_ref()
        .filter(|p| p.is_file())
        .and_then(|p| p.file_name().map(|f| (p, f.to_string())));

    let manifest = ModpackManifest {
        name: name.to_string(),
        author: pack.author.clone(),
        mods: pack.mods.clone(),
        image: image.as_ref().map(|(_, f)| f.clone()),
    };

    let mut zip = Decompression::create_archive(destination)?;
    Decompression::write_bytes(
        &mut zip,
        MODPACK_MANIFEST,
        &serde_json::to_vec_pretty(&manifest)?,
    )?;
    if let Some((path, file_name)) = &image {
        Decompression::write_bytes(&mut zip, file_name, &std::fs::read(path)?)?;
    }
    let mods_dir = pack.mods_dir();
    if mods_dir.is_dir() {
        Decompression::write_tree(&mut zip, &mods_dir, "mods")?;
    }
    zip.finish()?;

    info!("exported modpack '{name}' to {destination}");
    Ok(())
}

/// Imports an exported pack, optionally under a different name. Returns the pack name.
#[instrument(skip(lib, extractor))]
pub fn import_modpack(
    lib: &mut Library,
    extractor: &dyn Extractor,
    archive: &Utf8Path,
    rename: Option<&str>,
) -> Result<String, SError> {
    let staging = lib.root.join(format!(".import-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&staging)?;

    let result = extractor
        .extract(archive, &staging)
        .and_then(|_| import_staged(lib, &staging, rename));

    if let Err(e) = FileUtils::remove_path(&staging) {
        warn!("could not remove {staging}: {e}");
    }
    result
}

fn import_staged(lib: &mut Library, staging: &Utf8Path, rename: Option<&str>) -> Result<String, SError> {
    let manifest_path = staging.join(MODPACK_MANIFEST);
    if !manifest_path.is_file() {
        return Err(SError::ImportValidationFailed(format!(
            "{MODPACK_MANIFEST} is missing"
        )));
    }
    let manifest: ModpackManifest = Json::read(&manifest_path)
        .map_err(|e| SError::ImportValidationFailed(e.to_string()))?;

    let requested = rename.unwrap_or(&manifest.name);
    let name = clean_pack_name(requested).ok_or_else(|| {
        SError::ImportValidationFailed(format!("invalid modpack name: '{requested}'"))
    })?;
    if lib.state.modpacks.contains_key(&name) {
        return Err(SError::ImportValidationFailed(format!(
            "a modpack named '{name}' already exists"
        )));
    }

    let storage = lib.paths.modpack_storage(&name);
    let mods_src = staging.join("mods");
    let mods_dst = storage.join("mods");
    if mods_src.is_dir() {
        FileUtils::replace_dir(&mods_src, &mods_dst)?;
    } else {
        std::fs::create_dir_all(&mods_dst)?;
    }

    // Only a bare file name inside the archive is accepted as the image.
    let image = match manifest.image.as_deref() {
        Some(file) if Utf8Path::new(file).file_name() == Some(file) => {
            let src = staging.join(file);
            if src.is_file() {
                Some(store_pack_image(lib, &name, &src, None)?)
            } else {
                None
            }
        }
        _ => None,
    };

    lib.state.modpacks.insert(
        name.clone(),
        Modpack {
            author: manifest.author,
            image,
            mods: manifest.mods,
            path: storage,
        },
    );
    lib.persist()?;

    info!("imported modpack '{name}'");
    Ok(name)
}

/// Copies an image to `modpacks_data/<pack_prefix>_<file>`.
fn store_pack_image(
    lib: &Library,
    pack_name: &str,
    src: &Utf8Path,
    file_name: Option<&str>,
) -> Result<Utf8PathBuf, SError> {
    let file_name = file_name.or_else(|| src.file_name()).unwrap_or("image");
    let dst = lib
        .paths
        .modpacks_data
        .join(format!("{}_{file_name}", file_prefix(pack_name)));
    FileUtils::copy_entry(src, &dst)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_pack_name() {
        assert_eq!(clean_pack_name(" Saiyans "), Some("Saiyans".to_string()));
        assert_eq!(clean_pack_name(".."), None);
        assert_eq!(clean_pack_name("a/b"), None);
        assert_eq!(clean_pack_name(""), None);
    }
}
