use crate::core::decompression::Extractor;
use crate::models::error::SError;
use crate::utils::file::FileUtils;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Prefix of scratch folders; folder sync ignores anything starting with a dot.
pub const STAGING_PREFIX: &str = ".staging-";

pub struct ModStager;

#[derive(Debug)]
pub struct StagedMod {
    /// Scratch folder to delete once the mod has been moved out.
    pub staging_dir: Utf8PathBuf,
    /// Folder that becomes `mods/<name>`.
    pub content_dir: Utf8PathBuf,
    pub name: String,
}

impl ModStager {
    /// Extracts `archive` into a fresh scratch folder under `staging_root` and picks the mod root.
    /// The scratch folder is removed again if extraction fails.
    pub fn stage(
        extractor: &dyn Extractor,
        archive: &Utf8Path,
        staging_root: &Utf8Path,
        fallback_name: &str,
    ) -> Result<StagedMod, SError> {
        if !archive.is_file() {
            return Err(SError::SourceMissing(archive.to_string()));
        }

        let staging_dir = staging_root.join(format!("{STAGING_PREFIX}{}", Uuid::new_v4()));
        fs::create_dir_all(&staging_dir)?;

        let staged = extractor
            .extract(archive, &staging_dir)
            .and_then(|_| Self::select_root(&staging_dir, fallback_name));

        match staged {
            Ok((content_dir, name)) => Ok(StagedMod {
                staging_dir,
                content_dir,
                name,
            }),
            Err(e) => {
                if let Err(ce) = FileUtils::remove_path(&staging_dir) {
                    warn!("could not remove {staging_dir}: {ce}");
                }
                Err(e)
            }
        }
    }

    /// A lone top-level folder, or the only folder among several entries, is the mod root and
    /// names the mod. Otherwise the whole extraction is the root, named `fallback_name`.
    pub fn select_root(
        extracted: &Utf8Path,
        fallback_name: &str,
    ) -> Result<(Utf8PathBuf, String), SError> {
        let names = FileUtils::list_names(extracted)?;
        let dirs: Vec<&String> = names
            .iter()
            .filter(|n| extracted.join(n.as_str()).is_dir())
            .collect();

        let (root, name) = match dirs.as_slice() {
            [only] => (extracted.join(only.as_str()), only.to_string()),
            _ => (extracted.to_path_buf(), fallback_name.to_string()),
        };

        if name.trim().is_empty() {
            return Err(SError::ParseError("Mod name is empty".into()));
        }
        if names.is_empty() {
            return Err(SError::NoValidContent(extracted.to_string()));
        }
        Ok((root, name))
    }

    pub fn clean_up(StagedMod { staging_dir, .. }: &StagedMod) -> Result<(), SError> {
        debug!("clean up for {staging_dir}");
        FileUtils::remove_path(staging_dir)
    }
}
