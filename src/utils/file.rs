use crate::models::error::SError;
use camino::Utf8Path;
use std::fs;
use walkdir::WalkDir;

pub struct FileUtils;

impl FileUtils {
    /// Recursively copies a directory tree from source to destination.
    /// Creates all necessary directories and overwrites existing files.
    pub fn copy_recursive(src: &Utf8Path, dst: &Utf8Path) -> Result<(), SError> {
        fs::create_dir_all(dst)?;

        for entry in WalkDir::new(src).sort_by_file_name() {
            let entry = entry?;
            let src_path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
                SError::ParseError(format!("Invalid UTF-8 path: {:?}", entry.path()))
            })?;

            let rel_path = src_path.strip_prefix(src)?;
            let dst_path = dst.join(rel_path);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dst_path)?;
            } else {
                if let Some(parent) = dst_path.parent() {
                    if !parent.exists() {
                        fs::create_dir_all(parent)?;
                    }
                }
                fs::copy(src_path, &dst_path)?;
            }
        }

        Ok(())
    }

    /// Copies a file or a directory tree to `dst`.
    pub fn copy_entry(src: &Utf8Path, dst: &Utf8Path) -> Result<(), SError> {
        if src.is_dir() {
            return Self::copy_recursive(src, dst);
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dst)?;
        Ok(())
    }

    /// Removes a file or a directory tree. A missing path is not an error.
    pub fn remove_path(path: &Utf8Path) -> Result<(), SError> {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if meta.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Moves a directory, falling back to copy + delete across filesystems.
    pub fn move_dir(src: &Utf8Path, dst: &Utf8Path) -> Result<(), SError> {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        if fs::rename(src, dst).is_ok() {
            return Ok(());
        }
        Self::copy_recursive(src, dst)?;
        fs::remove_dir_all(src)?;
        Ok(())
    }

    /// Moves `src` over `dst`, removing whatever was at `dst` first.
    pub fn replace_dir(src: &Utf8Path, dst: &Utf8Path) -> Result<(), SError> {
        Self::remove_path(dst)?;
        Self::move_dir(src, dst)
    }

    /// Names of the immediate children of `dir`, sorted.
    pub fn list_names(dir: &Utf8Path) -> Result<Vec<String>, SError> {
        let mut names = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }
}
