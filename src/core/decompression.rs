use crate::models::error::SError;
use camino::Utf8Path;
use std::fs::{self, File};
use std::io::{self, Seek, Write};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Unpacks an archive into a directory, failing on anything it cannot read.
pub trait Extractor: Send + Sync {
    fn extract(&self, archive: &Utf8Path, destination: &Utf8Path) -> Result<(), SError>;
}

/// Zip containers via the `zip` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipExtractor;

impl Extractor for ZipExtractor {
    fn extract(&self, archive: &Utf8Path, destination: &Utf8Path) -> Result<(), SError> {
        Decompression::extract(archive, destination)
    }
}

pub struct Decompression;

impl Decompression {
    pub fn extract(archive_path: &Utf8Path, destination: &Utf8Path) -> Result<(), SError> {
        let file = File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        fs::create_dir_all(destination)?;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;

            // enclosed_name() rejects absolute paths and `..` escapes.
            let Some(safe_path) = file.enclosed_name() else {
                continue;
            };
            let output_path = destination.as_std_path().join(&safe_path);

            if file.is_dir() {
                fs::create_dir_all(&output_path)?;
            } else {
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut outfile = File::create(&output_path)?;
                io::copy(&mut file, &mut outfile)?;
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = file.unix_mode() {
                    if let Err(e) =
                        fs::set_permissions(&output_path, fs::Permissions::from_mode(mode))
                    {
                        tracing::warn!("could not set mode on {}: {e}", output_path.display());
                    }
                }
            }
        }

        Ok(())
    }

    /// Writes the tree under `src_dir` into a deflated zip at `archive_path`,
    /// with entry names relative to `src_dir`.
    pub fn compress_dir(src_dir: &Utf8Path, archive_path: &Utf8Path) -> Result<(), SError> {
        let mut zip = Self::create_archive(archive_path)?;
        Self::write_tree(&mut zip, src_dir, "")?;
        zip.finish()?;
        Ok(())
    }

    pub fn create_archive(archive_path: &Utf8Path) -> Result<ZipWriter<File>, SError> {
        if let Some(parent) = archive_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(ZipWriter::new(File::create(archive_path)?))
    }

    pub fn options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }

    /// Adds one in-memory file.
    pub fn write_bytes<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), SError> {
        zip.start_file(name, Self::options())?;
        zip.write_all(bytes)?;
        Ok(())
    }

    /// Adds every entry under `src_dir`, named `<prefix>/<relative path>`.
    pub fn write_tree<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        src_dir: &Utf8Path,
        prefix: &str,
    ) -> Result<(), SError> {
        for entry in WalkDir::new(src_dir).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let rel = entry.path().strip_prefix(src_dir)?;
            let rel = Utf8Path::from_path(rel)
                .ok_or_else(|| SError::ParseError(format!("Invalid UTF-8 path: {rel:?}")))?
                .as_str()
                .replace('\\', "/");
            let name = if prefix.is_empty() {
                rel
            } else {
                format!("{prefix}/{rel}")
            };

            if entry.file_type().is_dir() {
                zip.add_directory(name, Self::options())?;
            } else {
                Self::write_bytes(zip, &name, &fs::read(entry.path())?)?;
            }
        }
        Ok(())
    }
}
