use crate::models::content::{ContentKind, ContentRoot, GeneralRoot, JsonRoot, PaksRoot};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

const PAK_EXTENSIONS: [&str; 3] = ["pak", "ucas", "utoc"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,
}

/// Immediate listing of a directory, sorted by name.
/// Unreadable or missing directories list as empty.
pub trait DirListing {
    fn entries(&self, dir: &Utf8Path) -> Vec<DirEntryInfo>;
}

/// Lists the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsListing;

impl DirListing for FsListing {
    fn entries(&self, dir: &Utf8Path) -> Vec<DirEntryInfo> {
        let Ok(read) = fs::read_dir(dir) else {
            return Vec::new();
        };

        let mut entries: Vec<DirEntryInfo> = read
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().into_string().ok()?;
                // Follow links so a linked folder counts as a folder.
                let meta = fs::metadata(e.path()).ok()?;
                let kind = if meta.is_dir() {
                    EntryKind::Dir
                } else if meta.is_file() {
                    EntryKind::File
                } else {
                    return None;
                };
                Some(DirEntryInfo { name, kind })
            })
            .collect();

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Utf8Path::new(name)
        .extension()
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn is_json(name: &str) -> bool {
    has_extension(name, &["json"])
}

/// Classifies `dir` by the regular files directly inside it.
pub fn classify(listing: &dyn DirListing, dir: &Utf8Path) -> ContentKind {
    let files: Vec<String> = listing
        .entries(dir)
        .into_iter()
        .filter(|e| e.kind == EntryKind::File)
        .map(|e| e.name)
        .collect();

    if files.is_empty() {
        return ContentKind::None;
    }
    if files.iter().any(|f| has_extension(f, &PAK_EXTENSIONS)) {
        return ContentKind::Paks;
    }
    if files.iter().any(|f| is_json(f)) {
        return ContentKind::Json;
    }
    ContentKind::General
}

/// Finds the directories under `dir` that hold deployable content.
///
/// A directory that classifies as content is returned whole and never descended into.
/// The result is in depth-first, name-sorted order, so two runs over the same tree
/// produce the same plan.
pub fn find_content_roots(listing: &dyn DirListing, dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    if classify(listing, dir) != ContentKind::None {
        return vec![dir.to_path_buf()];
    }

    let mut roots = Vec::new();
    let mut pending = subdirectories(listing, dir);
    pending.reverse();

    while let Some(current) = pending.pop() {
        if classify(listing, &current) != ContentKind::None {
            roots.push(current);
            continue;
        }

        let mut children = subdirectories(listing, &current);
        children.reverse();
        pending.extend(children);
    }

    roots
}

fn subdirectories(listing: &dyn DirListing, dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    listing
        .entries(dir)
        .into_iter()
        .filter(|e| e.kind == EntryKind::Dir)
        .map(|e| dir.join(e.name))
        .collect()
}

/// Turns a directory into its typed content root, if it is one.
pub fn content_root(listing: &dyn DirListing, dir: &Utf8Path) -> Option<ContentRoot> {
    match classify(listing, dir) {
        ContentKind::Paks => Some(ContentRoot::Paks(PaksRoot {
            dir: dir.to_path_buf(),
        })),
        ContentKind::Json => Some(ContentRoot::Json(JsonRoot {
            dir: dir.to_path_buf(),
            files: listing
                .entries(dir)
                .into_iter()
                .filter(|e| e.kind == EntryKind::File && is_json(&e.name))
                .map(|e| e.name)
                .collect(),
        })),
        ContentKind::General => Some(ContentRoot::General(GeneralRoot {
            dir: dir.to_path_buf(),
        })),
        ContentKind::None => None,
    }
}

/// `find_content_roots` followed by typing each root.
pub fn locate(listing: &dyn DirListing, dir: &Utf8Path) -> Vec<ContentRoot> {
    find_content_roots(listing, dir)
        .iter()
        .filter_map(|root| content_root(listing, root))
        .collect()
}
