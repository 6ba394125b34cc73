use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ModpackEntry {
    pub folder_name: String,
    pub display_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Modpack {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub image: Option<Utf8PathBuf>,
    #[serde(default)]
    pub mods: Vec<ModpackEntry>,
    /// Private storage root; mod folders live under `<path>/mods`.
    pub path: Utf8PathBuf,
}

impl Modpack {
    pub fn mods_dir(&self) -> Utf8PathBuf {
        self.path.join("mods")
    }
}

/// Contents of `modpack.json` inside an exported pack archive.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ModpackManifest {
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub mods: Vec<ModpackEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

pub const MODPACK_MANIFEST: &str = "modpack.json";
