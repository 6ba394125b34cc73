use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Metadata copied from the remote catalog when a mod was downloaded.
/// Only the fields the engine reads are typed; everything else is kept verbatim.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SourceMetadata {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub modified_at: i64,
    pub update_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<Box<SourceMetadata>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SourceMetadata {
    /// True when the record can be looked up in the catalog.
    pub fn is_trackable(&self) -> bool {
        self.id.is_some() && self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ModRecord {
    pub active: bool,
    /// Every path the current activation wrote into the game tree, in creation order.
    pub deployed_paths: Vec<Utf8PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_image_path: Option<Utf8PathBuf>,
    pub source_metadata: Option<SourceMetadata>,
}

impl ModRecord {
    /// Name shown to users: the catalog name when known, otherwise the folder name.
    pub fn display_name(&self, folder_name: &str) -> String {
        self.source_metadata
            .as_ref()
            .and_then(|m| m.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| folder_name.to_string())
    }
}

/// A downloadable file listed by the catalog for one mod.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RemoteFile {
    pub id: u64,
    pub filename: String,
    pub size_bytes: u64,
    pub download_count: u64,
    pub download_url: String,
}
