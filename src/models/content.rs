use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Paks,
    Json,
    General,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaksRoot {
    pub dir: Utf8PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonRoot {
    pub dir: Utf8PathBuf,
    /// File names of the `.json` files directly inside `dir`, in listing order.
    pub files: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneralRoot {
    pub dir: Utf8PathBuf,
}

/// A directory that can be deployed as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentRoot {
    Paks(PaksRoot),
    Json(JsonRoot),
    General(GeneralRoot),
}

impl ContentRoot {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentRoot::Paks(_) => ContentKind::Paks,
            ContentRoot::Json(_) => ContentKind::Json,
            ContentRoot::General(_) => ContentKind::General,
        }
    }
}
