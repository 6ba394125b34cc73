use crate::models::mod_dto::SourceMetadata;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Result of looking up one tracked mod in the catalog.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UpdateCheck {
    pub mod_id: String,
    /// The newer remote record, or `None` when the mod is up to date or the lookup failed.
    pub newer: Option<SourceMetadata>,
}

/// Non-fatal outcomes reported to the user instead of an error.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// Mod operations require the bypass to be enabled.
    BypassInactive,
    /// The requested operation belongs to the other management mode.
    WrongMode,
    /// Modpack members whose folder is missing from the pack storage (display names).
    MissingModpackMods(Vec<String>),
}

/// Events posted to the coordinating context.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum TaskStatus {
    ModActivated(String),
    ModDeactivated(String),
    ModFailed { mod_id: String, message: String },
    ProfileApplied { profile: String, failed: usize },
    ModpackActivated { name: String, missing: Vec<String> },
    BypassChanged(bool),
    DownloadProgress { label: String, percent: u8 },
    DownloadFinished {
        label: String,
        path: Utf8PathBuf,
        metadata: Option<SourceMetadata>,
    },
    DownloadFailed { label: String, message: String },
    UpdatesChecked(Vec<UpdateCheck>),
}
