use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Display)]
pub enum SError {
    #[display("Mod source folder not found: {_0}")]
    SourceMissing(String),
    #[display("No valid mod content found in {_0}")]
    NoValidContent(String),
    #[display("Json registry is unreadable: {_0}")]
    RegistryCorrupt(String),
    #[display("Copy failed at '{path}': {cause}")]
    CopyFailed { path: String, cause: String },
    #[display("Bypass toggle failed: {_0}")]
    ToggleFailed(String),
    #[display("Modpack import/export rejected: {_0}")]
    ImportValidationFailed(String),
    #[display("Failed to apply state for mod '{mod_id}': {cause}")]
    Transition { mod_id: String, cause: Box<SError> },
    #[display("Mod not found: {_0}")]
    ModNotFound(String),
    #[display("Mod already installed: {_0}")]
    ModExists(String),
    #[display("Modpack not found: {_0}")]
    ModpackNotFound(String),
    #[display("Modpack already exists: {_0}")]
    ModpackExists(String),
    #[display("Profile not found: {_0}")]
    ProfileNotFound(String),
    #[display("Profile already exists: {_0}")]
    ProfileExists(String),
    #[display("Profile '{_0}' is reserved")]
    ReservedProfile(String),
    #[display("No library is open")]
    NoActiveLibrary,
    #[display("Game path is not set or invalid")]
    InvalidGamePath,
    #[display("The bypass is off; deployed files are parked in the backup")]
    BypassInactive,
    #[display("The game is running")]
    GameRunning,
    #[display("IO error: {_0}")]
    IOError(String),
    #[display("Parse error: {_0}")]
    ParseError(String),
    #[display("Archive error: {_0}")]
    ArchiveError(String),
    #[display("Unexpected error: {_0:?}")]
    Unexpected(Option<String>),
}

impl std::error::Error for SError {}

impl SError {
    /// Wraps any error as a copy failure at `path`.
    pub fn copy_failed(path: impl ToString, cause: impl ToString) -> Self {
        SError::CopyFailed {
            path: path.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn transition(mod_id: &str, cause: SError) -> Self {
        SError::Transition {
            mod_id: mod_id.to_string(),
            cause: Box::new(cause),
        }
    }

    /// Unwraps a `Transition` to the error that caused it.
    pub fn root_cause(&self) -> &SError {
        match self {
            SError::Transition { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

impl From<std::io::Error> for SError {
    fn from(e: std::io::Error) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for SError {
    fn from(e: serde_json::Error) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<zip::result::ZipError> for SError {
    fn from(e: zip::result::ZipError) -> Self {
        SError::ArchiveError(e.to_string())
    }
}

impl From<walkdir::Error> for SError {
    fn from(e: walkdir::Error) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<camino::FromPathBufError> for SError {
    fn from(e: camino::FromPathBufError) -> Self {
        SError::ParseError(format!("Invalid UTF-8 path: {e}"))
    }
}

impl From<std::path::StripPrefixError> for SError {
    fn from(e: std::path::StripPrefixError) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<regex::Error> for SError {
    fn from(e: regex::Error) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<confy::ConfyError> for SError {
    fn from(e: confy::ConfyError) -> Self {
        SError::ParseError(e.to_string())
    }
}
