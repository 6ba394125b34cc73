use crate::models::error::SError;
use crate::models::paths::{REGISTRY_DEFAULT_KEY, REGISTRY_KEY};
use crate::utils::json::Json;
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use tracing::{debug, warn};

type Document = Map<String, Value>;

/// The loader's `JsonFiles.json`. Only the `ZMM` key is ever edited.
#[derive(Clone, Debug)]
pub struct JsonRegistry {
    pub path: Utf8PathBuf,
}

impl JsonRegistry {
    pub fn new(path: &Utf8Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// `Ok(None)` when the file does not exist.
    fn load(&self) -> Result<Option<Document>, SError> {
        if !self.path.is_file() {
            return Ok(None);
        }

        match Json::read::<Value>(&self.path) {
            Ok(Value::Object(doc)) => Ok(Some(doc)),
            Ok(_) => Err(SError::RegistryCorrupt(format!(
                "{}: top level is not an object",
                self.path
            ))),
            Err(e) => Err(SError::RegistryCorrupt(e.to_string())),
        }
    }

    /// Adds `names` to `ZMM`, skipping names already present.
    /// A missing or unreadable registry starts over as an empty document.
    pub fn add_entries(&self, names: &[String]) -> Result<(), SError> {
        if names.is_empty() {
            return Ok(());
        }

        let mut doc = match self.load() {
            Ok(doc) => doc.unwrap_or_default(),
            Err(e) => {
                warn!("{e}; rebuilding registry");
                Document::new()
            }
        };

        doc.entry(REGISTRY_DEFAULT_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));

        let zmm = doc
            .entry(REGISTRY_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !zmm.is_array() {
            *zmm = Value::Array(Vec::new());
        }

        if let Value::Array(entries) = zmm {
            for name in names {
                let value = Value::String(name.clone());
                if !entries.contains(&value) {
                    entries.push(value);
                }
            }
        }

        debug!("registry += {names:?}");
        Json::write(&self.path, &doc)
    }

    /// Removes `names` from `ZMM` by exact match, dropping the key when it empties.
    /// Does nothing when the registry is missing or unreadable.
    pub fn remove_entries(&self, names: &[String]) -> Result<(), SError> {
        if names.is_empty() {
            return Ok(());
        }

        let mut doc = match self.load() {
            Ok(Some(doc)) => doc,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!("{e}; leaving registry untouched");
                return Ok(());
            }
        };

        let now_empty = match doc.get_mut(REGISTRY_KEY) {
            Some(Value::Array(entries)) => {
                entries.retain(|v| !v.as_str().is_some_and(|s| names.iter().any(|n| n == s)));
                entries.is_empty()
            }
            _ => false,
        };

        if now_empty {
            doc.shift_remove(REGISTRY_KEY);
        }

        debug!("registry -= {names:?}");
        Json::write(&self.path, &doc)
    }

    /// Current `ZMM` entries; empty when the registry is missing or unreadable.
    pub fn entries(&self) -> Vec<String> {
        self.load()
            .ok()
            .flatten()
            .and_then(|doc| doc.get(REGISTRY_KEY).cloned())
            .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
            .unwrap_or_default()
    }
}
