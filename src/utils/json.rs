use crate::models::error::SError;
use camino::Utf8Path;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

pub struct Json;

impl Json {
    /// Writes `data` pretty-printed with four-space indentation.
    pub fn write<T: Serialize>(path: &Utf8Path, data: &T) -> Result<(), SError> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        data.serialize(&mut ser)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, buf).map_err(|e| SError::IOError(format!("{path}: {e}")))
    }

    pub fn read<T: serde::de::DeserializeOwned>(path: &Utf8Path) -> Result<T, SError> {
        let s = std::fs::read_to_string(path).map_err(|e| SError::IOError(format!("{path}: {e}")))?;
        serde_json::from_str::<T>(&s).map_err(|e| SError::ParseError(format!("{path}: {e}")))
    }
}
