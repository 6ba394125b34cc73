// src/config/global.rs
use camino::Utf8PathBuf;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "zero_mod_manager";
const CONFIG_NAME: &str = "config";

/// Launcher-level settings: which working directory to open and how loud to log.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GlobalConfig {
    pub app_root: Option<Utf8PathBuf>,
    pub log_filter: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            app_root: None,
            log_filter: "info".to_string(),
        }
    }
}

impl GlobalConfig {
    /// The configured working directory, or the platform data dir, or the executable's folder.
    pub fn resolve_app_root(&self) -> Utf8PathBuf {
        if let Some(root) = &self.app_root {
            return root.clone();
        }

        ProjectDirs::from("com", "zmm", APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .or_else(|| {
                std::env::current_exe()
                    .ok()
                    .and_then(|exe_path| exe_path.parent().map(|p| p.to_path_buf()))
            })
            .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
            .unwrap_or_else(|| Utf8PathBuf::from("."))
    }
}

pub fn load_config() -> GlobalConfig {
    confy::load(APP_NAME, CONFIG_NAME).unwrap_or_default()
}

pub fn save_config(config: &GlobalConfig) -> Result<(), crate::models::error::SError> {
    confy::store(APP_NAME, CONFIG_NAME, config)?;
    Ok(())
}
