use crate::models::mod_dto::ModRecord;
use crate::models::modpack::Modpack;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PROFILE: &str = "Default";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ManagementMode {
    #[default]
    Profiles,
    Modpacks,
}

/// The persisted state document (`config.json`).
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct AppState {
    pub mods: BTreeMap<String, ModRecord>,
    pub profiles: BTreeMap<String, Vec<String>>,
    pub current_profile: String,
    pub modpacks: BTreeMap<String, Modpack>,
    pub active_modpack: Option<String>,
    /// Ledgers of mods deployed from the active modpack's private storage.
    pub modpack_deployments: BTreeMap<String, ModRecord>,
    pub bypass_active: bool,
    pub game_path: Option<Utf8PathBuf>,
    pub language: Option<String>,
    pub particle_animation_enabled: bool,
    pub mod_management_mode: ManagementMode,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mods: BTreeMap::new(),
            profiles: BTreeMap::from([(DEFAULT_PROFILE.to_string(), Vec::new())]),
            current_profile: DEFAULT_PROFILE.to_string(),
            modpacks: BTreeMap::new(),
            active_modpack: None,
            modpack_deployments: BTreeMap::new(),
            bypass_active: false,
            game_path: None,
            language: None,
            particle_animation_enabled: false,
            mod_management_mode: ManagementMode::Profiles,
        }
    }
}

impl AppState {
    /// Repairs references that a hand-edited or older document may break.
    pub fn validate(&mut self) {
        self.profiles.entry(DEFAULT_PROFILE.to_string()).or_default();
        if !self.profiles.contains_key(&self.current_profile) {
            self.current_profile = DEFAULT_PROFILE.to_string();
        }

        for entries in self.profiles.values_mut() {
            let mut seen = std::collections::HashSet::new();
            entries.retain(|e| seen.insert(e.clone()));
        }

        if let Some(pack) = &self.active_modpack {
            if !self.modpacks.contains_key(pack) {
                self.active_modpack = None;
            }
        }

        if self.game_path.as_ref().is_some_and(|p| p.as_str().trim().is_empty()) {
            self.game_path = None;
        }
    }

    pub fn current_profile_mods(&self) -> &[String] {
        self.profiles
            .get(&self.current_profile)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn active_mod_ids(&self) -> Vec<String> {
        self.mods
            .iter()
            .filter(|(_, m)| m.active)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Drops `mod_id` from every profile.
    pub fn forget_in_profiles(&mut self, mod_id: &str) {
        for entries in self.profiles.values_mut() {
            entries.retain(|e| e != mod_id);
        }
    }
}
