use camino::{Utf8Path, Utf8PathBuf};

/// Key inside the json registry that holds entries owned by this manager.
pub const REGISTRY_KEY: &str = "ZMM";
/// Key inside the json registry that holds base game entries.
pub const REGISTRY_DEFAULT_KEY: &str = "Default";

macro_rules! define_paths {
    ($name:ident { $($field:ident : $default:expr),* $(,)? }) => {
        #[derive(Clone, Debug)]
        pub struct $name {
            $(pub $field: Utf8PathBuf,)*
        }

        impl $name {
            pub fn to_absolute(mut self, base: &Utf8Path) -> Self {
                $(self.$field = base.join(self.$field);)*
                self
            }

            pub fn new(base: &Utf8Path) -> Self {
                Self::default().to_absolute(base)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: $default.into(),)*
                }
            }
        }
    };
}

define_paths!(GamePathRules {
    win64: "SparkingZERO/Binaries/Win64",
    plugins: "SparkingZERO/Binaries/Win64/plugins",
    mods: "SparkingZERO/Mods",
    paks_mods: "SparkingZERO/Content/Paks/~mods",
    json_dir: "SparkingZERO/Mods/ZeroSpark/Json",
    json_registry: "SparkingZERO/Mods/ZeroSpark/Json/JsonFiles.json",
});

define_paths!(AppPathRules {
    mods: "mods",
    downloads: "downloads",
    backup: "active_mods_backup",
    backup_mods: "active_mods_backup/Mods",
    backup_paks_mods: "active_mods_backup/~mods",
    backup_plugins: "active_mods_backup/plugins",
    modpacks_library: "modpacks_library",
    modpacks_data: "modpacks_data",
    mod_images: "mod_images",
    resources: "resources",
    default_pack_icon: "img/icon_pack.png",
    logs: "logs",
    config: "config.json",
});

impl AppPathRules {
    /// Directories that must exist before the manager touches anything.
    pub fn working_dirs(&self) -> [&Utf8PathBuf; 6] {
        [
            &self.mods,
            &self.backup,
            &self.downloads,
            &self.modpacks_data,
            &self.modpacks_library,
            &self.mod_images,
        ]
    }

    /// Private storage of a modpack: `modpacks_library/<name>`.
    pub fn modpack_storage(&self, pack_name: &str) -> Utf8PathBuf {
        self.modpacks_library.join(pack_name)
    }
}
