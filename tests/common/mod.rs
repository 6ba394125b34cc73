#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;
use zmm_lib::core::json_registry::JsonRegistry;
use zmm_lib::core::library::Library;
use zmm_lib::models::paths::GamePathRules;

/// Sandbox with an app working dir and a game root that passes path validation.
pub fn setup_test_env() -> (TempDir, Utf8PathBuf, Utf8PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();

    let app_root = root.join("app");
    let game_root = root.join("game");

    fs::create_dir_all(&app_root).unwrap();
    fs::create_dir_all(GamePathRules::new(&game_root).win64).unwrap();

    (tmp, app_root, game_root)
}

/// Opens a library pointed at `game_root`, with the bypass flag set as given.
pub fn open_library(app_root: &Utf8Path, game_root: &Utf8Path, bypass: bool) -> Library {
    let mut lib = Library::open(app_root).unwrap();
    lib.set_game_path(game_root).unwrap();
    lib.state.bypass_active = bypass;
    lib.persist().unwrap();
    lib
}

pub fn write_file(path: &Utf8Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Writes `mods/<name>/<rel>` for every `(rel, contents)` pair.
pub fn create_mod(mods_dir: &Utf8Path, name: &str, files: &[(&str, &str)]) -> Utf8PathBuf {
    let dir = mods_dir.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (rel, contents) in files {
        write_file(&dir.join(rel), contents);
    }
    dir
}

/// Creates a mod folder and registers it in the library.
pub fn add_mod(lib: &mut Library, name: &str, files: &[(&str, &str)]) {
    create_mod(&lib.paths.mods, name, files);
    lib.state.mods.entry(name.to_string()).or_default();
    lib.persist().unwrap();
}

pub fn game_rules(game_root: &Utf8Path) -> GamePathRules {
    GamePathRules::new(game_root)
}

pub fn registry_entries(game_root: &Utf8Path) -> Vec<String> {
    JsonRegistry::new(&game_rules(game_root).json_registry).entries()
}

pub fn write_registry(game_root: &Utf8Path, body: &str) {
    write_file(&game_rules(game_root).json_registry, body);
}

pub fn read_registry(game_root: &Utf8Path) -> serde_json::Value {
    let text = fs::read_to_string(game_rules(game_root).json_registry).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Sorted relative file paths under `dir`.
pub fn list_files(dir: &Utf8Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
