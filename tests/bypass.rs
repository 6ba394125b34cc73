mod common;

use common::{add_mod, game_rules, open_library, setup_test_env, write_file};
use std::fs;
use zmm_lib::core::bypass;
use zmm_lib::core::library::Library;
use zmm_lib::models::error::SError;

#[test]
fn test_disable_then_enable_moves_native_dirs() {
    let (_tmp, app_root, game_root) = setup_test_env();
    let mut lib = open_library(&app_root, &game_root, true);
    let rules = game_rules(&game_root);
    write_file(&lib.paths.resources.join("dxgi.dll"), "loader");
    write_file(&rules.win64.join("dxgi.dll"), "loader");
    write_file(&rules.plugins.join("ZeroSpark.dll"), "plugin");
    write_file(&rules.mods.join("Foo").join("a.txt"), "a");
    write_file(&rules.paks_mods.join("Bar").join("b.pak"), "b");

    bypass::set_bypass(&mut lib, false).unwrap();

    assert!(!lib.state.bypass_active);
    assert!(!rules.mods.exists());
    assert!(!rules.paks_mods.exists());
    assert!(!rules.plugins.exists());
    assert!(!rules.win64.join("dxgi.dll").exists());
    assert!(lib.paths.backup_mods.join("Foo").join("a.txt").is_file());
    assert!(lib.paths.backup_paks_mods.join("Bar").join("b.pak").is_file());
    assert!(lib.paths.backup_plugins.join("ZeroSpark.dll").is_file());

    bypass::set_bypass(&mut lib, true).unwrap();

    assert!(lib.state.bypass_active);
    assert!(rules.win64.join("dxgi.dll").is_file());
    assert!(rules.plugins.join("ZeroSpark.dll").is_file());
    assert!(rules.mods.join("Foo").join("a.txt").is_file());
    assert!(rules.paks_mods.join("Bar").join("b.pak").is_file());
    assert!(!lib.paths.backup_mods.exists());

    // Persisted.
    let reopened = Library::open(&app_root).unwrap();
    assert!(reopened.state.bypass_active);
}

#[test]
fn test_enable_copies_missing_loader_files_only() {
    let (_tmp, app_root, game_root) = setup_test_env();
    let mut lib = open_library(&app_root, &game_root, false);
    let rules = game_rules(&game_root);
    write_file(&lib.paths.resources.join("dxgi.dll"), "loader");
    write_file(&lib.paths.resources.join("plugins").join("ZeroSpark.dll"), "plugin");

    bypass::set_bypass(&mut lib, true).unwrap();

    assert_eq!(fs::read_to_string(rules.win64.join("dxgi.dll")).unwrap(), "loader");
    assert!(rules.plugins.join("ZeroSpark.dll").is_file());
}

#[test]
fn test_failed_toggle_keeps_flag() {
    let (_tmp, app_root, game_root) = setup_test_env();
    let mut lib = open_library(&app_root, &game_root, true);
    let rules = game_rules(&game_root);
    write_file(&rules.mods.join("Foo").join("a.txt"), "a");
    // A file where the backup folder belongs.
    fs::remove_dir_all(&lib.paths.backup).unwrap();
    write_file(&lib.paths.backup, "blocker");

    let err = bypass::set_bypass(&mut lib, false).unwrap_err();

    assert!(matches!(err, SError::ToggleFailed(_)));
    assert!(lib.state.bypass_active);
    assert!(rules.mods.join("Foo").join("a.txt").is_file());
}

#[test]
fn test_bypass_requires_game_path() {
    let (_tmp, app_root, _game_root) = setup_test_env();
    let mut lib = Library::open(&app_root).unwrap();

    let err = bypass::set_bypass(&mut lib, true).unwrap_err();
    assert!(matches!(err, SError::InvalidGamePath));
    assert!(!lib.state.bypass_active);
}

#[test]
fn test_disable_keeps_mod_records() {
    let (_tmp, app_root, game_root) = setup_test_env();
    let mut lib = open_library(&app_root, &game_root, true);
    add_mod(&mut lib, "Foo", &[("a.txt", "a")]);
    zmm_lib::core::mod_manager::toggle_mod(&mut lib, "Foo", true).unwrap();

    bypass::set_bypass(&mut lib, false).unwrap();

    let record = lib.record("Foo").unwrap();
    assert!(record.active);
    assert!(lib.paths.backup_mods.join("Foo").join("a.txt").is_file());
}
