mod common;

use common::{add_mod, game_rules, list_files, open_library, setup_test_env, write_file};
use std::fs;
use zmm_lib::core::decompression::ZipExtractor;
use zmm_lib::core::modpack::{self, CreateModpack};
use zmm_lib::core::{reconciler, mod_manager};
use zmm_lib::models::error::SError;
use zmm_lib::models::mod_dto::SourceMetadata;
use zmm_lib::models::modpack::ModpackEntry;
use zmm_lib::models::state::ManagementMode;
use zmm_lib::models::task_status::Warning;

fn seeded() -> (tempfile::TempDir, zmm_lib::core::library::Library, camino::Utf8PathBuf) {
    let (tmp, app_root, game_root) = setup_test_env();
    let mut lib = open_library(&app_root, &game_root, true);
    add_mod(&mut lib, "Goku", &[("Goku.pak", "g")]);
    add_mod(&mut lib, "Vegeta", &[("cfg/Vegeta.ini", "v")]);
    lib.record_mut("Goku").unwrap().source_metadata = Some(SourceMetadata {
        name: Some("Goku Ultra".into()),
        ..Default::default()
    });
    (tmp, lib, game_root)
}

fn create(lib: &mut zmm_lib::core::library::Library, name: &str) {
    modpack::create_modpack(
        lib,
        CreateModpack {
            name: name.into(),
            author: "Bulma".into(),
            image: None,
            mods: vec!["Goku".into(), "Vegeta".into()],
        },
    )
    .unwrap();
}

#[test]
fn test_create_copies_mods_into_private_storage() {
    let (_tmp, mut lib, _game_root) = seeded();
    write_file(&lib.paths.default_pack_icon, "png");

    create(&mut lib, "Saiyan Pack");

    let pack = &lib.state.modpacks["Saiyan Pack"];
    assert_eq!(pack.author, "Bulma");
    assert_eq!(
        pack.mods,
        vec![
            ModpackEntry {
                folder_name: "Goku".into(),
                display_name: "Goku Ultra".into()
            },
            ModpackEntry {
                folder_name: "Vegeta".into(),
                display_name: "Vegeta".into()
            },
        ]
    );
    assert_eq!(list_files(&pack.mods_dir()), vec!["Goku/Goku.pak", "Vegeta/cfg/Vegeta.ini"]);
    assert_eq!(
        pack.image.as_ref().unwrap(),
        &lib.paths.modpacks_data.join("Saiyan_Pack_icon.png")
    );

    let err = modpack::create_modpack(
        &mut lib,
        CreateModpack {
            name: "Saiyan Pack".into(),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, SError::ModpackExists(_)));
}

#[test]
fn test_activate_modpack_is_exclusive_with_profile_mods() {
    let (_tmp, mut lib, game_root) = seeded();
    let rules = game_rules(&game_root);
    create(&mut lib, "Pack");
    // Drop one member from storage so activation reports it.
    fs::remove_dir_all(lib.state.modpacks["Pack"].mods_dir().join("Vegeta")).unwrap();

    mod_manager::toggle_mod(&mut lib, "Vegeta", true).unwrap();
    assert!(rules.mods.join("cfg").exists());

    // Profile mode refuses pack activation.
    let report = reconciler::activate_modpack(&mut lib, "Pack").unwrap();
    assert_eq!(report.warnings, vec![Warning::WrongMode]);

    reconciler::switch_mode(&mut lib, ManagementMode::Modpacks).unwrap();
    assert!(!rules.mods.join("cfg").exists());
    assert!(lib.state.active_mod_ids().is_empty());

    let report = reconciler::activate_modpack(&mut lib, "Pack").unwrap();
    assert_eq!(
        report.warnings,
        vec![Warning::MissingModpackMods(vec!["Vegeta".into()])]
    );
    assert_eq!(report.activated, vec!["Goku"]);
    assert_eq!(lib.state.active_modpack.as_deref(), Some("Pack"));
    assert!(rules.paks_mods.join("Goku").join("Goku.pak").is_file());
    // Library records stay untouched; the pack keeps its own ledger.
    assert!(!lib.record("Goku").unwrap().active);
    assert!(lib.state.modpack_deployments["Goku"].active);

    reconciler::deactivate_all(&mut lib).unwrap();
    assert!(!rules.paks_mods.join("Goku").exists());
    assert!(lib.state.modpack_deployments.is_empty());
    assert!(lib.state.active_modpack.is_none());
}

#[test]
fn test_activate_modpack_needs_bypass() {
    let (_tmp, mut lib, _game_root) = seeded();
    create(&mut lib, "Pack");
    lib.state.mod_management_mode = ManagementMode::Modpacks;
    lib.state.bypass_active = false;

    let report = reconciler::activate_modpack(&mut lib, "Pack").unwrap();
    assert_eq!(report.warnings, vec![Warning::BypassInactive]);
    assert!(lib.state.active_modpack.is_none());
    assert!(matches!(
        reconciler::activate_modpack(&mut lib, "Nope"),
        Err(SError::ModpackNotFound(_))
    ));
}

#[test]
fn test_export_import_round_trip() {
    let (tmp, mut lib, _game_root) = seeded();
    let picture = lib.root.join("cover.png");
    write_file(&picture, "png");
    modpack::create_modpack(
        &mut lib,
        CreateModpack {
            name: "Pack".into(),
            author: "Bulma".into(),
            image: Some(picture),
            mods: vec!["Goku".into(), "Vegeta".into()],
        },
    )
    .unwrap();

    let archive = camino::Utf8Path::from_path(tmp.path())
        .unwrap()
        .join("Pack.zmmpack");
    modpack::export_modpack(&lib, "Pack", &archive).unwrap();

    // Same name is rejected.
    let err = modpack::import_modpack(&mut lib, &ZipExtractor, &archive, None).unwrap_err();
    assert!(matches!(err, SError::ImportValidationFailed(_)));

    let name = modpack::import_modpack(&mut lib, &ZipExtractor, &archive, Some("Pack Copy")).unwrap();
    assert_eq!(name, "Pack Copy");

    let original = &lib.state.modpacks["Pack"];
    let copy = &lib.state.modpacks["Pack Copy"];
    assert_eq!(copy.mods, original.mods);
    assert_eq!(copy.author, "Bulma");
    assert_eq!(list_files(&copy.mods_dir()), list_files(&original.mods_dir()));
    assert_eq!(
        copy.image.as_ref().unwrap(),
        &lib.paths.modpacks_data.join("Pack_Copy_Pack_cover.png")
    );

    // No staging leftovers.
    let leftovers: Vec<_> = fs::read_dir(&lib.root)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".import-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_import_without_manifest_is_rejected() {
    let (tmp, mut lib, _game_root) = seeded();
    let root = camino::Utf8Path::from_path(tmp.path()).unwrap();
    let src = root.join("bogus");
    write_file(&src.join("mods").join("X").join("x.pak"), "x");
    let archive = root.join("bogus.zip");
    zmm_lib::core::decompression::Decompression::compress_dir(&src, &archive).unwrap();

    let err = modpack::import_modpack(&mut lib, &ZipExtractor, &archive, None).unwrap_err();
    assert!(matches!(err, SError::ImportValidationFailed(_)));
    assert!(lib.state.modpacks.is_empty());
}

#[test]
fn test_delete_active_modpack_reverts_deployment() {
    let (_tmp, mut lib, game_root) = seeded();
    let rules = game_rules(&game_root);
    create(&mut lib, "Pack");
    reconciler::switch_mode(&mut lib, ManagementMode::Modpacks).unwrap();
    reconciler::activate_modpack(&mut lib, "Pack").unwrap();
    let storage = lib.state.modpacks["Pack"].path.clone();

    modpack::delete_modpack(&mut lib, "Pack").unwrap();

    assert!(!storage.exists());
    assert!(!rules.paks_mods.join("Goku").exists());
    assert!(lib.state.modpacks.is_empty());
    assert!(lib.state.active_modpack.is_none());
    assert!(matches!(
        modpack::delete_modpack(&mut lib, "Pack"),
        Err(SError::ModpackNotFound(_))
    ));
}
