use crate::core::library::Library;
use crate::core::mod_manager;
use crate::models::error::SError;
use crate::models::paths::{AppPathRules, GamePathRules};
use crate::models::task_status::TaskStatus;
use crate::utils::file::FileUtils;
use crate::utils::process::ProcessChecker;
use tracing::{error, info, instrument};

/// Turns the loader injection on or off.
///
/// The stored flag only changes when every step succeeded. A failure part-way leaves whatever
/// already moved in place and reports `ToggleFailed`.
#[instrument(skip(lib))]
pub fn set_bypass(lib: &mut Library, enabled: bool) -> Result<(), SError> {
    let rules = lib.game_rules()?;
    if ProcessChecker::is_game_running() {
        return Err(SError::GameRunning);
    }

    let moved = if enabled {
        enable(&lib.paths, &rules)
    } else {
        disable(&lib.paths, &rules)
    };

    if let Err(e) = moved {
        error!("bypass toggle to {enabled} failed: {e}");
        return Err(SError::ToggleFailed(e.to_string()));
    }

    lib.state.bypass_active = enabled;
    lib.persist()?;
    info!("bypass active: {enabled}");
    lib.notify(TaskStatus::BypassChanged(enabled));

    mod_manager::sync_mods_folder(lib)?;
    Ok(())
}

fn enable(app: &AppPathRules, game: &GamePathRules) -> Result<(), SError> {
    if app.resources.is_dir() {
        let missing = FileUtils::list_names(&app.resources)?
            .iter()
            .any(|name| !game.win64.join(name).exists());
        if missing {
            FileUtils::copy_recursive(&app.resources, &game.win64)?;
        }
    }

    if app.backup_plugins.exists() {
        FileUtils::replace_dir(&app.backup_plugins, &game.plugins)?;
    }
    if app.backup_mods.exists() {
        FileUtils::replace_dir(&app.backup_mods, &game.mods)?;
    }
    if app.backup_paks_mods.exists() {
        FileUtils::replace_dir(&app.backup_paks_mods, &game.paks_mods)?;
    }
    Ok(())
}

fn disable(app: &AppPathRules, game: &GamePathRules) -> Result<(), SError> {
    std::fs::create_dir_all(&app.backup)?;

    for (live, backup) in [
        (&game.mods, &app.backup_mods),
        (&game.paks_mods, &app.backup_paks_mods),
        (&game.plugins, &app.backup_plugins),
    ] {
        if live.exists() {
            FileUtils::replace_dir(live, backup)?;
        }
    }

    if app.resources.is_dir() {
        for name in FileUtils::list_names(&app.resources)? {
            FileUtils::remove_path(&game.win64.join(name))?;
        }
    }
    Ok(())
}
