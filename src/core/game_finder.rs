use crate::models::error::SError;
use crate::models::paths::GamePathRules;
use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use regex::Regex;
use tracing::{debug, info};

pub const STEAM_APP_ID: u32 = 1790600;

/// A game root is usable when `SparkingZERO/Binaries/Win64` exists under it.
pub fn validate_game_path(path: &Utf8Path) -> bool {
    GamePathRules::new(path).win64.is_dir()
}

/// Library folders listed in `libraryfolders.vdf`, with escaped backslashes undone.
pub fn parse_library_folders(vdf: &str) -> Result<Vec<Utf8PathBuf>, SError> {
    let re = Regex::new(r#""path"\s+"((?:[^"\\]|\\.)+)""#)?;
    Ok(re
        .captures_iter(vdf)
        .map(|c| Utf8PathBuf::from(c[1].replace("\\\\", "\\")))
        .collect())
}

/// `installdir` of an app manifest.
pub fn parse_install_dir(acf: &str) -> Result<Option<String>, SError> {
    let re = Regex::new(r#""installdir"\s+"([^"]+)""#)?;
    Ok(re.captures(acf).map(|c| c[1].to_string()))
}

/// Looks the game up in every library of the Steam installation at `steam_root`.
pub fn find_in_steam(steam_root: &Utf8Path) -> Result<Option<Utf8PathBuf>, SError> {
    let steamapps = steam_root.join("steamapps");
    let mut libraries = vec![steamapps.clone()];

    let vdf = steamapps.join("libraryfolders.vdf");
    if vdf.is_file() {
        let text = std::fs::read_to_string(&vdf)?;
        libraries.extend(
            parse_library_folders(&text)?
                .into_iter()
                .map(|p| p.join("steamapps")),
        );
    }
    debug!("searching {} steam libraries", libraries.len());

    let manifest_name = format!("appmanifest_{STEAM_APP_ID}.acf");
    for library in libraries {
        let manifest = library.join(&manifest_name);
        if !manifest.is_file() {
            continue;
        }
        let text = std::fs::read_to_string(&manifest)?;
        if let Some(dir) = parse_install_dir(&text)? {
            let found = library.join("common").join(dir);
            info!("found game at {found}");
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Usual Steam installation folders for this platform.
pub fn default_steam_roots() -> Vec<Utf8PathBuf> {
    let mut roots: Vec<Utf8PathBuf> = Vec::new();

    if cfg!(windows) {
        roots.push("C:/Program Files (x86)/Steam".into());
        roots.push("C:/Program Files/Steam".into());
    }

    if let Some(base) = BaseDirs::new() {
        let home = base.home_dir();
        for rel in [".steam/steam", ".local/share/Steam", "Library/Application Support/Steam"] {
            if let Some(p) = Utf8Path::from_path(&home.join(rel)) {
                roots.push(p.to_path_buf());
            }
        }
    }

    roots
}

/// First valid game root among the default Steam installations.
pub fn find_game_path() -> Option<Utf8PathBuf> {
    default_steam_roots()
        .iter()
        .filter(|root| root.is_dir())
        .filter_map(|root| find_in_steam(root).ok().flatten())
        .find(|p| validate_game_path(p))
}
