use crate::core::game_finder;
use crate::models::error::SError;
use crate::models::mod_dto::ModRecord;
use crate::models::paths::{AppPathRules, GamePathRules};
use crate::models::state::AppState;
use crate::models::task_status::TaskStatus;
use crate::utils::json::Json;
use camino::{Utf8Path, Utf8PathBuf};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Owner of the persisted state of one application working directory.
pub struct Library {
    pub root: Utf8PathBuf,
    pub paths: AppPathRules,
    pub state: AppState,
    events: Option<UnboundedSender<TaskStatus>>,
}

impl Library {
    /// Opens (or initialises) the working directory at `app_root`.
    /// A missing or unreadable `config.json` starts from defaults.
    pub fn open(app_root: &Utf8Path) -> Result<Self, SError> {
        let paths = AppPathRules::new(app_root);
        std::fs::create_dir_all(app_root)?;
        for dir in paths.working_dirs() {
            std::fs::create_dir_all(dir)?;
        }

        let mut state = if paths.config.is_file() {
            Json::read::<AppState>(&paths.config).unwrap_or_else(|e| {
                warn!("config unreadable, starting fresh: {e}");
                AppState::default()
            })
        } else {
            AppState::default()
        };
        state.validate();

        let lib = Self {
            root: app_root.to_path_buf(),
            paths,
            state,
            events: None,
        };

        lib.persist()?;
        info!("opened library at {app_root}");
        Ok(lib)
    }

    /// Writes `config.json`.
    pub fn persist(&self) -> Result<(), SError> {
        Json::write(&self.paths.config, &self.state)
    }

    /// Game layout for the configured installation.
    pub fn game_rules(&self) -> Result<GamePathRules, SError> {
        match &self.state.game_path {
            Some(path) if game_finder::validate_game_path(path) => Ok(GamePathRules::new(path)),
            _ => Err(SError::InvalidGamePath),
        }
    }

    pub fn has_valid_game_path(&self) -> bool {
        self.game_rules().is_ok()
    }

    pub fn set_game_path(&mut self, path: &Utf8Path) -> Result<(), SError> {
        if !game_finder::validate_game_path(path) {
            return Err(SError::InvalidGamePath);
        }
        self.state.game_path = Some(path.to_path_buf());
        self.persist()
    }

    /// Local storage folder of a mod.
    pub fn mod_dir(&self, mod_id: &str) -> Utf8PathBuf {
        self.paths.mods.join(mod_id)
    }

    pub fn record(&self, mod_id: &str) -> Result<&ModRecord, SError> {
        self.state
            .mods
            .get(mod_id)
            .ok_or_else(|| SError::ModNotFound(mod_id.to_string()))
    }

    pub fn record_mut(&mut self, mod_id: &str) -> Result<&mut ModRecord, SError> {
        self.state
            .mods
            .get_mut(mod_id)
            .ok_or_else(|| SError::ModNotFound(mod_id.to_string()))
    }

    /// Routes status events to a new receiver, replacing any previous one.
    pub fn subscribe(&mut self) -> UnboundedReceiver<TaskStatus> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Sender for background tasks; `None` when nobody subscribed.
    pub fn event_sender(&self) -> Option<UnboundedSender<TaskStatus>> {
        self.events.clone()
    }

    pub fn notify(&self, status: TaskStatus) {
        let Some(tx) = &self.events else {
            return;
        };
        if let Err(e) = tx.send(status) {
            debug!("status receiver dropped: {:?}", e.0);
        }
    }
}
