pub mod bypass;
pub mod classifier;
pub mod decompression;
pub mod deployment;
pub mod game_finder;
pub mod json_registry;
pub mod library;
pub mod mod_manager;
pub mod mod_stager;
pub mod modpack;
pub mod planner;
pub mod profile;
pub mod reconciler;
pub mod tasks;
pub mod updates;
