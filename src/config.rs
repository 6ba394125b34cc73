pub mod global;

pub use global::{load_config, save_config, GlobalConfig};
