pub mod content;
pub mod error;
pub mod mod_dto;
pub mod modpack;
pub mod paths;
pub mod state;
pub mod task_status;
