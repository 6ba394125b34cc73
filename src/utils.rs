pub mod file;
pub mod json;
pub mod logging;
pub mod name;
pub mod process;
pub mod thread;
