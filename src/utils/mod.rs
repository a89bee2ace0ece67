pub mod format;
pub mod logging;
pub mod process;
pub mod types;
