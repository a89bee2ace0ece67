pub mod file_writer;
pub mod log;
pub mod tail;

pub use self::log::{init_logging, update_log_level};
pub use tail::{LogTailer, tail_lines};
